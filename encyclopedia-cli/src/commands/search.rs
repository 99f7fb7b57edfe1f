//! Search command implementation

use super::{load_config, open_wiki};
use anyhow::Result;
use encyclopedia_core::SearchOutcome;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct SearchPayload<'a> {
    query: &'a str,
    /// Set when the query named an entry
    exact: Option<String>,
    results: Vec<String>,
}

/// Search entries the same way the web search box does
pub fn search_entries(config_path: Option<&Path>, query: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let outcome = open_wiki(&config).search(query)?;

    if json {
        let payload = match outcome {
            SearchOutcome::Exact(title) => SearchPayload {
                query,
                exact: Some(title.clone()),
                results: vec![title],
            },
            SearchOutcome::Matches(results) => SearchPayload {
                query,
                exact: None,
                results,
            },
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match outcome {
        SearchOutcome::Exact(title) => println!("{}", title),
        SearchOutcome::Matches(results) if results.is_empty() => {
            println!("No results found for '{}'", query);
        }
        SearchOutcome::Matches(results) => {
            for title in results {
                println!("{}", title);
            }
        }
    }
    Ok(())
}
