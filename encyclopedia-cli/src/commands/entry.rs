//! Entry commands: list, show, create, random.

use super::{load_config, open_wiki};
use anyhow::{bail, Context, Result};
use encyclopedia_core::{EntryForm, WikiError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

/// Print every entry title
pub fn list_entries(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let titles = open_wiki(&config).list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&titles)?);
        return Ok(());
    }

    if titles.is_empty() {
        println!("No entries yet");
        return Ok(());
    }
    for title in titles {
        println!("{}", title);
    }
    Ok(())
}

/// Print one entry as markdown or HTML
pub fn show_entry(config_path: Option<&Path>, title: &str, html: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let page = open_wiki(&config).view(title)?;

    if html {
        print!("{}", page.html);
    } else {
        println!("# {}\n", page.title);
        print!("{}", page.markdown);
        if !page.markdown.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

/// Create an entry, refusing titles that already exist
pub fn create_entry(config_path: Option<&Path>, title: &str, content: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let wiki = open_wiki(&config);

    match wiki.create(&EntryForm::new(title, content)) {
        Ok(saved) => {
            println!("✓ Created '{}'", saved);
            Ok(())
        }
        Err(WikiError::Validation(errors)) => {
            for error in &errors {
                eprintln!("  - {}", error);
            }
            bail!("Entry was not created");
        }
        Err(err) => Err(err.into()),
    }
}

/// Print a randomly chosen title
pub fn random_entry(config_path: Option<&Path>, seed: Option<u64>) -> Result<()> {
    let config = load_config(config_path)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let title = open_wiki(&config).random(&mut rng)?;
    println!("{}", title);
    Ok(())
}

/// Content for `create`, inline or from a file
pub fn read_content(content: Option<String>, file: Option<&Path>) -> Result<String> {
    match (content, file) {
        (Some(content), _) => Ok(content),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
        }
        (None, None) => bail!("Provide --content or --file"),
    }
}
