//! Init command implementation.

use anyhow::{Context, Result};
use encyclopedia_core::config::DEFAULT_CONFIG_FILE;
use encyclopedia_core::{EntryStore, FileStore};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"site:
  title: "Encyclopedia"

paths:
  # Directory holding one <Title>.md file per entry
  entries: "entries"

server:
  host: "127.0.0.1"
  port: 8000
"#;

const STARTER_ENTRIES: &[(&str, &str)] = &[
    (
        "CSS",
        "# CSS\n\nCSS is a language that can be used to add style to an [HTML](/wiki/HTML) page.\n",
    ),
    (
        "Git",
        "# Git\n\nGit is a version control tool that can be used to keep track of versions of a software project.\n\n## GitHub\n\nGitHub is an online service for hosting git repositories.\n",
    ),
    (
        "HTML",
        "# HTML\n\nHTML is a markup language that can be used to define the structure of a web page. HTML elements include\n\n* headings\n* paragraphs\n* lists\n* links\n* and more!\n\nThe most recent major version of HTML is HTML5.\n",
    ),
    (
        "Python",
        "# Python\n\nPython is a programming language that can be used both for writing **command-line scripts** or for building **web applications**.\n",
    ),
];

/// Initialize a new encyclopedia
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;
    scaffold_entries(root)?;

    println!("✓ encyclopedia initialized in {:?}", root);
    println!("  - Edit {} to customize the site title and port", DEFAULT_CONFIG_FILE);
    println!("  - Run `encyclopedia serve` and open the printed address");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        println!("{} already exists at {:?}", DEFAULT_CONFIG_FILE, config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

fn scaffold_entries(root: &Path) -> Result<()> {
    let store = FileStore::new(root.join("entries"));
    fs::create_dir_all(store.root())
        .with_context(|| format!("Failed to create {:?}", store.root()))?;

    for (title, content) in STARTER_ENTRIES {
        // Never clobber an entry the user already has, in any casing
        if store.resolve_title(title)?.is_some() {
            continue;
        }
        store.save_entry(title, content)?;
        println!("Created entry '{}'", title);
    }
    Ok(())
}
