//! Wiki operations on top of an entry store.
//!
//! Each operation is one request's worth of work: resolve the title the user
//! typed, touch the store at most once for reading or writing, and report
//! what happened. Nothing is cached between calls.

use crate::form::{validate, EntryForm, ValidationError};
use crate::markdown::MarkdownProcessor;
use crate::store::{Entry, EntryStore, StoreError};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WikiError {
    #[error("No entry matches '{0}'")]
    NotFound(String),

    #[error("Entry already exists with the provided title: '{0}'")]
    AlreadyExists(String),

    #[error("Invalid entry: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("The encyclopedia has no entries yet")]
    EmptyStore,

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// An entry ready for display under its stored title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub markdown: String,
    pub html: String,
}

/// Result of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query named an entry; go straight to it
    Exact(String),
    /// Titles whose content contains the query, in store order
    Matches(Vec<String>),
}

pub struct Wiki<S> {
    store: S,
    processor: MarkdownProcessor,
}

impl<S: EntryStore> Wiki<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            processor: MarkdownProcessor::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every title, as the store enumerates them
    pub fn list(&self) -> Result<Vec<String>, WikiError> {
        Ok(self.store.list_entries()?)
    }

    /// Resolve `title` and render its content
    pub fn view(&self, title: &str) -> Result<Page, WikiError> {
        let entry = self.lookup(title)?;
        let html = self.processor.render(&entry.content);
        Ok(Page {
            title: entry.title,
            markdown: entry.content,
            html,
        })
    }

    /// Exact title match first, then case-insensitive content search
    pub fn search(&self, query: &str) -> Result<SearchOutcome, WikiError> {
        if query.trim().is_empty() {
            return Ok(SearchOutcome::Matches(Vec::new()));
        }

        if let Some(title) = self.store.resolve_title(query)? {
            return Ok(SearchOutcome::Exact(title));
        }

        let needle = query.to_lowercase();
        let mut matches = Vec::new();
        for title in self.store.list_entries()? {
            let content = match self.store.get_entry(&title) {
                Ok(content) => content,
                // Removed between listing and reading
                Err(StoreError::NotFound(_)) => continue,
                Err(err) => return Err(err.into()),
            };
            if content.to_lowercase().contains(&needle) {
                matches.push(title);
            }
        }

        tracing::debug!("Search for {:?} matched {} entries", query, matches.len());
        Ok(SearchOutcome::Matches(matches))
    }

    /// Store a new entry, refusing titles that already exist in any casing.
    ///
    /// Returns the title the entry was saved under.
    pub fn create(&self, form: &EntryForm) -> Result<String, WikiError> {
        let entry = validate(form).map_err(WikiError::Validation)?;

        if let Some(existing) = self.store.resolve_title(&entry.title)? {
            return Err(WikiError::AlreadyExists(existing));
        }

        self.store.save_entry(&entry.title, &entry.content)?;
        tracing::info!("Created entry {:?}", entry.title);
        Ok(entry.title)
    }

    /// Load an entry for the edit form
    pub fn edit_form(&self, title: &str) -> Result<Entry, WikiError> {
        self.lookup(title)
    }

    /// Replace the content of an existing entry.
    ///
    /// The title always comes from `title`; whatever the form carries in its
    /// title field is ignored. Returns the stored title.
    pub fn edit(&self, title: &str, form: &EntryForm) -> Result<String, WikiError> {
        let resolved = self
            .store
            .resolve_title(title)?
            .ok_or_else(|| WikiError::NotFound(title.to_string()))?;

        let fixed = EntryForm::new(resolved.clone(), form.content.clone());
        let entry = validate(&fixed).map_err(WikiError::Validation)?;

        self.store.save_entry(&resolved, &entry.content)?;
        tracing::info!("Updated entry {:?}", resolved);
        Ok(resolved)
    }

    /// Pick a title uniformly at random
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, WikiError> {
        let titles = self.store.list_entries()?;
        titles.choose(rng).cloned().ok_or(WikiError::EmptyStore)
    }

    fn lookup(&self, title: &str) -> Result<Entry, WikiError> {
        let resolved = self
            .store
            .resolve_title(title)?
            .ok_or_else(|| WikiError::NotFound(title.to_string()))?;

        let content = match self.store.get_entry(&resolved) {
            Ok(content) => content,
            Err(StoreError::NotFound(_)) => return Err(WikiError::NotFound(title.to_string())),
            Err(err) => return Err(err.into()),
        };

        Ok(Entry {
            title: resolved,
            content,
        })
    }
}
