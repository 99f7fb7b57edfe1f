//! Askama template definitions.

use crate::links::{edit_url, entry_url, EntryLink};
use askama::Template;
use encyclopedia_core::form::{messages_for, EntryForm, Field, ValidationError};
use encyclopedia_core::Entry;

/// Field values and per-field messages for the entry forms
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub title: String,
    pub content: String,
    pub title_errors: Vec<String>,
    pub content_errors: Vec<String>,
}

impl FormView {
    /// Empty create form
    pub fn blank() -> Self {
        Self::default()
    }

    /// Re-display submitted values alongside what was wrong with them
    pub fn submitted(form: &EntryForm, errors: &[ValidationError]) -> Self {
        Self {
            title: form.title.clone(),
            content: form.content.clone(),
            title_errors: messages_for(errors, Field::Title),
            content_errors: messages_for(errors, Field::Content),
        }
    }

    /// Pre-filled from a stored entry
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            title: entry.title.clone(),
            content: entry.content.clone(),
            ..Self::default()
        }
    }
}

/// List of every entry
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub site_title: String,
    pub entries: Vec<EntryLink>,
}

/// A rendered entry
#[derive(Template)]
#[template(path = "entry.html")]
pub struct EntryTemplate {
    pub site_title: String,
    pub title: String,
    /// Entry body already converted to HTML
    pub content: String,
    pub edit_url: String,
}

impl EntryTemplate {
    pub fn new(site_title: &str, title: &str, html: String) -> Self {
        Self {
            site_title: site_title.to_string(),
            title: title.to_string(),
            content: html,
            edit_url: edit_url(title),
        }
    }
}

/// Content matches for a query that named no entry
#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub site_title: String,
    pub query: String,
    pub results: Vec<EntryLink>,
}

#[derive(Template)]
#[template(path = "create.html")]
pub struct CreateTemplate {
    pub site_title: String,
    pub form: FormView,
    pub warning: Option<String>,
}

/// Edit form; the title is shown but cannot be changed
#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditTemplate {
    pub site_title: String,
    pub title: String,
    pub form: FormView,
    pub action: String,
    pub cancel_url: String,
}

impl EditTemplate {
    pub fn new(site_title: &str, title: &str, form: FormView) -> Self {
        Self {
            site_title: site_title.to_string(),
            title: title.to_string(),
            form,
            action: edit_url(title),
            cancel_url: entry_url(title),
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub site_title: String,
    pub title: Option<String>,
}

/// Shown by the random page when there is nothing to choose from
#[derive(Template)]
#[template(path = "empty.html")]
pub struct EmptyTemplate {
    pub site_title: String,
}
