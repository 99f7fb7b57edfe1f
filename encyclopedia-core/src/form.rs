//! Entry form validation.

use crate::store::{is_storable_title, MAX_TITLE_BYTES};
use serde::Deserialize;
use std::fmt;

const REQUIRED: &str = "This field is required.";

/// Raw fields as submitted by the create/edit forms
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl EntryForm {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Form input that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEntry {
    /// Title with surrounding whitespace removed
    pub title: String,
    /// Content exactly as submitted
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Content,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Title => f.write_str("title"),
            Field::Content => f.write_str("content"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate both fields, collecting every problem found
pub fn validate(form: &EntryForm) -> Result<ValidatedEntry, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let title = form.title.trim();

    if title.is_empty() {
        errors.push(ValidationError::new(Field::Title, REQUIRED));
    } else if title.len() > MAX_TITLE_BYTES {
        errors.push(ValidationError::new(
            Field::Title,
            format!("Ensure this title is at most {MAX_TITLE_BYTES} bytes long."),
        ));
    } else if !is_storable_title(title) {
        errors.push(ValidationError::new(
            Field::Title,
            "Titles cannot start with '.' or contain slashes or control characters.",
        ));
    }

    if form.content.trim().is_empty() {
        errors.push(ValidationError::new(Field::Content, REQUIRED));
    }

    if errors.is_empty() {
        Ok(ValidatedEntry {
            title: title.to_string(),
            content: form.content.clone(),
        })
    } else {
        Err(errors)
    }
}

/// Messages reported against one field
pub fn messages_for(errors: &[ValidationError], field: Field) -> Vec<String> {
    errors
        .iter()
        .filter(|err| err.field == field)
        .map(|err| err.message.clone())
        .collect()
}
