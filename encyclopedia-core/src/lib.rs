//! # encyclopedia-core
//!
//! Core library for the encyclopedia wiki.
//!
//! This crate owns everything that is not HTTP: the entry store and its
//! case-insensitive title resolution, form validation, markdown rendering,
//! and the wiki operations the server and CLI are built on.

pub mod config;
pub mod form;
pub mod markdown;
pub mod slug;
pub mod store;
pub mod wiki;

pub use config::Config;
pub use form::{validate, EntryForm, Field, ValidatedEntry, ValidationError};
pub use markdown::MarkdownProcessor;
pub use slug::slugify;
pub use store::{Entry, EntryStore, FileStore, MemoryStore, StoreError};
pub use wiki::{Page, SearchOutcome, Wiki, WikiError};
