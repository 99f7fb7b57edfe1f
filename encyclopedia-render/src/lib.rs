//! # encyclopedia-render
//!
//! HTML rendering for the encyclopedia wiki.
//!
//! Pages are Askama templates sharing one layout; links to entries are
//! built here so titles are percent-encoded in one place.

pub mod links;
pub mod templates;

pub use links::{edit_url, entry_url, EntryLink};
pub use templates::{
    CreateTemplate, EditTemplate, EmptyTemplate, EntryTemplate, FormView, IndexTemplate,
    NotFoundTemplate, SearchTemplate,
};
