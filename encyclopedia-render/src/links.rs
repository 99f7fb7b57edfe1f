//! URLs for entry pages.

/// Path of the page showing `title`
pub fn entry_url(title: &str) -> String {
    format!("/wiki/{}", urlencoding::encode(title))
}

/// Path of the edit form for `title`
pub fn edit_url(title: &str) -> String {
    format!("/edit/{}", urlencoding::encode(title))
}

/// A title paired with the link to its page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLink {
    pub title: String,
    pub url: String,
}

impl EntryLink {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let url = entry_url(&title);
        Self { title, url }
    }

    pub fn all<I: IntoIterator<Item = String>>(titles: I) -> Vec<Self> {
        titles.into_iter().map(Self::new).collect()
    }
}
