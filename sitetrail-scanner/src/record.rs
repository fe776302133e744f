use serde::{Deserialize, Deserializer, Serialize};

/// Title used when a page has no `<title>` or the stored record omits it.
pub const DEFAULT_TITLE: &str = "No Title";

/// One visited page, as persisted in a record set.
///
/// The JSON shape (`url`, `title`, `content`, `parent`, `depth`) is the
/// interchange format with the record stores. Missing fields fall back to
/// defaults, and so do explicit nulls, so a partially written file still
/// loads; a record that ends up with an empty `url` is skipped by the indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default = "default_title", deserialize_with = "title_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub depth: usize,
}

/// Every record produced by one crawl of one seed, in discovery order.
pub type RecordSet = Vec<CrawlRecord>;

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn title_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let title = Option::<String>::deserialize(deserializer)?;
    Ok(title.unwrap_or_else(default_title))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl CrawlRecord {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        parent: Option<String>,
        depth: usize,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: content.into(),
            parent,
            depth,
        }
    }

    /// The crawl root: no parent.
    pub fn seed(url: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(url, title, content, None, 0)
    }

    /// The parent URL, treating an empty string the same as an absent one.
    pub fn parent_url(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| !p.is_empty())
    }

    pub fn is_seed(&self) -> bool {
        self.parent_url().is_none()
    }

    /// Records without a URL cannot be indexed.
    pub fn is_indexable(&self) -> bool {
        !self.url.is_empty()
    }
}
