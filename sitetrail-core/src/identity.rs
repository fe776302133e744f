// Seed identity and cache keys

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

const DEFAULT_SCHEME: &str = "https";
const WWW_PREFIX: &str = "www.";

/// Canonical form of a seed URL, used to deduplicate crawls.
///
/// `https://www.ui.ac.id/`, `https://ui.ac.id` and `ui.ac.id` all map to
/// `https://ui.ac.id`. Query strings and fragments never take part in the
/// identity. Inputs without a scheme are treated as bare hostnames and get
/// `https`. Never fails: anything the URL parser rejects is split by hand.
pub fn normalize_identity(raw_url: &str) -> String {
    let raw_url = raw_url.trim();
    let with_scheme = if raw_url.contains("://") {
        raw_url.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, raw_url)
    };

    match Url::parse(&with_scheme) {
        Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => {
            let host = parsed.host_str().unwrap_or_default();
            let authority = match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
            compose(parsed.scheme(), &authority, parsed.path())
        }
        _ => normalize_by_hand(&with_scheme),
    }
}

fn normalize_by_hand(with_scheme: &str) -> String {
    let (scheme, rest) = with_scheme
        .split_once("://")
        .unwrap_or((DEFAULT_SCHEME, with_scheme));
    let scheme = if scheme.is_empty() { DEFAULT_SCHEME } else { scheme };

    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    compose(&scheme.to_lowercase(), &authority.to_lowercase(), path)
}

fn compose(scheme: &str, authority: &str, path: &str) -> String {
    let mut host = authority;
    while let Some(stripped) = host.strip_prefix(WWW_PREFIX) {
        host = stripped;
    }
    let path = path.trim_end_matches('/');
    format!("{}://{}{}", scheme, host, path)
}

/// Storage key for a record set: hex SHA-256 of the normalized identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    const FILE_PREFIX: &'static str = "crawled_data_";
    const FILE_EXTENSION: &'static str = ".json";

    /// Hash an already-normalized identity.
    pub fn from_identity(identity: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        let digest = hasher.finalize();
        CacheKey(format!("{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name used by the JSON store: `crawled_data_<hex>.json`.
    pub fn file_name(&self) -> String {
        format!("{}{}{}", Self::FILE_PREFIX, self.0, Self::FILE_EXTENSION)
    }

    /// Recover a key from a JSON store file name, if it follows the convention.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let hex = name
            .strip_prefix(Self::FILE_PREFIX)?
            .strip_suffix(Self::FILE_EXTENSION)?;
        let is_digest = hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit());
        is_digest.then(|| CacheKey(hex.to_ascii_lowercase()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize `raw_url` and hash it into a storage key.
pub fn derive_cache_key(raw_url: &str) -> CacheKey {
    CacheKey::from_identity(&normalize_identity(raw_url))
}
