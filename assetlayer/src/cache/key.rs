//! Cache keys for asset requests.
//!
//! Every cache-eligible request maps to exactly one [`CacheKey`]. The key is a
//! closed enum rather than a concatenated string, so an entity `("a:b", "c")`
//! can never collide with an entity `("a", "b:c")`.
//!
//! Keys also have a canonical text form used for logging and for exact-key
//! invalidation:
//!
//! ```text
//! entity:map:100000000
//! section:map:100000000:info
//! blob:abc123def456
//! ```
//!
//! Components containing `%` or `:` are percent-escaped, so the text form
//! round-trips through [`str::parse`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Base path of the remote asset API.
pub const API_PREFIX: &str = "/api/v1";

/// Identity of a cache-eligible asset request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A whole asset entity.
    Entity { asset_type: String, id: String },
    /// A named section of an asset entity.
    Section {
        asset_type: String,
        id: String,
        section: String,
    },
    /// A content-addressed binary blob.
    Blob { hash: String },
}

impl CacheKey {
    /// Key for a whole entity.
    pub fn entity(asset_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Entity {
            asset_type: asset_type.into(),
            id: id.into(),
        }
    }

    /// Key for a section of an entity.
    pub fn section(
        asset_type: impl Into<String>,
        id: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self::Section {
            asset_type: asset_type.into(),
            id: id.into(),
            section: section.into(),
        }
    }

    /// Key for a blob.
    pub fn blob(hash: impl Into<String>) -> Self {
        Self::Blob { hash: hash.into() }
    }

    /// Short name of the request kind (`entity`, `section` or `blob`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Entity { .. } => "entity",
            Self::Section { .. } => "section",
            Self::Blob { .. } => "blob",
        }
    }

    /// Returns `true` for blob keys, whose payload is raw bytes.
    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Blob { .. })
    }

    /// Request path on the remote API for this key.
    ///
    /// Path segments are percent-encoded, so ids containing `/` or spaces
    /// still address a single resource. Returns `None` when a component is
    /// empty, `.` or `..`: URL normalization would drop or collapse such a
    /// segment and the request would reach a different resource.
    pub fn request_path(&self) -> Option<String> {
        let path = match self {
            Self::Entity { asset_type, id } => format!(
                "{}/asset/{}/{}",
                API_PREFIX,
                path_segment(asset_type)?,
                path_segment(id)?
            ),
            Self::Section {
                asset_type,
                id,
                section,
            } => format!(
                "{}/asset/{}/{}/{}",
                API_PREFIX,
                path_segment(asset_type)?,
                path_segment(id)?,
                path_segment(section)?
            ),
            Self::Blob { hash } => format!("{}/blob/{}", API_PREFIX, path_segment(hash)?),
        };
        Some(path)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity { asset_type, id } => {
                write!(f, "entity:{}:{}", escape(asset_type), escape(id))
            }
            Self::Section {
                asset_type,
                id,
                section,
            } => write!(
                f,
                "section:{}:{}:{}",
                escape(asset_type),
                escape(id),
                escape(section)
            ),
            Self::Blob { hash } => write!(f, "blob:{}", escape(hash)),
        }
    }
}

/// Error parsing the canonical text form of a [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    /// The leading kind is not `entity`, `section` or `blob`.
    #[error("unknown cache key kind '{0}'")]
    UnknownKind(String),

    /// The kind is valid but the number of components is wrong.
    #[error("cache key '{key}' has {found} components, expected {expected}")]
    WrongArity {
        key: String,
        expected: usize,
        found: usize,
    },

    /// A component contains a malformed percent escape.
    #[error("invalid escape sequence in cache key '{0}'")]
    BadEscape(String),
}

impl FromStr for CacheKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let kind = parts.next().unwrap_or_default();
        let rest = parts
            .map(|part| unescape(part).ok_or_else(|| KeyParseError::BadEscape(s.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        let expected = match kind {
            "entity" => 2,
            "section" => 3,
            "blob" => 1,
            other => return Err(KeyParseError::UnknownKind(other.to_string())),
        };
        if rest.len() != expected {
            return Err(KeyParseError::WrongArity {
                key: s.to_string(),
                expected,
                found: rest.len(),
            });
        }

        let mut rest = rest.into_iter();
        let mut next = || rest.next().unwrap_or_default();
        Ok(match kind {
            "entity" => CacheKey::entity(next(), next()),
            "section" => CacheKey::section(next(), next(), next()),
            _ => CacheKey::blob(next()),
        })
    }
}

fn escape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(component: &str) -> Option<String> {
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let code: String = chars.by_ref().take(2).collect();
        match code.as_str() {
            "25" => out.push('%'),
            "3A" | "3a" => out.push(':'),
            _ => return None,
        }
    }
    Some(out)
}

/// Encoded path segment, or `None` for a dot or empty segment.
fn path_segment(component: &str) -> Option<String> {
    match component {
        "" | "." | ".." => None,
        _ => Some(encode_segment(component)),
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
