//! Maps site URLs to stable sheet identities and back.

use crate::error::CoreError;
use crate::models::{Section, SheetIdentity};
use url::Url;

/// Resolves an absolute site URL to its `(Section, numeric id)` identity.
///
/// The identifier is the first path segment composed purely of ASCII
/// digits; segments containing letters, hyphens or underscores never
/// qualify. The section comes from the host table independently. Both
/// halves must resolve or the whole resolution fails.
pub fn resolve(raw: &str) -> Result<SheetIdentity, CoreError> {
    let url =
        Url::parse(raw).map_err(|_| CoreError::InvalidIdentity(raw.to_string()))?;

    let section = url
        .host_str()
        .and_then(Section::from_host)
        .ok_or_else(|| CoreError::InvalidIdentity(raw.to_string()))?;

    let id = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .find(|segment| segment.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|segment| segment.parse::<u32>().ok())
        .ok_or_else(|| CoreError::InvalidIdentity(raw.to_string()))?;

    Ok(SheetIdentity { section, id })
}

/// Inverse of [`resolve`]: prefixes a relative path with the section host.
///
/// Absolute inputs pass through untouched. Anything that cannot form a
/// well-formed URL yields `None`, never a malformed value.
#[must_use]
pub fn build_url(section: Section, path: &str) -> Option<Url> {
    if path.is_empty() {
        return None;
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return Url::parse(path).ok();
    }

    let base = Url::parse(&section.base_url()).ok()?;
    base.join(path.trim_start_matches('/')).ok()
}
