//! Media source resolution
//!
//! Reads the source element once at construction time: surface dimensions
//! plus the vendor media URL, carried either on a nested
//! `<source type="video/youtube">` child or directly on the element.

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::types::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use serde::{Deserialize, Serialize};

/// Media type marking a nested source node as a vendor URL
pub const MEDIA_TYPE_YOUTUBE: &str = "video/youtube";

const WATCH_MARKER: &str = "watch?v=";
const EMBED_MARKER: &str = "embed/";

/// What the adapter learned from the source element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Raw media URL as found on the element
    pub url: String,
    /// Extracted vendor video id
    pub video_id: String,
    pub width: u32,
    pub height: u32,
}

/// Extract the vendor video id from a "watch" or "embed" style URL.
///
/// The id is the maximal run of characters after the marker, stopping at
/// `&`, `?` or `/`. Returns `None` when neither pattern matches or the run
/// is empty; no default id is ever guessed.
///
/// ```
/// use vidswap_core::source::extract_video_id_from_url;
///
/// assert_eq!(
///     extract_video_id_from_url("http://www.youtube.com/watch?v=nOEw9i3opwI"),
///     Some("nOEw9i3opwI")
/// );
/// assert_eq!(
///     extract_video_id_from_url("https://www.youtube.com/embed/nCJJdW20uZI"),
///     Some("nCJJdW20uZI")
/// );
/// ```
pub fn extract_video_id_from_url(url: &str) -> Option<&str> {
    let start = url
        .find(WATCH_MARKER)
        .map(|i| i + WATCH_MARKER.len())
        .or_else(|| url.find(EMBED_MARKER).map(|i| i + EMBED_MARKER.len()))?;
    let rest = &url[start..];
    let end = rest.find(['&', '?', '/']).unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

/// Resolve the media source of a native video element.
///
/// Looks for a nested source child with the vendor media type first, then
/// falls back to a `src` attribute on the element itself.
pub fn resolve_media_source(document: &dyn Document, el: NodeId) -> Result<MediaSource> {
    let url = nested_source_url(document, el)
        .or_else(|| document.attribute(el, "src"))
        .ok_or(Error::MissingMediaSource)?;

    let video_id = extract_video_id_from_url(&url)
        .ok_or_else(|| Error::NoVideoId { url: url.clone() })?
        .to_string();

    Ok(MediaSource {
        width: dimension(document, el, "width", DEFAULT_WIDTH),
        height: dimension(document, el, "height", DEFAULT_HEIGHT),
        url,
        video_id,
    })
}

fn nested_source_url(document: &dyn Document, el: NodeId) -> Option<String> {
    document.children(el).into_iter().find_map(|child| {
        let is_source = document
            .tag_name(child)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("source"));
        let is_vendor = document
            .attribute(child, "type")
            .is_some_and(|t| t == MEDIA_TYPE_YOUTUBE);
        (is_source && is_vendor)
            .then(|| document.attribute(child, "src"))
            .flatten()
    })
}

fn dimension(document: &dyn Document, el: NodeId, name: &str, fallback: u32) -> u32 {
    document
        .attribute(el, name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(fallback)
}
