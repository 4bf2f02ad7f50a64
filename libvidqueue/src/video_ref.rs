//! External video reference parsing
//!
//! Users paste whatever the browser shows them. This module normalizes the
//! common shapes down to the 11-character video id the player embeds.
//!
//! # Supported Formats
//!
//! - Bare id: `dQw4w9WgXcQ`
//! - Watch URL: `https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42`
//! - Short URL: `https://youtu.be/dQw4w9WgXcQ?si=...`
//! - Embed, shorts and live URLs: `youtube.com/embed/<id>`, `/shorts/<id>`, `/live/<id>`
//!
//! # Example
//!
//! ```
//! use libvidqueue::video_ref::VideoRef;
//!
//! let r = VideoRef::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
//! assert_eq!(r.as_str(), "dQw4w9WgXcQ");
//! assert!(VideoRef::parse("not a video").is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EffectError;

const VIDEO_ID_LEN: usize = 11;

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];

const PATH_PREFIXES: &[&str] = &["/embed/", "/shorts/", "/live/", "/v/"];

/// Normalized external video id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoRef(String);

impl VideoRef {
    /// Parse a bare id or a supported URL
    ///
    /// # Errors
    ///
    /// Returns `EffectError::Validation` when the input matches none of the
    /// supported formats.
    pub fn parse(input: &str) -> Result<Self, EffectError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EffectError::Validation(
                "Video reference cannot be empty".to_string(),
            ));
        }

        if is_video_id(trimmed) {
            return Ok(Self(trimmed.to_string()));
        }

        extract_from_url(trimmed)
            .filter(|id| is_video_id(id))
            .map(|id| Self(id.to_string()))
            .ok_or_else(|| {
                EffectError::Validation(format!("Unrecognized video reference: '{}'", trimmed))
            })
    }

    /// Wrap a value that was validated before it was stored
    pub(crate) fn from_stored(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn extract_from_url(input: &str) -> Option<&str> {
    let without_scheme = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input);

    let (host, rest) = match without_scheme.find('/') {
        Some(idx) => without_scheme.split_at(idx),
        None => return None,
    };

    let host = host.to_ascii_lowercase();

    if host == "youtu.be" || host == "www.youtu.be" {
        return Some(strip_trailing(&rest[1..]));
    }

    if !YOUTUBE_HOSTS.contains(&host.as_str()) {
        return None;
    }

    if let Some(query) = rest.strip_prefix("/watch?") {
        return query
            .split('&')
            .find_map(|pair| pair.strip_prefix("v="))
            .map(strip_trailing);
    }

    PATH_PREFIXES
        .iter()
        .find_map(|prefix| rest.strip_prefix(prefix))
        .map(strip_trailing)
}

/// Cut at the first query, fragment or path separator
fn strip_trailing(s: &str) -> &str {
    let end = s.find(['?', '&', '#', '/']).unwrap_or(s.len());
    &s[..end]
}
