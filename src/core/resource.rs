//! Resource categories and the load mechanism chosen for each.
//!
//! Dispatch is keyed by the lower-cased file extension of the URL path, with
//! any query string or fragment stripped first.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::timeout_guard::AbortSignal;

/// Content category of a resource, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    /// jpg, jpeg, png, gif, webp, svg
    Image,
    /// mp3, wav, ogg
    Audio,
    /// mp4, webm, mov, avi, mkv, flv
    Video,
    /// woff, woff2, ttf
    Font,
    /// Anything else; loaded with a plain network fetch.
    Other,
}

impl ResourceCategory {
    /// Classify a URL by its extension.
    pub fn from_url(url: &str) -> Self {
        match extension_of(url).as_deref() {
            Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "svg") => Self::Image,
            Some("mp3" | "wav" | "ogg") => Self::Audio,
            Some("mp4" | "webm" | "mov" | "avi" | "mkv" | "flv") => Self::Video,
            Some("woff" | "woff2" | "ttf") => Self::Font,
            _ => Self::Other,
        }
    }

    /// Mechanism the host should use to load resources of this category.
    pub const fn mechanism(self) -> LoadMechanism {
        match self {
            Self::Image => LoadMechanism::MediaElement {
                success_event: "load",
            },
            Self::Audio => LoadMechanism::MediaElement {
                success_event: "canplaythrough",
            },
            Self::Video => LoadMechanism::MediaElement {
                success_event: "loadedmetadata",
            },
            Self::Font => LoadMechanism::PreloadLink {
                success_event: "load",
            },
            Self::Other => LoadMechanism::NetworkFetch {
                mode: RequestMode::NoCors,
                cache: CacheMode::Default,
            },
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Font => "font",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Lower-cased extension of the last path segment, query and fragment removed.
fn extension_of(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Request mode for generic network fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Opaque response; status and body are not inspected.
    NoCors,
}

/// Cache mode for generic network fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// Host's default HTTP caching.
    Default,
}

/// How a resource is loaded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMechanism {
    /// Media element load; settles on `success_event` or `error`.
    MediaElement {
        /// Event that marks success.
        success_event: &'static str,
    },
    /// Preload link element, removed from the document once settled.
    PreloadLink {
        /// Event that marks success.
        success_event: &'static str,
    },
    /// Network fetch that resolves on response receipt regardless of status.
    NetworkFetch {
        /// Request mode.
        mode: RequestMode,
        /// Cache mode.
        cache: CacheMode,
    },
}

/// A single load handed to a [`ResourceFetcher`](super::ResourceFetcher).
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Resource URL.
    pub url: String,
    /// Category derived from the URL.
    pub category: ResourceCategory,
    /// Mechanism for the category.
    pub mechanism: LoadMechanism,
    /// Tripped when the timeout guard gives up, if the host supports it.
    pub signal: Option<AbortSignal>,
}

impl FetchRequest {
    /// Build a request for `url` with no abort signal attached.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let category = ResourceCategory::from_url(&url);
        Self {
            url,
            category,
            mechanism: category.mechanism(),
            signal: None,
        }
    }

    /// Attach an abort signal.
    #[must_use]
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// One URL or a list of URLs accepted by the preload entry points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceList(pub Vec<String>);

impl ResourceList {
    /// Consume into the underlying URLs.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for ResourceList {
    fn from(url: &str) -> Self {
        Self(vec![url.to_owned()])
    }
}

impl From<String> for ResourceList {
    fn from(url: String) -> Self {
        Self(vec![url])
    }
}

impl From<Vec<String>> for ResourceList {
    fn from(urls: Vec<String>) -> Self {
        Self(urls)
    }
}

impl From<Vec<&str>> for ResourceList {
    fn from(urls: Vec<&str>) -> Self {
        Self(urls.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for ResourceList {
    fn from(urls: &[&str]) -> Self {
        Self(urls.iter().map(|u| (*u).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ResourceList {
    fn from(urls: [&str; N]) -> Self {
        Self(urls.iter().map(|u| (*u).to_owned()).collect())
    }
}
