//! Fragment fetching abstraction
//!
//! This module provides a trait-based abstraction for retrieving HTML
//! fragments (header/footer partials) as text. This keeps the loader
//! agnostic about where fragments come from, enabling:
//!
//! - Mocking for tests
//! - Offline/filesystem-backed sites
//! - Custom transports
//!
//! Fragments are always fetched fresh; there is deliberately no caching
//! layer here. Fragment content is trusted, author-controlled HTML and is
//! not sanitized.
//!
//! # Example
//!
//! ```rust,ignore
//! use pagechrome::resource::{FragmentFetcher, HttpFetcher};
//!
//! let fetcher = HttpFetcher::new();
//! let fragment = fetcher.fetch("https://example.com/header.html")?;
//! println!("Got {} bytes", fragment.text.len());
//! ```

use crate::error::{Error, Result};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default User-Agent string used by HTTP fetchers
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36 pagechrome/0.1";

// ============================================================================
// Core types
// ============================================================================

/// Result of fetching a fragment
#[derive(Debug, Clone)]
pub struct FetchedFragment {
    /// Raw text of the fragment, exactly as returned by the source
    pub text: String,
    /// Content-Type header value, if available (e.g., "text/html")
    pub content_type: Option<String>,
}

impl FetchedFragment {
    /// Create a new FetchedFragment
    pub fn new(text: String, content_type: Option<String>) -> Self {
        Self { text, content_type }
    }

    /// Check if this fragment appears to be HTML based on content-type
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false)
    }
}

// ============================================================================
// FragmentFetcher trait
// ============================================================================

/// Trait for retrieving fragments
///
/// This abstraction allows different fetch implementations:
/// - [`HttpFetcher`]: Default HTTP implementation with timeouts
/// - Custom implementations for mocking, offline mode, etc.
///
/// URLs can be:
/// - `http://` or `https://` - fetch over network
/// - `file://` or a bare path - read from filesystem
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across threads.
pub trait FragmentFetcher: Send + Sync {
    /// Fetch a fragment from the given URL
    ///
    /// Returns `Ok(FetchedFragment)` containing the text and optional
    /// content-type. A non-success HTTP status yields
    /// [`Error::FetchFailed`] carrying the URL and status code.
    fn fetch(&self, url: &str) -> Result<FetchedFragment>;
}

// Allow Arc<dyn FragmentFetcher> to be used as FragmentFetcher
impl<T: FragmentFetcher + ?Sized> FragmentFetcher for Arc<T> {
    fn fetch(&self, url: &str) -> Result<FetchedFragment> {
        (**self).fetch(url)
    }
}

// ============================================================================
// HttpFetcher - Default implementation
// ============================================================================

/// Default HTTP fragment fetcher
///
/// Fetches fragments over HTTP/HTTPS with configurable timeouts and user
/// agent. Also handles `file://` URLs and bare filesystem paths.
///
/// # Example
///
/// ```rust,ignore
/// use pagechrome::resource::HttpFetcher;
/// use std::time::Duration;
///
/// let fetcher = HttpFetcher::new()
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("MySite/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    user_agent: String,
    max_size: usize,
}

impl HttpFetcher {
    /// Create a new HttpFetcher with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the maximum response size in bytes
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Fetch from an HTTP/HTTPS URL
    fn fetch_http(&self, url: &str) -> Result<FetchedFragment> {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .http_status_as_error(false)
            .build();
        let agent: ureq::Agent = config.into();

        let mut response = agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(Error::FetchFailed {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.max_size as u64)
            .read_to_vec()
            .map_err(|e| Error::Io(e.into_io()))?;

        Ok(FetchedFragment::new(
            String::from_utf8_lossy(&bytes).into_owned(),
            content_type,
        ))
    }

    /// Fetch from a file:// URL or bare filesystem path
    fn fetch_file(&self, url: &str) -> Result<FetchedFragment> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let text = std::fs::read_to_string(path)?;
        Ok(FetchedFragment::new(
            text,
            guess_content_type_from_path(path),
        ))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_size: 10 * 1024 * 1024, // 10MB default limit
        }
    }
}

impl FragmentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedFragment> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url)
        } else {
            self.fetch_file(url)
        }
    }
}

/// Guess content-type from file path extension
fn guess_content_type_from_path(path: &str) -> Option<String> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let mime = match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" => "text/plain",
        _ => return None,
    };

    Some(mime.to_string())
}

// ============================================================================
// Tests
// ============================================================================
