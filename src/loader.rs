//! Page-chrome composition
//!
//! This module is the public entry point of the crate. [`PageChrome`] wraps
//! the full composition pipeline with an ergonomic API:
//!
//! ```text
//! document ready → header fragment → inject → nav highlight → layout rebind
//!                  footer fragment → inject
//! ```
//!
//! The two fragment loads are independent: a header failure never prevents
//! the footer load, and vice versa. Fragment failures are terminal to their
//! own load only and are surfaced as leveled diagnostics plus a
//! [`FragmentStatus`] in the returned report, never as a propagated error.
//!
//! Everything the original page script looked up from ambient scope is an
//! explicit dependency here: the fetcher and the optional layout behavior
//! are injected at construction time, and every selector the pipeline
//! touches is a named [`ChromeConfig`] field rather than a hardcoded
//! literal.
//!
//! # Example
//!
//! ```rust,ignore
//! use pagechrome::{PageChrome, ChromeConfig};
//! use pagechrome::dom::parse_html;
//!
//! let mut chrome = PageChrome::builder().build();
//! let mut root = parse_html(page_html)?;
//! let report = chrome.compose(&mut root, "/about.html");
//! assert!(report.header.is_injected());
//! ```

use crate::dom::{self, DomNode};
use crate::error::Result;
use crate::gate;
use crate::layout::{self, LayoutBehavior};
use crate::nav;
use crate::resource::{FragmentFetcher, HttpFetcher};
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Duration;

/// Named selector/role constants for the composition pipeline.
///
/// Defaults match the site this crate was extracted from; embedders with
/// different markup conventions override the relevant fields.
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Element id of the header placeholder in the host document
    pub header_placeholder_id: String,

    /// Element id of the footer placeholder in the host document
    pub footer_placeholder_id: String,

    /// Resource URL of the header fragment
    pub header_url: String,

    /// Resource URL of the footer fragment
    pub footer_url: String,

    /// Element id of the navigation root (`nav`) inside the header fragment
    pub nav_root_id: String,

    /// Class of the link list container (`ul`) inside the navigation root
    pub nav_list_class: String,

    /// Class applied to the navigation entry for the current page
    pub active_class: String,

    /// Canonical home document name used when the location has no file segment
    pub home_file: String,

    /// Probe interval of the readiness gate
    pub gate_interval: Duration,

    /// Deadline of the readiness gate
    pub gate_max_wait: Duration,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            header_placeholder_id: "header-placeholder".to_string(),
            footer_placeholder_id: "footer-placeholder".to_string(),
            header_url: "header.html".to_string(),
            footer_url: "footer.html".to_string(),
            nav_root_id: "m5000".to_string(),
            nav_list_class: "navContainer".to_string(),
            active_class: "active".to_string(),
            home_file: "index.html".to_string(),
            gate_interval: Duration::from_millis(50),
            gate_max_wait: Duration::from_secs(10),
        }
    }
}

impl ChromeConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}

/// Outcome of a single fragment load.
///
/// Only `Injected` modifies the document. The failure variants leave the
/// placeholder untouched and skip the post-injection step.
#[derive(Debug)]
pub enum FragmentStatus {
    /// Fragment fetched and spliced into the placeholder
    Injected,
    /// The placeholder is absent from the document; no fetch was issued
    MissingPlaceholder,
    /// The fetch or fragment parse failed; the placeholder is unchanged
    FetchFailed(crate::error::Error),
}

impl FragmentStatus {
    pub fn is_injected(&self) -> bool {
        matches!(self, FragmentStatus::Injected)
    }
}

/// Per-fragment outcomes of one composition run.
#[derive(Debug)]
pub struct ComposeReport {
    pub header: FragmentStatus,
    pub footer: FragmentStatus,
}

/// Structural defect found by [`verify_page_structure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureIssue {
    /// The header placeholder element is missing from the document
    MissingHeaderPlaceholder,
    /// The footer placeholder element is missing from the document
    MissingFooterPlaceholder,
    /// An inline `header`/`footer` element exists outside the placeholders
    ChromeOutsidePlaceholder { tag: String },
}

impl std::fmt::Display for StructureIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureIssue::MissingHeaderPlaceholder => {
                write!(f, "missing header placeholder element")
            }
            StructureIssue::MissingFooterPlaceholder => {
                write!(f, "missing footer placeholder element")
            }
            StructureIssue::ChromeOutsidePlaceholder { tag } => {
                write!(f, "inline <{tag}> element outside the chrome placeholders")
            }
        }
    }
}

/// Check that a page is prepared for composition: both placeholders exist
/// and no inline `header`/`footer` chrome lives outside them.
pub fn verify_page_structure(root: &DomNode, config: &ChromeConfig) -> Vec<StructureIssue> {
    let mut issues = Vec::new();
    if root.find_element_by_id(&config.header_placeholder_id).is_none() {
        issues.push(StructureIssue::MissingHeaderPlaceholder);
    }
    if root.find_element_by_id(&config.footer_placeholder_id).is_none() {
        issues.push(StructureIssue::MissingFooterPlaceholder);
    }
    collect_misplaced_chrome(root, config, false, &mut issues);
    issues
}

fn collect_misplaced_chrome(
    node: &DomNode,
    config: &ChromeConfig,
    inside_placeholder: bool,
    issues: &mut Vec<StructureIssue>,
) {
    let inside = inside_placeholder
        || node.has_id(&config.header_placeholder_id)
        || node.has_id(&config.footer_placeholder_id);

    if !inside {
        if let Some(tag @ ("header" | "footer")) = node.tag_name() {
            issues.push(StructureIssue::ChromeOutsidePlaceholder {
                tag: tag.to_string(),
            });
        }
    }

    for child in &node.children {
        collect_misplaced_chrome(child, config, inside, issues);
    }
}

/// Composes shared page chrome into a parsed document.
///
/// Holds the injected dependencies (fragment fetcher, optional layout
/// behavior) and the selector configuration. One instance can compose any
/// number of documents; it keeps no per-document state.
pub struct PageChrome {
    config: ChromeConfig,
    fetcher: Arc<dyn FragmentFetcher>,
    layout: Option<Box<dyn LayoutBehavior>>,
}

impl std::fmt::Debug for PageChrome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageChrome")
            .field("config", &self.config)
            .field("has_layout_behavior", &self.layout.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for creating [`PageChrome`] instances
///
/// # Example
///
/// ```rust,ignore
/// let chrome = PageChrome::builder()
///     .config(ChromeConfig::new())
///     .fetcher(Arc::new(HttpFetcher::new()))
///     .layout_behavior(Box::new(FixedHeader::new()))
///     .build();
/// ```
pub struct PageChromeBuilder {
    config: ChromeConfig,
    fetcher: Option<Arc<dyn FragmentFetcher>>,
    layout: Option<Box<dyn LayoutBehavior>>,
}

impl PageChromeBuilder {
    pub fn new() -> Self {
        Self {
            config: ChromeConfig::default(),
            fetcher: None,
            layout: None,
        }
    }

    /// Sets the selector configuration
    pub fn config(mut self, config: ChromeConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the fragment fetcher
    pub fn fetcher(mut self, fetcher: Arc<dyn FragmentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Registers the optional layout behavior collaborator
    pub fn layout_behavior(mut self, behavior: Box<dyn LayoutBehavior>) -> Self {
        self.layout = Some(behavior);
        self
    }

    pub fn build(self) -> PageChrome {
        PageChrome {
            config: self.config,
            fetcher: self
                .fetcher
                .unwrap_or_else(|| Arc::new(HttpFetcher::new())),
            layout: self.layout,
        }
    }
}

impl Default for PageChromeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageChrome {
    /// Creates a PageChrome with the default configuration and no layout
    /// behavior
    pub fn new(fetcher: Arc<dyn FragmentFetcher>) -> Self {
        Self::builder().fetcher(fetcher).build()
    }

    pub fn builder() -> PageChromeBuilder {
        PageChromeBuilder::new()
    }

    pub fn config(&self) -> &ChromeConfig {
        &self.config
    }

    /// Fetch a fragment and splice it into the placeholder with the given id.
    ///
    /// The placeholder-existence check is synchronous and happens before the
    /// fetch; when the placeholder is absent no network I/O happens at all.
    /// On success the placeholder's previous content is replaced wholesale.
    /// On failure the placeholder is left untouched and the error is logged
    /// with the resource URL (and status code for HTTP failures).
    pub fn load_fragment(
        &self,
        root: &mut DomNode,
        placeholder_id: &str,
        url: &str,
    ) -> FragmentStatus {
        self.load_fragment_with(root, placeholder_id, url, |_| {})
    }

    /// Like [`load_fragment`](Self::load_fragment), but runs `on_injected`
    /// exactly once after a successful injection. The step is skipped on any
    /// failure path.
    pub fn load_fragment_with<F>(
        &self,
        root: &mut DomNode,
        placeholder_id: &str,
        url: &str,
        on_injected: F,
    ) -> FragmentStatus
    where
        F: FnOnce(&mut DomNode),
    {
        if root.find_element_by_id(placeholder_id).is_none() {
            warn!("loader: no element found for placeholder id '{placeholder_id}'");
            return FragmentStatus::MissingPlaceholder;
        }

        debug!("loader: fetching {url} for '{placeholder_id}'");
        let fragment = match self.fetcher.fetch(url) {
            Ok(fragment) => fragment,
            Err(err) => {
                error!("loader: {err}");
                return FragmentStatus::FetchFailed(err);
            }
        };

        let nodes = match dom::parse_fragment(&fragment.text) {
            Ok(nodes) => nodes,
            Err(err) => {
                error!("loader: fragment from {url} did not parse: {err}");
                return FragmentStatus::FetchFailed(err);
            }
        };

        let Some(placeholder) = root.find_element_by_id_mut(placeholder_id) else {
            warn!("loader: placeholder '{placeholder_id}' disappeared before injection");
            return FragmentStatus::MissingPlaceholder;
        };
        placeholder.replace_children(nodes);
        debug!(
            "loader: injected {url} into '{placeholder_id}' ({} bytes)",
            fragment.text.len()
        );

        on_injected(root);
        FragmentStatus::Injected
    }

    /// Compose a document: load the header fragment and, on success, run the
    /// navigation highlighter and then the layout re-initializer, strictly
    /// in that order. That ordering is a documented contract of this
    /// pipeline. Then load the footer fragment with no follow-up.
    ///
    /// Failure in either fragment is isolated: a header failure does not
    /// prevent the footer load, and vice versa.
    pub fn compose(&mut self, root: &mut DomNode, location_path: &str) -> ComposeReport {
        debug!("loader: composing chrome for '{location_path}'");

        let header_placeholder = self.config.header_placeholder_id.clone();
        let header_url = self.config.header_url.clone();
        let header = self.load_fragment(root, &header_placeholder, &header_url);
        if header.is_injected() {
            nav::set_active_nav_link(root, &self.config, location_path);
            layout::reinit_layout(self.layout.as_deref_mut(), root);
        }

        let footer_placeholder = self.config.footer_placeholder_id.clone();
        let footer_url = self.config.footer_url.clone();
        let footer = self.load_fragment(root, &footer_placeholder, &footer_url);

        ComposeReport { header, footer }
    }

    /// Gate [`compose`](Self::compose) on a document provider becoming
    /// ready, polling at the configured interval up to the configured
    /// deadline. A gate timeout is fatal to this composition only and is
    /// reported as [`crate::Error::GateTimeout`].
    pub fn compose_when_ready<P>(
        &mut self,
        mut provider: P,
        location_path: &str,
    ) -> Result<(DomNode, ComposeReport)>
    where
        P: FnMut() -> Option<DomNode>,
    {
        let mut root = gate::poll_until(
            self.config.gate_interval,
            self.config.gate_max_wait,
            || provider(),
        )?;
        let report = self.compose(&mut root, location_path);
        Ok((root, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn config_defaults_match_site_conventions() {
        let config = ChromeConfig::new();
        assert_eq!(config.header_placeholder_id, "header-placeholder");
        assert_eq!(config.footer_placeholder_id, "footer-placeholder");
        assert_eq!(config.header_url, "header.html");
        assert_eq!(config.footer_url, "footer.html");
        assert_eq!(config.nav_root_id, "m5000");
        assert_eq!(config.nav_list_class, "navContainer");
        assert_eq!(config.active_class, "active");
        assert_eq!(config.home_file, "index.html");
    }

    #[test]
    fn verify_accepts_a_migrated_page() {
        let root = parse_html(
            "<html><body><div id=\"header-placeholder\"></div>\
             <main>content</main>\
             <div id=\"footer-placeholder\"></div></body></html>",
        )
        .unwrap();
        assert!(verify_page_structure(&root, &ChromeConfig::default()).is_empty());
    }

    #[test]
    fn verify_flags_missing_placeholders() {
        let root = parse_html("<html><body><main>content</main></body></html>").unwrap();
        let issues = verify_page_structure(&root, &ChromeConfig::default());
        assert!(issues.contains(&StructureIssue::MissingHeaderPlaceholder));
        assert!(issues.contains(&StructureIssue::MissingFooterPlaceholder));
    }

    #[test]
    fn verify_flags_inline_chrome_outside_placeholders() {
        let root = parse_html(
            "<html><body><div id=\"header-placeholder\"></div>\
             <header>inline</header>\
             <div id=\"footer-placeholder\"></div></body></html>",
        )
        .unwrap();
        let issues = verify_page_structure(&root, &ChromeConfig::default());
        assert!(issues.contains(&StructureIssue::ChromeOutsidePlaceholder {
            tag: "header".to_string()
        }));
    }

    #[test]
    fn verify_allows_chrome_inside_placeholders() {
        let root = parse_html(
            "<html><body><div id=\"header-placeholder\"><header>ok</header></div>\
             <div id=\"footer-placeholder\"><footer>ok</footer></div></body></html>",
        )
        .unwrap();
        assert!(verify_page_structure(&root, &ChromeConfig::default()).is_empty());
    }
}
