//! Active navigation link derivation
//!
//! After the header fragment is injected, the navigation markup it carries
//! knows nothing about which page is being viewed. [`set_active_nav_link`]
//! closes that gap: it derives the current page's file name from the
//! location path and toggles the configured active class so that exactly the
//! matching entry carries it.
//!
//! The comparison is an exact, case-sensitive string match against each
//! anchor's `href`; query strings, fragments, and relative prefixes are not
//! normalized. The link set is read fresh from the document on every call,
//! so the function is idempotent and safe to re-run after any injection.
//! Duplicate hrefs all match; which entries end up marked in that case is an
//! unresolved product question, not something this function guards against.

use crate::dom::DomNode;
use crate::loader::ChromeConfig;
use log::{debug, warn};

/// Derive the current page's file name from a location path.
///
/// Takes the last path segment; a path that ends in `/` (or is empty) maps
/// to the canonical home document name.
pub fn page_filename<'a>(location_path: &'a str, home_file: &'a str) -> &'a str {
  let name = location_path.rsplit('/').next().unwrap_or(location_path);
  if name.is_empty() {
    home_file
  } else {
    name
  }
}

/// Toggle the active class across the navigation link set.
///
/// Finds the nav root (a `nav` element with the configured id) and its list
/// container (`ul` with the configured class), then marks each `li` whose
/// first anchor child's `href` equals the derived file name and unmarks all
/// others. Pre-existing markers on non-matching entries are always cleared.
/// A missing nav root or list container is a quiet no-op: the header
/// fragment may legitimately not carry navigation.
pub fn set_active_nav_link(root: &mut DomNode, config: &ChromeConfig, location_path: &str) {
  let filename = page_filename(location_path, &config.home_file);
  debug!("nav: location '{location_path}' resolves to '{filename}'");

  let Some(nav) = root.find_element_mut(&|node| {
    node.tag_name() == Some("nav") && node.has_id(&config.nav_root_id)
  }) else {
    warn!("nav: no nav element with id '{}' found", config.nav_root_id);
    return;
  };

  let Some(list) = nav.find_element_mut(&|node| {
    node.tag_name() == Some("ul") && node.has_class(&config.nav_list_class)
  }) else {
    warn!(
      "nav: no ul with class '{}' inside nav '{}'",
      config.nav_list_class, config.nav_root_id
    );
    return;
  };

  for item in &mut list.children {
    if item.tag_name() != Some("li") {
      continue;
    }
    let href = item
      .children
      .iter()
      .find(|child| child.tag_name() == Some("a"))
      .and_then(|anchor| anchor.get_attribute("href"))
      .map(str::to_string);

    if href.as_deref() == Some(filename) {
      debug!("nav: marking '{filename}' active");
      item.add_class(&config.active_class);
    } else {
      item.remove_class(&config.active_class);
    }
  }
}
