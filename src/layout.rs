//! Layout behavior re-binding
//!
//! Page-chrome behaviors (such as a header that becomes fixed on scroll)
//! cache references to the elements they manage. Fragment injection replaces
//! those elements, so any references captured before composition are stale
//! afterwards. The loader does not own such behaviors; it only offers them a
//! chance to re-bind against the freshly injected document.
//!
//! The collaborator is optional by design: a page without the fixed-header
//! enhancement composes exactly the same, and its absence is reported at
//! info level, not as an error.

use crate::dom::DomNode;
use log::{debug, info};

/// Seam for page-chrome behaviors whose element references must be refreshed
/// after a fragment injection.
pub trait LayoutBehavior {
  /// Re-point cached element references at the current document and re-run
  /// the behavior's own initialization.
  fn rebind(&mut self, root: &DomNode);
}

/// Fixed-header behavior: caches the document's `header` element and the
/// element that follows it (the scroll spacer), refreshing both on rebind.
#[derive(Debug, Default)]
pub struct FixedHeader {
  header_html: Option<String>,
  next_el_html: Option<String>,
  init_count: usize,
}

impl FixedHeader {
  pub fn new() -> Self {
    Self::default()
  }

  /// Serialized form of the currently bound header element, if any.
  pub fn header_html(&self) -> Option<&str> {
    self.header_html.as_deref()
  }

  /// Serialized form of the element following the header, if any.
  pub fn next_el_html(&self) -> Option<&str> {
    self.next_el_html.as_deref()
  }

  /// Number of times the behavior has been (re-)initialized.
  pub fn init_count(&self) -> usize {
    self.init_count
  }

  fn init(&mut self) {
    self.init_count += 1;
  }
}

impl LayoutBehavior for FixedHeader {
  fn rebind(&mut self, root: &DomNode) {
    match root.find_element_with_following("header") {
      Some((header, following)) => {
        self.header_html = Some(header.outer_html());
        self.next_el_html = following.map(|node| node.outer_html());
      }
      None => {
        self.header_html = None;
        self.next_el_html = None;
      }
    }
    self.init();
  }
}

/// Offer an optional layout behavior the chance to re-bind.
///
/// No-op (with an info diagnostic) when the collaborator is absent.
pub fn reinit_layout(behavior: Option<&mut (dyn LayoutBehavior + '_)>, root: &DomNode) {
  match behavior {
    Some(behavior) => {
      debug!("layout: re-binding behavior to injected content");
      behavior.rebind(root);
    }
    None => info!("layout: no behavior registered, skipping re-init"),
  }
}
