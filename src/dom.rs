//! Owned HTML document tree
//!
//! Documents and fragments are parsed with html5ever into an `RcDom` and
//! immediately converted into an owned [`DomNode`] tree, so the rest of the
//! crate works with plain values instead of reference-counted handles.
//! Comments, doctypes, and processing instructions are dropped during
//! conversion; only the document, elements, and text survive.
//!
//! Fragment injection works on this tree: a fetched fragment is parsed in a
//! `div` context and its children spliced into the placeholder via
//! [`DomNode::replace_children`]. Serialization back to HTML is provided by
//! [`DomNode::inner_html`] and [`DomNode::outer_html`]; injected content is
//! therefore compared and emitted in serialized form, not as the raw fetched
//! bytes.

use crate::error::{Error, Result};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{local_name, namespace_url, ns, parse_document, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::io;

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Elements serialized without an end tag and without children.
const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
  "track", "wbr",
];

/// Elements whose text content is emitted verbatim, not entity-escaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
  pub node_type: DomNodeType,
  pub children: Vec<DomNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomNodeType {
  Document,
  Element {
    tag_name: String,
    namespace: String,
    attributes: Vec<(String, String)>,
  },
  Text {
    content: String,
  },
}

fn parse_opts() -> ParseOpts {
  ParseOpts {
    tree_builder: TreeBuilderOpts {
      scripting_enabled: false,
      ..Default::default()
    },
    ..Default::default()
  }
}

/// Parse a complete HTML document into an owned tree.
pub fn parse_html(html: &str) -> Result<DomNode> {
  let mut reader = io::Cursor::new(html.as_bytes());
  let dom = parse_document(RcDom::default(), parse_opts())
    .from_utf8()
    .read_from(&mut reader)
    .map_err(|e| Error::InvalidHtml {
      message: format!("Failed to parse HTML: {}", e),
    })?;

  convert_handle(&dom.document).ok_or_else(|| Error::InvalidHtml {
    message: "Document has no root node".to_string(),
  })
}

/// Parse an HTML fragment (in a `div` context) into its top-level nodes.
///
/// This is the injection path: the returned nodes become the new children of
/// a placeholder element. An empty fragment yields an empty vec.
pub fn parse_fragment(html: &str) -> Result<Vec<DomNode>> {
  let context = QualName::new(None, ns!(html), local_name!("div"));
  let mut reader = io::Cursor::new(html.as_bytes());
  let dom = html5ever::parse_fragment(RcDom::default(), parse_opts(), context, vec![])
    .from_utf8()
    .read_from(&mut reader)
    .map_err(|e| Error::InvalidHtml {
      message: format!("Failed to parse fragment: {}", e),
    })?;

  let document = convert_handle(&dom.document).ok_or_else(|| Error::InvalidHtml {
    message: "Fragment has no root node".to_string(),
  })?;

  // The fragment algorithm wraps parsed content in a synthetic `html` root.
  for child in document.children {
    if child.tag_name() == Some("html") {
      return Ok(child.children);
    }
  }
  Ok(Vec::new())
}

fn convert_handle(handle: &Handle) -> Option<DomNode> {
  let node_type = match &handle.data {
    NodeData::Document => DomNodeType::Document,
    NodeData::Element { name, attrs, .. } => DomNodeType::Element {
      tag_name: name.local.to_string(),
      namespace: name.ns.to_string(),
      attributes: attrs
        .borrow()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect(),
    },
    NodeData::Text { contents } => DomNodeType::Text {
      content: contents.borrow().to_string(),
    },
    NodeData::Comment { .. } | NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {
      return None
    }
  };

  let children = handle
    .children
    .borrow()
    .iter()
    .filter_map(convert_handle)
    .collect();

  Some(DomNode { node_type, children })
}

impl DomNode {
  pub fn is_element(&self) -> bool {
    matches!(self.node_type, DomNodeType::Element { .. })
  }

  pub fn tag_name(&self) -> Option<&str> {
    match &self.node_type {
      DomNodeType::Element { tag_name, .. } => Some(tag_name),
      _ => None,
    }
  }

  pub fn text_content(&self) -> Option<&str> {
    match &self.node_type {
      DomNodeType::Text { content } => Some(content),
      _ => None,
    }
  }

  pub fn get_attribute(&self, name: &str) -> Option<&str> {
    match &self.node_type {
      DomNodeType::Element { attributes, .. } => attributes
        .iter()
        .find(|(attr_name, _)| attr_name == name)
        .map(|(_, value)| value.as_str()),
      _ => None,
    }
  }

  /// Set an attribute, replacing any existing value.
  pub fn set_attribute(&mut self, name: &str, value: &str) {
    if let DomNodeType::Element { attributes, .. } = &mut self.node_type {
      if let Some(entry) = attributes.iter_mut().find(|(attr_name, _)| attr_name == name) {
        entry.1 = value.to_string();
      } else {
        attributes.push((name.to_string(), value.to_string()));
      }
    }
  }

  pub fn remove_attribute(&mut self, name: &str) {
    if let DomNodeType::Element { attributes, .. } = &mut self.node_type {
      attributes.retain(|(attr_name, _)| attr_name != name);
    }
  }

  pub fn has_id(&self, id: &str) -> bool {
    self.get_attribute("id") == Some(id)
  }

  pub fn has_class(&self, class: &str) -> bool {
    self
      .get_attribute("class")
      .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
      .unwrap_or(false)
  }

  /// Add a class token, preserving any others already present.
  pub fn add_class(&mut self, class: &str) {
    if self.has_class(class) {
      return;
    }
    let updated = match self.get_attribute("class") {
      Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
      _ => class.to_string(),
    };
    self.set_attribute("class", &updated);
  }

  /// Remove a class token; drops the attribute entirely when empty.
  pub fn remove_class(&mut self, class: &str) {
    let Some(existing) = self.get_attribute("class") else {
      return;
    };
    let remaining = existing
      .split_ascii_whitespace()
      .filter(|c| *c != class)
      .collect::<Vec<_>>()
      .join(" ");
    if remaining.is_empty() {
      self.remove_attribute("class");
    } else {
      self.set_attribute("class", &remaining);
    }
  }

  pub fn element_children(&self) -> Vec<&DomNode> {
    self.children.iter().filter(|c| c.is_element()).collect()
  }

  /// Depth-first pre-order walk over the whole subtree, including `self`.
  pub fn walk_tree<F>(&self, f: &mut F)
  where
    F: FnMut(&DomNode),
  {
    f(self);
    for child in &self.children {
      child.walk_tree(f);
    }
  }

  /// First element (depth-first) with the given id.
  pub fn find_element_by_id(&self, id: &str) -> Option<&DomNode> {
    self.find_element(&|node| node.has_id(id))
  }

  pub fn find_element_by_id_mut(&mut self, id: &str) -> Option<&mut DomNode> {
    self.find_element_mut(&|node| node.has_id(id))
  }

  /// First element (depth-first) matching the predicate.
  pub fn find_element(&self, pred: &dyn Fn(&DomNode) -> bool) -> Option<&DomNode> {
    if self.is_element() && pred(self) {
      return Some(self);
    }
    for child in &self.children {
      if let Some(found) = child.find_element(pred) {
        return Some(found);
      }
    }
    None
  }

  pub fn find_element_mut(&mut self, pred: &dyn Fn(&DomNode) -> bool) -> Option<&mut DomNode> {
    if self.is_element() && pred(self) {
      return Some(self);
    }
    for child in &mut self.children {
      if let Some(found) = child.find_element_mut(pred) {
        return Some(found);
      }
    }
    None
  }

  /// First element with the given tag, together with the element that follows
  /// it among its siblings. Used to re-bind layout behaviors whose cached
  /// references predate a fragment injection.
  pub fn find_element_with_following(&self, tag: &str) -> Option<(&DomNode, Option<&DomNode>)> {
    let position = self
      .children
      .iter()
      .position(|child| child.tag_name() == Some(tag));
    if let Some(idx) = position {
      let following = self.children[idx + 1..].iter().find(|c| c.is_element());
      return Some((&self.children[idx], following));
    }
    for child in &self.children {
      if let Some(found) = child.find_element_with_following(tag) {
        return Some(found);
      }
    }
    None
  }

  /// Replace this node's content wholesale. The old children are dropped.
  pub fn replace_children(&mut self, new_children: Vec<DomNode>) {
    self.children = new_children;
  }

  /// Serialize the node's children to HTML text.
  pub fn inner_html(&self) -> String {
    let raw_text = self
      .tag_name()
      .map(|tag| RAW_TEXT_ELEMENTS.contains(&tag))
      .unwrap_or(false);
    let mut out = String::new();
    for child in &self.children {
      child.serialize_into(&mut out, raw_text);
    }
    out
  }

  /// Serialize the node itself (or, for a document, its children) to HTML text.
  pub fn outer_html(&self) -> String {
    let mut out = String::new();
    self.serialize_into(&mut out, false);
    out
  }

  fn serialize_into(&self, out: &mut String, raw_text: bool) {
    match &self.node_type {
      DomNodeType::Document => {
        for child in &self.children {
          child.serialize_into(out, false);
        }
      }
      DomNodeType::Text { content } => {
        if raw_text {
          out.push_str(content);
        } else {
          escape_text_into(content, out);
        }
      }
      DomNodeType::Element {
        tag_name,
        attributes,
        ..
      } => {
        out.push('<');
        out.push_str(tag_name);
        for (name, value) in attributes {
          out.push(' ');
          out.push_str(name);
          out.push_str("=\"");
          escape_attr_into(value, out);
          out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&tag_name.as_str()) {
          return;
        }
        let child_raw = RAW_TEXT_ELEMENTS.contains(&tag_name.as_str());
        for child in &self.children {
          child.serialize_into(out, child_raw);
        }
        out.push_str("</");
        out.push_str(tag_name);
        out.push('>');
      }
    }
  }
}

fn escape_text_into(text: &str, out: &mut String) {
  for ch in text.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      _ => out.push(ch),
    }
  }
}

fn escape_attr_into(value: &str, out: &mut String) {
  for ch in value.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '"' => out.push_str("&quot;"),
      _ => out.push(ch),
    }
  }
}
