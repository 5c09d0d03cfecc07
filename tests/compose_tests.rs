use pagechrome::dom::{parse_html, DomNode};
use pagechrome::{
  ChromeConfig, Error, FetchedFragment, FragmentFetcher, FragmentStatus, LayoutBehavior,
  PageChrome,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct MapFetcher {
  map: HashMap<String, String>,
}

impl MapFetcher {
  fn with_fragment(mut self, url: &str, html: &str) -> Self {
    self.map.insert(url.to_string(), html.to_string());
    self
  }
}

impl FragmentFetcher for MapFetcher {
  fn fetch(&self, url: &str) -> pagechrome::Result<FetchedFragment> {
    self
      .map
      .get(url)
      .map(|html| FetchedFragment::new(html.clone(), Some("text/html".to_string())))
      .ok_or_else(|| Error::FetchFailed {
        url: url.to_string(),
        status: 404,
      })
  }
}

fn header_fragment(hrefs: &[&str]) -> String {
  let items = hrefs
    .iter()
    .map(|href| format!("<li><a href=\"{href}\">{href}</a></li>"))
    .collect::<String>();
  format!(
    "<header><nav id=\"m5000\"><ul class=\"navContainer\">{items}</ul></nav></header>"
  )
}

fn site_fetcher() -> MapFetcher {
  MapFetcher::default()
    .with_fragment(
      "header.html",
      &header_fragment(&["index.html", "about.html", "contact.html"]),
    )
    .with_fragment("footer.html", "<footer><p>X</p></footer>")
}

fn migrated_page() -> DomNode {
  parse_html(
    "<html><body><div id=\"header-placeholder\"></div>\
     <main>content</main>\
     <div id=\"footer-placeholder\"></div></body></html>",
  )
  .expect("page should parse")
}

fn active_hrefs(root: &DomNode) -> Vec<String> {
  let mut active = Vec::new();
  root.walk_tree(&mut |node| {
    if node.tag_name() == Some("li") && node.has_class("active") {
      if let Some(anchor) = node.children.iter().find(|c| c.tag_name() == Some("a")) {
        if let Some(href) = anchor.get_attribute("href") {
          active.push(href.to_string());
        }
      }
    }
  });
  active
}

/// Records what the document looked like each time the layout hook ran.
struct LayoutProbe {
  observations: Arc<Mutex<Vec<Vec<String>>>>,
}

impl LayoutBehavior for LayoutProbe {
  fn rebind(&mut self, root: &DomNode) {
    self.observations.lock().unwrap().push(active_hrefs(root));
  }
}

#[test]
fn composes_header_and_footer_into_a_page() {
  let mut chrome = PageChrome::new(Arc::new(site_fetcher()));
  let mut root = migrated_page();

  let report = chrome.compose(&mut root, "/about.html");
  assert!(report.header.is_injected());
  assert!(report.footer.is_injected());

  let header = root.find_element_by_id("header-placeholder").unwrap();
  assert!(header.inner_html().contains("<nav id=\"m5000\">"));
  assert_eq!(active_hrefs(&root), vec!["about.html"]);

  let footer = root.find_element_by_id("footer-placeholder").unwrap();
  assert_eq!(footer.inner_html(), "<footer><p>X</p></footer>");
}

#[test]
fn root_location_highlights_the_home_entry() {
  let mut chrome = PageChrome::new(Arc::new(site_fetcher()));
  let mut root = migrated_page();

  let report = chrome.compose(&mut root, "/");
  assert!(report.header.is_injected());
  assert_eq!(active_hrefs(&root), vec!["index.html"]);
}

#[test]
fn header_failure_does_not_prevent_footer_injection() {
  let fetcher = MapFetcher::default().with_fragment("footer.html", "<p>X</p>");
  let mut chrome = PageChrome::new(Arc::new(fetcher));
  let mut root = migrated_page();

  let report = chrome.compose(&mut root, "/about.html");

  match &report.header {
    FragmentStatus::FetchFailed(err) => {
      let msg = err.to_string();
      assert!(msg.contains("header.html"), "missing url in: {msg}");
      assert!(msg.contains("404"), "missing status in: {msg}");
    }
    other => panic!("unexpected header status: {other:?}"),
  }
  assert!(report.footer.is_injected());

  let header = root.find_element_by_id("header-placeholder").unwrap();
  assert_eq!(header.inner_html(), "");
  let footer = root.find_element_by_id("footer-placeholder").unwrap();
  assert_eq!(footer.inner_html(), "<p>X</p>");
}

#[test]
fn header_failure_skips_highlight_and_layout() {
  let observations = Arc::new(Mutex::new(Vec::new()));
  let fetcher = MapFetcher::default().with_fragment("footer.html", "<p>X</p>");
  let mut chrome = PageChrome::builder()
    .fetcher(Arc::new(fetcher))
    .layout_behavior(Box::new(LayoutProbe {
      observations: Arc::clone(&observations),
    }))
    .build();
  let mut root = migrated_page();

  chrome.compose(&mut root, "/about.html");
  assert!(
    observations.lock().unwrap().is_empty(),
    "layout hook must not run when the header load fails"
  );
}

#[test]
fn layout_rebind_runs_after_highlighting() {
  let observations = Arc::new(Mutex::new(Vec::new()));
  let mut chrome = PageChrome::builder()
    .fetcher(Arc::new(site_fetcher()))
    .layout_behavior(Box::new(LayoutProbe {
      observations: Arc::clone(&observations),
    }))
    .build();
  let mut root = migrated_page();

  chrome.compose(&mut root, "/contact.html");

  let seen = observations.lock().unwrap();
  assert_eq!(seen.len(), 1, "layout hook runs once per composition");
  assert_eq!(
    seen[0],
    vec!["contact.html"],
    "the active entry must already be marked when the layout hook runs"
  );
}

#[test]
fn custom_selectors_are_honored() {
  let fetcher = MapFetcher::default()
    .with_fragment("top.html", &header_fragment(&["about.html"]))
    .with_fragment("bottom.html", "<p>bottom</p>");
  let config = ChromeConfig {
    header_placeholder_id: "top".to_string(),
    footer_placeholder_id: "bottom".to_string(),
    header_url: "top.html".to_string(),
    footer_url: "bottom.html".to_string(),
    ..ChromeConfig::default()
  };
  let mut chrome = PageChrome::builder()
    .config(config)
    .fetcher(Arc::new(fetcher))
    .build();
  let mut root = parse_html(
    "<html><body><div id=\"top\"></div><div id=\"bottom\"></div></body></html>",
  )
  .unwrap();

  let report = chrome.compose(&mut root, "/about.html");
  assert!(report.header.is_injected());
  assert!(report.footer.is_injected());
  assert_eq!(active_hrefs(&root), vec!["about.html"]);
}

#[test]
fn compose_when_ready_waits_for_the_provider() {
  let mut chrome = PageChrome::builder()
    .config(ChromeConfig {
      gate_interval: Duration::from_millis(1),
      gate_max_wait: Duration::from_millis(500),
      ..ChromeConfig::default()
    })
    .fetcher(Arc::new(site_fetcher()))
    .build();

  let mut remaining_misses = 3u32;
  let (root, report) = chrome
    .compose_when_ready(
      || {
        if remaining_misses > 0 {
          remaining_misses -= 1;
          None
        } else {
          Some(migrated_page())
        }
      },
      "/about.html",
    )
    .expect("gate should open once the provider yields a document");

  assert!(report.header.is_injected());
  assert_eq!(active_hrefs(&root), vec!["about.html"]);
}

#[test]
fn compose_when_ready_times_out_on_a_dead_provider() {
  let mut chrome = PageChrome::builder()
    .config(ChromeConfig {
      gate_interval: Duration::from_millis(1),
      gate_max_wait: Duration::from_millis(10),
      ..ChromeConfig::default()
    })
    .fetcher(Arc::new(site_fetcher()))
    .build();

  let result = chrome.compose_when_ready(|| None, "/index.html");
  assert!(matches!(result, Err(Error::GateTimeout { .. })));
}
