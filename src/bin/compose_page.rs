//! Compose pages offline: splice shared header/footer fragments into page
//! files and check that pages are structured for composition.

use clap::{Args, Parser, Subcommand};
use pagechrome::dom::parse_html;
use pagechrome::{
  ChromeConfig, Error, FixedHeader, FragmentFetcher, HttpFetcher, PageChrome, Result,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use url::Url;

#[derive(Parser, Debug)]
#[command(
  name = "compose_page",
  version,
  about = "Splice shared page chrome into HTML pages"
)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Compose one page: fetch header/footer fragments relative to a base and
  /// write the spliced document
  Compose(ComposeArgs),
  /// Check that pages contain both placeholders and no inline chrome
  Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct ComposeArgs {
  /// Page to compose (file path or http(s) URL)
  page: String,

  /// Base URL or directory the fragment names are resolved against
  #[arg(long)]
  base: String,

  /// Location path used for navigation highlighting (defaults to the page
  /// file name)
  #[arg(long)]
  location: Option<String>,

  /// Output file (defaults to stdout)
  #[arg(long)]
  out: Option<String>,
}

#[derive(Args, Debug)]
struct VerifyArgs {
  /// Pages to check
  pages: Vec<String>,
}

fn main() {
  env_logger::init();
  let cli = Cli::parse();
  let code = match cli.command {
    Command::Compose(args) => match run_compose(&args) {
      Ok(()) => 0,
      Err(err) => {
        eprintln!("compose failed: {err}");
        1
      }
    },
    Command::Verify(args) => run_verify(&args),
  };
  std::process::exit(code);
}

fn run_compose(args: &ComposeArgs) -> Result<()> {
  let fetcher = HttpFetcher::new();
  let page_html = fetcher.fetch(&args.page)?.text;
  let mut root = parse_html(&page_html)?;

  let defaults = ChromeConfig::default();
  let config = ChromeConfig {
    header_url: resolve_fragment_url(&args.base, &defaults.header_url)?,
    footer_url: resolve_fragment_url(&args.base, &defaults.footer_url)?,
    ..defaults
  };

  let location = match &args.location {
    Some(location) => location.clone(),
    None => format!("/{}", page_file_name(&args.page)),
  };

  let mut chrome = PageChrome::builder()
    .config(config)
    .fetcher(Arc::new(fetcher))
    .layout_behavior(Box::new(FixedHeader::new()))
    .build();
  let report = chrome.compose(&mut root, &location);

  if !report.header.is_injected() {
    eprintln!("warning: header not injected: {:?}", report.header);
  }
  if !report.footer.is_injected() {
    eprintln!("warning: footer not injected: {:?}", report.footer);
  }

  let html = root.outer_html();
  match &args.out {
    Some(path) => fs::write(path, html)?,
    None => println!("{html}"),
  }
  Ok(())
}

fn run_verify(args: &VerifyArgs) -> i32 {
  let config = ChromeConfig::default();
  let mut failures = 0usize;
  for page in &args.pages {
    let html = match fs::read_to_string(page) {
      Ok(html) => html,
      Err(err) => {
        eprintln!("{page}: cannot read: {err}");
        failures += 1;
        continue;
      }
    };
    let root = match parse_html(&html) {
      Ok(root) => root,
      Err(err) => {
        eprintln!("{page}: {err}");
        failures += 1;
        continue;
      }
    };
    let issues = pagechrome::loader::verify_page_structure(&root, &config);
    if issues.is_empty() {
      println!("{page}: ok");
    } else {
      failures += 1;
      for issue in issues {
        eprintln!("{page}: {issue}");
      }
    }
  }
  if failures == 0 {
    0
  } else {
    1
  }
}

/// Resolve a fragment name against a base URL or directory.
fn resolve_fragment_url(base: &str, name: &str) -> Result<String> {
  if base.starts_with("http://") || base.starts_with("https://") {
    // Treat the base as a directory so "header.html" lands next to it.
    let with_slash = if base.ends_with('/') {
      base.to_string()
    } else {
      format!("{base}/")
    };
    let resolved = Url::parse(&with_slash)
      .and_then(|url| url.join(name))
      .map_err(|e| {
        Error::Io(std::io::Error::new(
          std::io::ErrorKind::InvalidInput,
          format!("invalid base url '{base}': {e}"),
        ))
      })?;
    Ok(resolved.to_string())
  } else {
    Ok(Path::new(base).join(name).to_string_lossy().into_owned())
  }
}

fn page_file_name(page: &str) -> String {
  page
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or(page)
    .to_string()
}
