pub mod dom;
pub mod error;
pub mod gate;
pub mod layout;
pub mod loader;
pub mod nav;
pub mod resource;

pub use error::{Error, Result};
pub use layout::{FixedHeader, LayoutBehavior};
pub use loader::{
  ChromeConfig, ComposeReport, FragmentStatus, PageChrome, PageChromeBuilder, StructureIssue,
};
pub use resource::{FetchedFragment, FragmentFetcher, HttpFetcher};
