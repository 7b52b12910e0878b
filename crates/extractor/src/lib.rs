//! Content Fetcher: turns a documentation URL into simplified markdown text.

pub mod fetcher;
pub mod html;

pub use fetcher::{ContentSource, FetchError, FetchResult, FetcherSettings, WebFetcher};
pub use html::{extract_title, html_to_markdown};
