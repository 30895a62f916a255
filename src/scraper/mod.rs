pub mod candidates;
mod document;
mod fetcher;
pub mod text;

pub use candidates::extract_candidates;
pub use document::{MAX_TEXT_CHARS, parse_document};
pub use fetcher::{DocumentFetcher, FetchedPage, HttpFetcher, validate_url};
