//! External collaborator traits for the wiki backing the classifier.
//!
//! The core never talks to the network itself: record fetching, page
//! history lookups, and wikitext reads arrive through these traits. Calls
//! are awaited one at a time; retry and backoff, if any, belong to the
//! implementation behind the trait.
//!
//! # Module Organization
//!
//! - [`error`]: the shared [`FetchError`] type
//! - [`local`]: in-memory implementation for tests and local development
//!
//! # Composite Trait Bound
//!
//! For code that needs every collaborator capability, use the
//! [`WikiSource`] bound; it is implemented automatically for any type
//! implementing the three focused traits.

pub mod error;
pub mod local;

pub use error::{FetchError, FetchResult};
pub use local::LocalWiki;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::pdc::PageId;
use crate::parsing::record::RawPageRecord;

/// Raw record retrieval and the bulk existence probe.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the raw page records of every member of `category_title`,
    /// complete with protection entries and category memberships. How many
    /// API calls this takes is the implementation's business.
    async fn fetch_category_records(
        &self,
        category_title: &str,
    ) -> FetchResult<Vec<RawPageRecord>>;

    /// Which of `titles` do not exist. A title reported missing for any
    /// reason counts as absent, including transient lookup failures that
    /// the API surfaces the same way as true non-existence.
    async fn missing_titles(&self, titles: &[String]) -> FetchResult<Vec<String>>;
}

/// Exact page history timestamps.
///
/// The record's `touched` field is not a substitute for the last-edit date:
/// purges poison it.
#[async_trait]
pub trait PageHistorySource: Send + Sync {
    /// Timestamp of the first revision of the page.
    async fn fetch_creation_date(&self, page_id: PageId) -> FetchResult<DateTime<Utc>>;

    /// Timestamp of the latest revision of the page.
    async fn fetch_lastedit_date(&self, page_id: PageId) -> FetchResult<DateTime<Utc>>;
}

/// Wikitext of a page, used to scrape the themes of a discussed subject.
#[async_trait]
pub trait WikitextSource: Send + Sync {
    /// Current wikitext of `title`; [`FetchError::NotFound`] when the page
    /// does not exist.
    async fn fetch_wikitext(&self, title: &str) -> FetchResult<String>;
}

/// Composite bound for a complete wiki collaborator.
pub trait WikiSource: RecordSource + PageHistorySource + WikitextSource {}

impl<T> WikiSource for T where T: RecordSource + PageHistorySource + WikitextSource {}
