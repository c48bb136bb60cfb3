//! In-memory wiki collaborator.
//!
//! This module provides a local implementation of all collaborator traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic, and
//! isolated execution.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::{FetchError, FetchResult};
use super::{PageHistorySource, RecordSource, WikitextSource};
use crate::models::pdc::PageId;
use crate::parsing::record::RawPageRecord;

/// In-memory wiki.
///
/// Fixture data is registered through the setter methods; every trait call
/// then answers from memory. Cloning shares the underlying store.
#[derive(Clone, Default)]
pub struct LocalWiki {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Default)]
struct LocalData {
    category_records: HashMap<String, Vec<RawPageRecord>>,
    existing_titles: HashSet<String>,
    creation_dates: HashMap<PageId, DateTime<Utc>>,
    lastedit_dates: HashMap<PageId, DateTime<Utc>>,
    wikitexts: HashMap<String, String>,
}

impl LocalWiki {
    /// Create a new empty local wiki.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the member records of a category.
    pub fn add_category_records(
        &self,
        category_title: impl Into<String>,
        records: Vec<RawPageRecord>,
    ) {
        let mut data = self.data.write().unwrap();
        data.category_records
            .entry(category_title.into())
            .or_default()
            .extend(records);
    }

    /// Mark a title as existing for the bulk existence probe.
    pub fn add_existing_title(&self, title: impl Into<String>) {
        let mut data = self.data.write().unwrap();
        data.existing_titles.insert(title.into());
    }

    /// Register the first-revision timestamp of a page.
    pub fn set_creation_date(&self, page_id: PageId, date: DateTime<Utc>) {
        let mut data = self.data.write().unwrap();
        data.creation_dates.insert(page_id, date);
    }

    /// Register the latest-revision timestamp of a page.
    pub fn set_lastedit_date(&self, page_id: PageId, date: DateTime<Utc>) {
        let mut data = self.data.write().unwrap();
        data.lastedit_dates.insert(page_id, date);
    }

    /// Register the wikitext of a page; its title counts as existing too.
    pub fn set_wikitext(&self, title: impl Into<String>, wikitext: impl Into<String>) {
        let mut data = self.data.write().unwrap();
        let title = title.into();
        data.existing_titles.insert(title.clone());
        data.wikitexts.insert(title, wikitext.into());
    }

    /// Clear all fixture data.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        *data = LocalData::default();
    }
}

#[async_trait]
impl RecordSource for LocalWiki {
    async fn fetch_category_records(
        &self,
        category_title: &str,
    ) -> FetchResult<Vec<RawPageRecord>> {
        let data = self.data.read().unwrap();
        Ok(data
            .category_records
            .get(category_title)
            .cloned()
            .unwrap_or_default())
    }

    async fn missing_titles(&self, titles: &[String]) -> FetchResult<Vec<String>> {
        let data = self.data.read().unwrap();
        Ok(titles
            .iter()
            .filter(|title| !data.existing_titles.contains(*title))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PageHistorySource for LocalWiki {
    async fn fetch_creation_date(&self, page_id: PageId) -> FetchResult<DateTime<Utc>> {
        let data = self.data.read().unwrap();
        data.creation_dates
            .get(&page_id)
            .copied()
            .ok_or_else(|| FetchError::NotFound(format!("no revisions for page {}", page_id)))
    }

    async fn fetch_lastedit_date(&self, page_id: PageId) -> FetchResult<DateTime<Utc>> {
        let data = self.data.read().unwrap();
        data.lastedit_dates
            .get(&page_id)
            .copied()
            .ok_or_else(|| FetchError::NotFound(format!("no revisions for page {}", page_id)))
    }
}

#[async_trait]
impl WikitextSource for LocalWiki {
    async fn fetch_wikitext(&self, title: &str) -> FetchResult<String> {
        let data = self.data.read().unwrap();
        data.wikitexts
            .get(title)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("page {:?} does not exist", title)))
    }
}
