//! Raw page records and their classification into PDC entities.
//!
//! The fetch layer hands over pages in the shape the API returns them:
//! identifier, title, length, protection entries, and category memberships
//! with their sort key and attachment timestamp. Field presence is verified
//! by [`validate`] rather than by the deserializer, so a partial record can
//! still be inspected and reported.

use chrono::{DateTime, Utc};
use log::warn;
use serde::Deserialize;

use crate::models::category::{resolve_best, CategoryError, CategoryKind, DayCategory};
use crate::models::pdc::{InvalidTitleError, PageId, Pdc, RUNNING_CATEGORY};

/// Error raised while validating or classifying a raw page record.
///
/// Everything except [`RecordError::InvalidTitle`] reflects normal data
/// noise: the record is dropped, logged, and processing continues.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// A required top-level field is absent.
    #[error("missing property {0}")]
    MissingField(&'static str),

    /// A category membership lacks one of its required sub-fields.
    #[error("missing property {0} in categories")]
    MissingCategoryField(&'static str),

    /// The record carries no category memberships at all.
    #[error("no category")]
    NoCategories,

    /// A timestamp does not parse as an API timestamp.
    #[error("bad timestamp {value:?}: {source}")]
    BadTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// No membership resolved to a known daily variant; the record cannot
    /// be classified.
    #[error("the PDC was in {total} categories and no one was recognized")]
    NoRecognizedCategory { total: usize },

    /// A record batch failed to deserialize.
    #[error("malformed record batch at {path}: {message}")]
    MalformedBatch { path: String, message: String },

    /// The record's title is outside the PDC prefix: the upstream record
    /// selection is broken. Fatal.
    #[error(transparent)]
    InvalidTitle(#[from] InvalidTitleError),
}

/// Protection entry of a page record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProtection {
    #[serde(rename = "type")]
    pub kind: String,
    pub level: String,
    #[serde(default)]
    pub expiry: Option<String>,
}

/// Category membership of a page record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCategory {
    pub title: Option<String>,
    #[serde(rename = "sortkeyprefix")]
    pub sortkey_prefix: Option<String>,
    pub timestamp: Option<String>,
}

/// One page as returned by the fetch layer.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPageRecord {
    #[serde(rename = "pageid")]
    pub page_id: Option<PageId>,
    pub title: Option<String>,
    pub length: Option<u64>,
    pub touched: Option<String>,
    pub protection: Option<Vec<RawProtection>>,
    pub categories: Option<Vec<RawCategory>>,
}

/// Check that a raw record has the shape the classifier needs. Pure.
pub fn validate(record: &RawPageRecord) -> Result<(), RecordError> {
    if record.page_id.is_none() {
        return Err(RecordError::MissingField("pageid"));
    }
    if record.title.is_none() {
        return Err(RecordError::MissingField("title"));
    }
    if record.length.is_none() {
        return Err(RecordError::MissingField("length"));
    }
    if record.touched.is_none() {
        return Err(RecordError::MissingField("touched"));
    }
    if record.protection.is_none() {
        return Err(RecordError::MissingField("protection"));
    }

    let categories = record
        .categories
        .as_ref()
        .ok_or(RecordError::MissingField("categories"))?;
    for category in categories {
        if category.title.is_none() {
            return Err(RecordError::MissingCategoryField("title"));
        }
        if category.sortkey_prefix.is_none() {
            return Err(RecordError::MissingCategoryField("sortkeyprefix"));
        }
        if category.timestamp.is_none() {
            return Err(RecordError::MissingCategoryField("timestamp"));
        }
    }
    if categories.is_empty() {
        return Err(RecordError::NoCategories);
    }

    Ok(())
}

/// Classify a raw record into a PDC entity.
///
/// Category memberships are scanned in the order received. The
/// running-procedures marker stops the scan; memberships inside the daily
/// family whose date cannot be read are skipped with a warning; a record
/// where nothing was recognized cannot be classified at all.
pub fn build_pdc(record: &RawPageRecord) -> Result<Pdc, RecordError> {
    validate(record)?;

    let id = record.page_id.ok_or(RecordError::MissingField("pageid"))?;
    let title = record
        .title
        .as_deref()
        .ok_or(RecordError::MissingField("title"))?;
    let length = record.length.ok_or(RecordError::MissingField("length"))?;
    let protection = record
        .protection
        .as_deref()
        .ok_or(RecordError::MissingField("protection"))?;
    let memberships = record
        .categories
        .as_deref()
        .ok_or(RecordError::MissingField("categories"))?;

    // The subject title comes from the {{DEFAULTSORT}} sort key, identical
    // on every membership; the first one is taken as received.
    let title_subject = memberships
        .first()
        .and_then(|category| category.sortkey_prefix.clone())
        .ok_or(RecordError::MissingCategoryField("sortkeyprefix"))?;

    let mut is_running = false;
    let mut variants: Vec<DayCategory> = Vec::new();
    for membership in memberships {
        let category_title = membership
            .title
            .as_deref()
            .ok_or(RecordError::MissingCategoryField("title"))?;
        if category_title == RUNNING_CATEGORY {
            is_running = true;
            break;
        }
        match DayCategory::parse_title(category_title) {
            Ok(Some(variant)) => {
                let raw_timestamp = membership
                    .timestamp
                    .as_deref()
                    .ok_or(RecordError::MissingCategoryField("timestamp"))?;
                let observed = parse_timestamp(raw_timestamp)?;
                variants.push(variant.with_observed(observed));
            }
            Ok(None) => {}
            Err(err @ CategoryError::UnknownCategory(_)) => {
                warn!("{}", err);
            }
        }
    }

    if variants.is_empty() {
        return Err(RecordError::NoRecognizedCategory {
            total: memberships.len(),
        });
    }

    // The attachment timestamp of the generic day category doubles as the
    // creation instant, but only when it lands on the category's own
    // calendar day; re-categorization can postdate creation.
    let creation = variants
        .iter()
        .find(|variant| variant.kind == CategoryKind::Day)
        .and_then(|day| day.observed.filter(|ts| ts.date_naive() == day.date));

    let best = resolve_best(&variants).ok_or(RecordError::NoRecognizedCategory {
        total: memberships.len(),
    })?;

    let is_protected = protection
        .iter()
        .any(|entry| entry.kind == "edit" && entry.level == "sysop");

    let pdc = Pdc::new(
        best,
        id,
        title,
        title_subject,
        length,
        creation,
        is_protected,
        is_running,
    )?;
    Ok(pdc)
}

/// Parse an API timestamp, e.g. "2018-05-04T09:41:00Z".
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RecordError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| RecordError::BadTimestamp {
            value: value.to_string(),
            source,
        })
}

/// Deserialize a JSON array of raw page records, reporting the path of the
/// first offending field on failure.
pub fn parse_records(json: &str) -> Result<Vec<RawPageRecord>, RecordError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        RecordError::MalformedBatch {
            path,
            message: err.into_inner().to_string(),
        }
    })
}
