//! The per-day classification pass: merge duplicate sightings, keep the
//! target date, fill missing data, sort, and index by variant.
//!
//! The raw record lists arrive grouped by the daily category they were
//! fetched from; a page sitting in several of those categories therefore
//! shows up once per list and is merged down to a single entity carrying
//! the most specific variant observed.
//!
//! ```ignore
//! let mut grouped = Vec::new();
//! for kind in CategoryKind::all() {
//!     let records = wiki.fetch_category_records(&kind.daily_title(date)).await?;
//!     grouped.push((kind, records));
//! }
//! let day = classify_day(date, grouped, &wiki).await?;
//! for (kind, pdcs) in &day.by_kind {
//!     render_section(kind, pdcs);
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};

use crate::models::category::CategoryKind;
use crate::models::pdc::{PageId, Pdc};
use crate::parsing::record::{build_pdc, RawPageRecord, RecordError};
use crate::parsing::themes::scrape_subject_themes;
use crate::wiki::{FetchError, PageHistorySource, WikitextSource};

/// Outcome of classifying one calendar day.
#[derive(Debug)]
pub struct DayClassification {
    /// The day that was classified.
    pub date: NaiveDate,
    /// Raw record count per fetched variant list, before merging. The
    /// caller uses this to decide whether a daily category was non-empty.
    pub raw_counts: BTreeMap<CategoryKind, usize>,
    /// Entities of the day, sorted by creation date within each kind.
    pub by_kind: BTreeMap<CategoryKind, Vec<Pdc>>,
}

impl DayClassification {
    /// Number of distinct PDCs retained for the day.
    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.values().all(Vec::is_empty)
    }

    /// All retained entities, in kind order then creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Pdc> {
        self.by_kind.values().flatten()
    }

    /// Entities still open for discussion.
    pub fn running(&self) -> impl Iterator<Item = &Pdc> {
        self.iter().filter(|pdc| pdc.is_running())
    }

    /// Entities whose procedure has ended.
    pub fn ended(&self) -> impl Iterator<Item = &Pdc> {
        self.iter().filter(|pdc| !pdc.is_running())
    }
}

/// Classify one day's raw record lists into merged, filtered, sorted,
/// per-kind indexed entities.
///
/// Records that fail validation or carry no recognizable category are
/// dropped as data noise. A record whose title sits outside the PDC prefix
/// aborts the pass instead: it means the fetch layer selected the wrong
/// pages.
pub async fn classify_day<S>(
    date: NaiveDate,
    grouped: Vec<(CategoryKind, Vec<RawPageRecord>)>,
    source: &S,
) -> Result<DayClassification>
where
    S: PageHistorySource + WikitextSource + ?Sized,
{
    let mut raw_counts: BTreeMap<CategoryKind, usize> = BTreeMap::new();
    let mut order: Vec<PageId> = Vec::new();
    let mut merged: HashMap<PageId, Pdc> = HashMap::new();

    for (kind, records) in grouped {
        *raw_counts.entry(kind).or_insert(0) += records.len();
        for record in &records {
            let pdc = match build_pdc(record) {
                Ok(pdc) => pdc,
                Err(err @ RecordError::InvalidTitle(_)) => {
                    return Err(err).context("record selection produced a non-PDC page");
                }
                Err(err) => {
                    debug!("dropping record from the {:?} list: {}", kind, err);
                    continue;
                }
            };
            match merged.get_mut(&pdc.id()) {
                Some(existing) => existing
                    .merge(&pdc)
                    .context("merging duplicate sightings of one page")?,
                None => {
                    order.push(pdc.id());
                    merged.insert(pdc.id(), pdc);
                }
            }
        }
    }

    let mut pdcs: Vec<Pdc> = Vec::with_capacity(order.len());
    for id in order {
        if let Some(pdc) = merged.remove(&id) {
            pdcs.push(pdc);
        }
    }

    let mut pdcs = filter_by_date(pdcs, date);
    info!("{}: {} PDCs after merge and date filter", date, pdcs.len());

    populate_missing(&mut pdcs, source)
        .await
        .context("populating creation/last-edit dates and themes")?;
    sort_by_creation(&mut pdcs);

    Ok(DayClassification {
        date,
        raw_counts,
        by_kind: index_by_kind(pdcs),
    })
}

/// Keep only entities whose category belongs to `date`. Queries anchored on
/// an adjacent day can surface strays; equality on the calendar day is the
/// only criterion.
pub fn filter_by_date(pdcs: Vec<Pdc>, date: NaiveDate) -> Vec<Pdc> {
    pdcs.into_iter()
        .filter(|pdc| pdc.start_date() == date)
        .collect()
}

/// Fill the lazily-fetched fields ahead of sorting and rendering: creation
/// date, last-edit date, and the subject themes. A subject page that does
/// not exist simply yields no themes.
pub async fn populate_missing<S>(pdcs: &mut [Pdc], source: &S) -> Result<(), FetchError>
where
    S: PageHistorySource + WikitextSource + ?Sized,
{
    for pdc in pdcs.iter_mut() {
        pdc.creation_date(source).await?;
        pdc.lastedit_date(source).await?;

        if pdc.subject_themes().is_empty() {
            let subject = pdc.title_subject().to_string();
            match source.fetch_wikitext(&subject).await {
                Ok(wikitext) => {
                    for theme in scrape_subject_themes(&wikitext) {
                        pdc.add_subject_theme(theme);
                    }
                }
                Err(FetchError::NotFound(_)) => {
                    debug!("subject page {:?} not found, no themes", subject);
                }
                Err(err) => return Err(err),
            }
        }
    }
    Ok(())
}

/// Stable sort by creation date. [`populate_missing`] must have run first;
/// an entity somehow still missing its creation date sorts last.
pub fn sort_by_creation(pdcs: &mut [Pdc]) {
    pdcs.sort_by_key(|pdc| {
        pdc.cached_creation_date()
            .map_or(i64::MAX, |date| date.timestamp())
    });
}

/// Partition into per-kind buckets, keeping the incoming order within each.
pub fn index_by_kind(pdcs: Vec<Pdc>) -> BTreeMap<CategoryKind, Vec<Pdc>> {
    let mut by_kind: BTreeMap<CategoryKind, Vec<Pdc>> = BTreeMap::new();
    for pdc in pdcs {
        by_kind.entry(pdc.kind()).or_default().push(pdc);
    }
    by_kind
}
