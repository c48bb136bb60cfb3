//! The deletion-discussion page entity ("Procedura di cancellazione").
//!
//! A [`Pdc`] is built once from a validated raw record, merged with other
//! sightings of the same page during a classification pass, and read-only
//! afterwards except for the two memoized date fields.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::category::{resolve_best, CategoryKind, DayCategory};
use crate::wiki::{FetchError, PageHistorySource};

/// Page id, the stable merge key.
pub type PageId = u64;

/// Prefix of every PDC title.
pub const PDC_PREFIX: &str = "Wikipedia:Pagine da cancellare/";

/// Prefix of a PDC covering multiple subject pages. Nests under
/// [`PDC_PREFIX`].
pub const PDC_PREFIX_MULTIPLE: &str = "Wikipedia:Pagine da cancellare/multiple/";

/// Category marking procedures still open for discussion. Multiple PDCs
/// carry it too.
pub const RUNNING_CATEGORY: &str = "Categoria:Procedure di cancellazione in corso";

/// Fraction of a day past which a partial trailing day counts as a whole
/// one (around 16:48).
const DAY_THRESHOLD: f64 = 0.7;

/// Defensive invariant violation: a record selected for classification whose
/// title is not under the PDC prefix. Fatal rather than skippable, because it
/// means the upstream record selection is broken.
#[derive(Debug, thiserror::Error)]
#[error("not a deletion-discussion page: {title}")]
pub struct InvalidTitleError {
    pub title: String,
}

/// Error from merging two entities.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("cannot merge PDCs with different page ids: {left} != {right}")]
    IdMismatch { left: PageId, right: PageId },
}

/// Duration bucket used by the report pages. The actual wording belongs to
/// the caller's templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationText {
    /// Open for less than a day.
    Hours,
    /// Open for exactly one day.
    OneDay,
    /// Open for two or more days.
    Days(i64),
}

/// One deletion-discussion page.
#[derive(Debug, Clone)]
pub struct Pdc {
    id: PageId,
    title: String,
    title_subject: String,
    subject_themes: Vec<String>,
    length: u64,
    creation_date: Option<DateTime<Utc>>,
    lastedit_date: Option<DateTime<Utc>>,
    is_protected: bool,
    is_running: bool,
    category: DayCategory,
}

impl Pdc {
    /// Build the entity. The title must carry the PDC prefix.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        category: DayCategory,
        id: PageId,
        title: impl Into<String>,
        title_subject: impl Into<String>,
        length: u64,
        creation_date: Option<DateTime<Utc>>,
        is_protected: bool,
        is_running: bool,
    ) -> Result<Self, InvalidTitleError> {
        let title = title.into();
        if !title.starts_with(PDC_PREFIX) {
            return Err(InvalidTitleError { title });
        }
        Ok(Self {
            id,
            title,
            title_subject: title_subject.into(),
            subject_themes: Vec::new(),
            length,
            creation_date,
            lastedit_date: None,
            is_protected,
            is_running,
            category,
        })
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title of the subject page under discussion, as supplied by the
    /// {{DEFAULTSORT}} sort key of the record's category memberships.
    pub fn title_subject(&self) -> &str {
        &self.title_subject
    }

    /// Theme tags scraped from the subject page, e.g. "software libero".
    pub fn subject_themes(&self) -> &[String] {
        &self.subject_themes
    }

    pub fn add_subject_theme(&mut self, theme: impl Into<String>) {
        self.subject_themes.push(theme.into());
    }

    /// Page length in bytes.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// The best-resolved daily variant this entity currently carries.
    pub fn category(&self) -> DayCategory {
        self.category
    }

    pub fn kind(&self) -> CategoryKind {
        self.category.kind
    }

    /// Calendar day the carried variant belongs to.
    pub fn start_date(&self) -> NaiveDate {
        self.category.date
    }

    pub fn is_protected(&self) -> bool {
        self.is_protected
    }

    /// Whether the procedure is still open. Protection overrides the
    /// running-category membership.
    pub fn is_running(&self) -> bool {
        self.is_running && !self.is_protected
    }

    /// Whether this PDC covers multiple subject pages.
    pub fn is_multiple(&self) -> bool {
        self.title.starts_with(PDC_PREFIX_MULTIPLE)
    }

    fn title_prefix(&self) -> &'static str {
        if self.is_multiple() {
            PDC_PREFIX_MULTIPLE
        } else {
            PDC_PREFIX
        }
    }

    /// Title with the PDC prefix stripped.
    pub fn title_unprefixed(&self) -> &str {
        &self.title[self.title_prefix().len()..]
    }

    pub fn has_creation_date(&self) -> bool {
        self.creation_date.is_some()
    }

    /// Creation date already known to this instance, if any.
    pub fn cached_creation_date(&self) -> Option<DateTime<Utc>> {
        self.creation_date
    }

    pub fn set_creation_date(&mut self, date: DateTime<Utc>) {
        self.creation_date = Some(date);
    }

    pub fn has_lastedit_date(&self) -> bool {
        self.lastedit_date.is_some()
    }

    pub fn set_lastedit_date(&mut self, date: DateTime<Utc>) {
        self.lastedit_date = Some(date);
    }

    /// Creation date, fetched from the page history on first access.
    ///
    /// The cheap category-derived date is adopted at construction only when
    /// it agrees with the category's own calendar day; otherwise the exact
    /// first-revision timestamp is fetched here once and memoized.
    pub async fn creation_date<S>(&mut self, history: &S) -> Result<DateTime<Utc>, FetchError>
    where
        S: PageHistorySource + ?Sized,
    {
        if let Some(date) = self.creation_date {
            return Ok(date);
        }
        let fetched = history.fetch_creation_date(self.id).await?;
        self.creation_date = Some(fetched);
        Ok(fetched)
    }

    /// Last-edit date, fetched from the page history on first access. The
    /// record's `touched` field is not a substitute: purges poison it.
    pub async fn lastedit_date<S>(&mut self, history: &S) -> Result<DateTime<Utc>, FetchError>
    where
        S: PageHistorySource + ?Sized,
    {
        if let Some(date) = self.lastedit_date {
            return Ok(date);
        }
        let fetched = history.fetch_lastedit_date(self.id).await?;
        self.lastedit_date = Some(fetched);
        Ok(fetched)
    }

    /// Merge another sighting of the same page into this one. Only the
    /// category can change, and only toward higher specificity; every other
    /// field was established at construction and does not vary across the
    /// category lists that produced the duplicate sighting.
    pub fn merge(&mut self, other: &Pdc) -> Result<(), MergeError> {
        if self.id != other.id {
            return Err(MergeError::IdMismatch {
                left: self.id,
                right: other.id,
            });
        }
        if let Some(best) = resolve_best(&[self.category, other.category]) {
            self.category = best;
        }
        Ok(())
    }

    /// Discussion temperature in `0..=100`, a linear model over the page
    /// length with per-variant coefficients.
    pub fn temperature(&self) -> u8 {
        let (slope, offset) = self.category.kind.temperature_model();
        let raw = (slope * self.length as f64 + offset).round();
        raw.clamp(0.0, 100.0) as u8
    }

    /// Duration in whole days from creation to last edit.
    ///
    /// A protected PDC was closed by a sysop touch near midnight, so the
    /// creation instant is moved to 23:59:59 of its calendar day before
    /// differencing; the correction can only lengthen the result. A partial
    /// trailing day counts once it passes [`DAY_THRESHOLD`], and the result
    /// never goes below zero even when the adjusted creation ends up past
    /// the last edit.
    pub async fn duration_days<S>(&mut self, history: &S) -> Result<i64, FetchError>
    where
        S: PageHistorySource + ?Sized,
    {
        let creation = self.creation_date(history).await?;
        let lastedit = self.lastedit_date(history).await?;
        Ok(whole_days(creation, lastedit, self.is_protected))
    }

    /// Duration bucket for the report templates.
    pub async fn duration_text<S>(&mut self, history: &S) -> Result<DurationText, FetchError>
    where
        S: PageHistorySource + ?Sized,
    {
        let days = self.duration_days(history).await?;
        Ok(match days {
            0 => DurationText::Hours,
            1 => DurationText::OneDay,
            n => DurationText::Days(n),
        })
    }

    /// Trailing enumeration number of the title, e.g. the `2` in
    /// "Wikipedia:Pagine da cancellare/Foo/2". Most PDCs have none.
    pub fn turnover(&self) -> Option<u32> {
        let pattern = format!("{}/([0-9]+)$", regex::escape(&self.title_subject));
        let re = Regex::new(&pattern).ok()?;
        re.captures(&self.title)?.get(1)?.as_str().parse().ok()
    }

    /// Whether the sort-key subject matches the unprefixed title. A trailing
    /// turnover enumeration on the title is tolerated, once.
    pub fn is_title_subject_consistent(&self) -> bool {
        let subject = self.title_subject.as_str();
        let mut generated = self.title_unprefixed();
        if subject != generated {
            if let Some(m) = ENUMERATION_SUFFIX_RE
                .captures(generated)
                .and_then(|caps| caps.get(1))
            {
                generated = m.as_str();
            }
        }
        subject == generated
    }
}

static ENUMERATION_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)/[0-9]+$").expect("enumeration regex is valid"));

/// Day count between two instants with the protection adjustment and the
/// threshold rounding applied.
fn whole_days(creation: DateTime<Utc>, lastedit: DateTime<Utc>, protected: bool) -> i64 {
    let creation = if protected {
        end_of_day(creation)
    } else {
        creation
    };

    let seconds = (lastedit - creation).num_seconds();
    let days_fraction = seconds as f64 / 86_400.0;
    let mut days = days_fraction.floor() as i64;
    if days_fraction - days as f64 > DAY_THRESHOLD {
        days += 1;
    }
    days.max(0)
}

fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_hms_opt(23, 59, 59)
        .expect("23:59:59 is a valid wall-clock time")
        .and_utc()
}
