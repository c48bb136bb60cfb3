//! Daily deletion-discussion category variants.
//!
//! Every calendar day has one generic "Cancellazioni" category plus a fixed
//! set of specialized ones, one per procedure stage. This module is the
//! registry for that closed set: title formatting and recognition, the
//! specificity ranking used to resolve merges, and the per-variant
//! temperature model.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Italian month names, indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

/// Error raised while recognizing a daily category title.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// The title follows the daily-category naming convention but its date
    /// part cannot be parsed. Callers skip the membership and continue.
    #[error("unrecognized date in daily category title: {0}")]
    UnknownCategory(String),
}

/// The closed set of per-day classifications a PDC can carry.
///
/// The `Ord` impl follows declaration order and matches the specificity
/// ranking: the generic day variant is the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryKind {
    /// Generic daily category every PDC of the day belongs to.
    Day,
    /// Consensual procedure ("cancellazioni consensuali").
    Consensual,
    /// Prolonged consensual procedure ("cancellazioni prolungate").
    Prolonged,
    /// Ordinary procedure ("cancellazioni ordinarie").
    Ordinary,
    /// Procedure that reached the voting stage ("cancellazioni con votazione").
    Voting,
}

impl CategoryKind {
    /// Registry order used when enumerating the categories of a date.
    pub fn all() -> [CategoryKind; 5] {
        [
            Self::Day,
            Self::Consensual,
            Self::Prolonged,
            Self::Ordinary,
            Self::Voting,
        ]
    }

    /// Rank used to pick the best variant when merging duplicate sightings.
    /// Higher is more specific; the generic day variant is the minimum.
    pub fn specificity(self) -> u8 {
        match self {
            Self::Day => 0,
            Self::Consensual => 1,
            Self::Prolonged => 2,
            Self::Ordinary => 3,
            Self::Voting => 4,
        }
    }

    /// Human-readable procedure name, e.g. "votazione".
    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "semplificata",
            Self::Consensual => "consensuale",
            Self::Prolonged => "prolungata",
            Self::Ordinary => "ordinaria",
            Self::Voting => "votazione",
        }
    }

    /// Title fragment between "Cancellazioni" and "del". Empty for the
    /// generic day variant.
    fn title_fragment(self) -> &'static str {
        match self {
            Self::Day => "",
            Self::Consensual => " consensuali",
            Self::Prolonged => " prolungate",
            Self::Ordinary => " ordinarie",
            Self::Voting => " con votazione",
        }
    }

    fn from_fragment(fragment: &str) -> Option<CategoryKind> {
        match fragment {
            "consensuali" => Some(Self::Consensual),
            "prolungate" => Some(Self::Prolonged),
            "ordinarie" => Some(Self::Ordinary),
            "con votazione" => Some(Self::Voting),
            _ => None,
        }
    }

    /// Linear temperature model for this variant: `(slope, offset)` over the
    /// PDC length in bytes.
    pub(crate) fn temperature_model(self) -> (f64, f64) {
        match self {
            Self::Day => (0.0365, -24.0),
            Self::Consensual => (0.0075, -12.81),
            Self::Prolonged => (0.0035, -9.76),
            Self::Ordinary | Self::Voting => (0.0025, -16.43),
        }
    }

    /// Full title of the daily category of this variant on `date`,
    /// e.g. "Categoria:Cancellazioni con votazione del 4 maggio 2018".
    pub fn daily_title(self, date: NaiveDate) -> String {
        format!(
            "Categoria:Cancellazioni{} del {} {} {}",
            self.title_fragment(),
            date.day(),
            month_name(date.month()),
            date.year(),
        )
    }
}

/// One daily category membership resolved to its typed variant.
///
/// A value object: exactly one instance is meaningful per `(kind, date)`
/// pair. `observed` carries the instant the membership was attached to the
/// page, when the fetch layer reported one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCategory {
    pub kind: CategoryKind,
    /// The calendar date this category represents.
    pub date: NaiveDate,
    /// When this category was attached to the page. Distinct from `date`,
    /// and untrusted whenever the two disagree at day precision.
    pub observed: Option<DateTime<Utc>>,
}

/// Daily-family title shape. The date part is validated separately so that a
/// title inside the family with a garbled date can be reported as such.
static DAILY_FAMILY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Categoria:Cancellazioni(?: (?P<kind>consensuali|prolungate|ordinarie|con votazione))? del (?P<date>.+)$",
    )
    .expect("daily category regex is valid")
});

impl DayCategory {
    pub fn new(kind: CategoryKind, date: NaiveDate) -> Self {
        Self {
            kind,
            date,
            observed: None,
        }
    }

    /// Same variant with the membership timestamp attached.
    pub fn with_observed(self, observed: DateTime<Utc>) -> Self {
        Self {
            observed: Some(observed),
            ..self
        }
    }

    /// Recognize a category title as one of the known daily variants.
    ///
    /// Returns `Ok(None)` for titles outside the daily family (other
    /// categories a PDC can legitimately sit in), and
    /// [`CategoryError::UnknownCategory`] when the family convention matches
    /// but the date cannot be parsed. The latter is non-fatal for callers:
    /// the membership is skipped.
    pub fn parse_title(title: &str) -> Result<Option<DayCategory>, CategoryError> {
        let caps = match DAILY_FAMILY_RE.captures(title) {
            Some(caps) => caps,
            None => return Ok(None),
        };

        let kind = match caps.name("kind") {
            None => CategoryKind::Day,
            Some(m) => CategoryKind::from_fragment(m.as_str())
                .ok_or_else(|| CategoryError::UnknownCategory(title.to_string()))?,
        };

        let date = parse_italian_date(&caps["date"])
            .ok_or_else(|| CategoryError::UnknownCategory(title.to_string()))?;

        Ok(Some(DayCategory::new(kind, date)))
    }

    /// Title of the daily category this variant instance represents.
    pub fn title(&self) -> String {
        self.kind.daily_title(self.date)
    }
}

/// Pick the most specific variant. Ties keep the first encountered, so the
/// result is deterministic in input order.
pub fn resolve_best(categories: &[DayCategory]) -> Option<DayCategory> {
    let mut best: Option<DayCategory> = None;
    for category in categories {
        match best {
            Some(current) if category.kind.specificity() <= current.kind.specificity() => {}
            _ => best = Some(*category),
        }
    }
    best
}

/// Title of the yearly container category, e.g. "Categoria:Cancellazioni - 2018".
pub fn yearly_category_title(year: i32) -> String {
    format!("Categoria:Cancellazioni - {}", year)
}

/// Title of the monthly container category, e.g.
/// "Categoria:Cancellazioni - maggio 2018".
pub fn monthly_category_title(year: i32, month: u32) -> String {
    format!("Categoria:Cancellazioni - {} {}", month_name(month), year)
}

/// Italian name of a 1-based month.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[month as usize - 1]
}

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|&m| m == name)
        .map(|idx| idx as u32 + 1)
}

/// Parse a "4 maggio 2018" date. Rejects extra tokens and calendar-invalid
/// combinations.
fn parse_italian_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split_whitespace();
    let day: u32 = parts.next()?.parse().ok()?;
    let month = month_number(parts.next()?)?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
