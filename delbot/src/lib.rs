//! Classification engine for the daily deletion-discussion report of a wiki.
//!
//! The crate ingests raw page records describing "Pagine da cancellare"
//! discussion pages, resolves each record's daily category memberships into a
//! typed variant, merges duplicate sightings of the same page, and derives
//! the temperature and duration metrics that the daily report pages render.
//!
//! Network transport, authentication, and on-wiki writes are not part of this
//! crate: they live behind the collaborator traits in [`wiki`].

pub mod classification;
pub mod config;
pub mod models;
pub mod parsing;
pub mod run;
pub mod wiki;

pub use classification::{classify_day, DayClassification};
pub use config::BotConfig;
pub use models::{CategoryKind, DayCategory, DurationText, Pdc};
pub use wiki::{FetchError, WikiSource};
