//! The per-day classification pass.

pub mod pipeline;

pub use pipeline::{
    classify_day, filter_by_date, index_by_kind, populate_missing, sort_by_creation,
    DayClassification,
};
