//! Parsers for the raw shapes handed to the classifier.
//!
//! - [`record`]: raw page records from the category-members queries,
//!   their validation, and construction of the domain entity
//! - [`themes`]: theme scraping from the subject page's wikitext

pub mod record;
pub mod themes;
