//! Parsing of the Modultransfersystem pages the harvester visits.
//!
//! Each entrypoint takes the rendered HTML of one page and returns the
//! structured catalog data found on it:
//!
//! - [`catalog`]: the degree program search results.
//! - [`study_areas`]: the combined program view, as a [`StudyAreaForest`](mts_models::StudyAreaForest).
//! - [`module_detail`]: a module description with its parts.
//!
//! Extraction is strict about the fields that identify or define an entity
//! and lenient about free text: a page that is missing a core field is an
//! error rather than a partially filled record.

mod areas;
mod catalog;
mod consts;
mod detail;
pub mod error;

pub use crate::areas::study_areas;
pub use crate::catalog::catalog;
pub use crate::detail::module_detail;
use scraper::ElementRef;

/// Text content of an element with whitespace runs collapsed.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
