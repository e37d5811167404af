//! Study area treegrid of the combined program view.
//!
//! The portal renders the area hierarchy as a flat list of table rows where
//! the nesting depth is only visible through the number of indent spans in
//! the first cell:
//!
//! ```text
//! Pflichtbereich                      depth 0, area
//!   Grundlagen                        depth 1, area
//!     Analysis I (#40001 v3)  9  ...  depth 2, module listed by "Grundlagen"
//! Wahlpflichtbereich                  depth 0, area
//! ```
//!
//! Rows carrying a module description link are module stubs; every other row
//! is an area.
//!
//! Children of an area are only loaded into the page once its row has been
//! expanded. A collapsed row (`aria-expanded="false"`) whose toggler is
//! visible still has an unloaded subtree, and the page is rejected rather
//! than mistaken for an area without modules.

use crate::error::{ErrorKind, Result};
use crate::{consts, text_of};
use exn::{OptionExt, ResultExt};
use mts_models::{AreaIndex, ModuleKey, ModuleStub, StudyAreaForest};
use scraper::{ElementRef, Html};
use tracing::instrument;

/// Extracts the study area forest, with module stubs attached to the area
/// that lists them.
///
/// # Errors
///
/// Returns an error if:
/// - The page has no treegrid at all
/// - A row is nested deeper than its predecessor allows
/// - A module row is not nested beneath an area
/// - An area with children is collapsed
/// - A module row's key, credits, or exam type cannot be parsed
#[instrument(skip(html), fields(html_size = html.len(), areas, modules))]
pub fn study_areas(html: &str) -> Result<StudyAreaForest> {
    let document = Html::parse_document(html);
    if document.select(&consts::TREEGRID_SELECTOR).next().is_none() {
        exn::bail!(ErrorKind::InvalidDocument("study area treegrid"));
    }
    let mut forest = StudyAreaForest::new();
    // Index of the most recent area at each depth.
    let mut open: Vec<AreaIndex> = Vec::new();
    for (row_number, row) in document.select(&consts::TREEGRID_ROW_SELECTOR).enumerate() {
        let cells: Vec<_> = row.select(&consts::CELL_SELECTOR).collect();
        let Some(first) = cells.first() else {
            continue;
        };
        let depth = first.select(&consts::INDENT_SELECTOR).count();
        if let Some(link) = row.select(&consts::MODULE_LINK_SELECTOR).next() {
            if depth == 0 || depth > open.len() {
                exn::bail!(ErrorKind::MalformedTree(row_number));
            }
            let stub = module_stub(link, &cells)?;
            forest.push_module(open[depth - 1], stub).or_raise(|| ErrorKind::MalformedTree(row_number))?;
            continue;
        }
        if depth > open.len() {
            exn::bail!(ErrorKind::MalformedTree(row_number));
        }
        if is_collapsed(row) {
            exn::bail!(ErrorKind::CollapsedArea(row_number));
        }
        open.truncate(depth);
        let title = text_of(*first);
        let index = match open.last() {
            Some(&parent) => forest.push_child(parent, title).or_raise(|| ErrorKind::MalformedTree(row_number))?,
            None => forest.push_root(title),
        };
        open.push(index);
    }
    if forest.is_empty() {
        tracing::warn!("No study areas found in treegrid");
    }
    let span = tracing::Span::current();
    span.record("areas", forest.len() as u64);
    span.record("modules", forest.module_count() as u64);
    Ok(forest)
}

/// Leaf areas carry a toggler too, hidden with an inline style.
fn is_collapsed(row: ElementRef<'_>) -> bool {
    if row.value().attr("aria-expanded") != Some("false") {
        return false;
    }
    row.select(&consts::TOGGLER_SELECTOR).next().is_some_and(|toggler| {
        let style: String = toggler.value().attr("style").unwrap_or_default().split_whitespace().collect();
        !style.contains("visibility:hidden")
    })
}

fn module_stub(link: ElementRef<'_>, cells: &[ElementRef<'_>]) -> Result<ModuleStub> {
    let href = link.value().attr("href").unwrap_or_default();
    let captures = consts::MODULE_HREF_REGEX
        .captures(href)
        .ok_or_raise(|| ErrorKind::ParseError { field: "module link", value: href.to_string() })?;
    let (id, version) = (&captures[1], &captures[2]);
    let key = ModuleKey::parse(id, version)
        .or_raise(|| ErrorKind::ParseError { field: "module key", value: href.to_string() })?;
    let title = text_of(link);
    if title.is_empty() {
        exn::bail!(ErrorKind::MissingField("module title"));
    }
    let credits = cells.get(1).map(|c| text_of(*c)).ok_or_raise(|| ErrorKind::MissingField("credits"))?;
    let credits = consts::CREDITS_REGEX
        .captures(&credits)
        .and_then(|c| c[1].parse::<u32>().ok())
        .ok_or_raise(|| ErrorKind::ParseError { field: "credits", value: credits.clone() })?;
    let exam_type = cells
        .get(2)
        .map(|c| text_of(*c))
        .filter(|s| !s.is_empty())
        .ok_or_raise(|| ErrorKind::MissingField("exam type"))?;
    Ok(ModuleStub { key, title, credits, exam_type })
}
