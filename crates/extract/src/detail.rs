//! Module description page.

use crate::error::{ErrorKind, Result};
use crate::{consts, text_of};
use exn::{OptionExt, ResultExt};
use mts_models::{ModuleDetail, ModulePart};
use scraper::{ElementRef, Html};
use tracing::instrument;

const FACULTY: &[&str] = &["Fakultät", "Faculty"];
const DEPARTMENT: &[&str] = &["Fachgebiet", "Department"];
const OUTCOMES: &[&str] = &["Lernergebnisse", "Learning Outcomes"];
const CONTENT: &[&str] = &["Lehrinhalte", "Content"];

/// Extracts the detail fields and all parts of a module.
///
/// A module without parts is valid and yields an empty list. A page on which
/// the faculty or department cannot be found, or on which any part row
/// cannot be parsed, is an error: returning a partial result would let the
/// module be recorded as fully fetched with data missing.
#[instrument(skip(html), fields(html_size = html.len(), parts))]
pub fn module_detail(html: &str) -> Result<(ModuleDetail, Vec<ModulePart>)> {
    let document = Html::parse_document(html);
    let facts = document
        .select(&consts::FACTS_SELECTOR)
        .next()
        .ok_or_raise(|| ErrorKind::InvalidDocument("module facts"))?;
    let detail = ModuleDetail {
        faculty: required(facts, FACULTY, "faculty")?,
        department: required(facts, DEPARTMENT, "department")?,
        outcomes: optional(facts, OUTCOMES),
        content: optional(facts, CONTENT),
    };
    let parts = match document.select(&consts::PARTS_TABLE_SELECTOR).next() {
        Some(table) => table.select(&consts::PARTS_ROW_SELECTOR).map(part).collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    tracing::Span::current().record("parts", parts.len() as u64);
    Ok((detail, parts))
}

/// Finds the `dd` directly following a `dt` with one of the given labels.
///
/// Only the list's own entries are considered, so a `dl` nested inside a
/// `dd` or a `dt` without a value cannot shift one label onto another's value.
fn find_dd_by_label<'a>(facts: ElementRef<'a>, labels: &[&str]) -> Option<ElementRef<'a>> {
    facts
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|dt| dt.value().name() == "dt")
        .find(|dt| {
            let text = text_of(*dt);
            let text = text.trim_end_matches(':');
            labels.iter().any(|label| text.eq_ignore_ascii_case(label))
        })
        .and_then(|dt| dt.next_siblings().find_map(ElementRef::wrap))
        .filter(|dd| dd.value().name() == "dd")
}

fn optional(facts: ElementRef<'_>, labels: &[&str]) -> Option<String> {
    find_dd_by_label(facts, labels).map(text_of).filter(|s| !s.is_empty())
}

fn required(facts: ElementRef<'_>, labels: &[&str], field: &'static str) -> Result<String> {
    optional(facts, labels).ok_or_raise(|| ErrorKind::MissingField(field))
}

/// Columns: title, type, number, turnus, language, SWS.
fn part(row: ElementRef<'_>) -> Result<ModulePart> {
    let cells: Vec<_> = row.select(&consts::CELL_SELECTOR).map(text_of).collect();
    let [title, kind, number, turnus, language, workload, ..] = cells.as_slice() else {
        exn::bail!(ErrorKind::ParseError { field: "module part", value: cells.join(" | ") });
    };
    if title.is_empty() {
        exn::bail!(ErrorKind::MissingField("part title"));
    }
    let workload = workload
        .parse::<u32>()
        .or_raise(|| ErrorKind::ParseError { field: "part workload", value: workload.clone() })?;
    Ok(ModulePart {
        title: title.clone(),
        language: language.clone(),
        kind: kind.clone(),
        turnus: turnus.clone(),
        workload,
        number: Some(number.clone()).filter(|n| !n.is_empty() && n != "-"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PARTS: &str = r#"
        <table class="module-parts">
          <thead><tr><th>Titel</th><th>Art</th><th>Nummer</th><th>Turnus</th><th>Sprache</th><th>SWS</th></tr></thead>
          <tbody>
            <tr><td>Analysis I</td><td>VL</td><td>3236 L 001</td><td>WiSe/SoSe</td><td>Deutsch</td><td>4</td></tr>
            <tr><td>Analysis I</td><td>TUT</td><td>-</td><td>WiSe/SoSe</td><td>Deutsch</td><td>2</td></tr>
          </tbody>
        </table>
    "#;

    fn page(facts: &str, parts: &str) -> String {
        format!(r#"<html><body><h1>Analysis I</h1><dl class="module-facts">{facts}</dl>{parts}</body></html>"#)
    }

    const FACTS: &str = r#"
        <dt>Fakultät:</dt><dd>Fakultät II</dd>
        <dt>Fachgebiet:</dt><dd>Institut für Mathematik</dd>
        <dt>Lernergebnisse:</dt><dd>Die Studierenden beherrschen
            die Grundlagen der Analysis.</dd>
        <dt>Lehrinhalte:</dt><dd></dd>
    "#;

    #[test]
    fn test_detail_with_parts() {
        let (detail, parts) = module_detail(&page(FACTS, PARTS)).unwrap();
        assert_eq!(detail.faculty, "Fakultät II");
        assert_eq!(detail.department, "Institut für Mathematik");
        assert_eq!(detail.outcomes.as_deref(), Some("Die Studierenden beherrschen die Grundlagen der Analysis."));
        assert_eq!(detail.content, None);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].number.as_deref(), Some("3236 L 001"));
        assert_eq!(parts[0].workload, 4);
        assert_eq!(parts[1].kind, "TUT");
        assert_eq!(parts[1].number, None);
    }

    #[test]
    fn test_zero_parts_is_valid() {
        let empty = r#"<table class="module-parts"><tbody></tbody></table>"#;
        let (_, parts) = module_detail(&page(FACTS, empty)).unwrap();
        assert!(parts.is_empty());
        let (_, parts) = module_detail(&page(FACTS, "")).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_english_labels() {
        let facts = "<dt>Faculty</dt><dd>Faculty IV</dd><dt>Department</dt><dd>Security in Telecommunications</dd>";
        let (detail, _) = module_detail(&page(facts, "")).unwrap();
        assert_eq!(detail.faculty, "Faculty IV");
        assert_eq!(detail.department, "Security in Telecommunications");
    }

    #[test]
    fn test_label_without_value_does_not_shift_pairs() {
        let facts = r#"
            <dt>Fakultät:</dt><dd>Fakultät II</dd>
            <dt>Kontakt:</dt>
            <dt>Fachgebiet:</dt><dd>Institut für Mathematik</dd>
            <dt>Lehrinhalte:</dt><dd>Folgen und Reihen</dd>
        "#;
        let (detail, _) = module_detail(&page(facts, "")).unwrap();
        assert_eq!(detail.department, "Institut für Mathematik");
        assert_eq!(detail.content.as_deref(), Some("Folgen und Reihen"));
    }

    #[test]
    fn test_nested_list_is_ignored() {
        let facts = r#"
            <dt>Lernergebnisse:</dt><dd><dl><dt>Fakultät:</dt><dd>Verschachtelt</dd></dl></dd>
            <dt>Fakultät:</dt><dd>Fakultät II</dd>
            <dt>Fachgebiet:</dt><dd>Institut für Mathematik</dd>
        "#;
        let (detail, _) = module_detail(&page(facts, "")).unwrap();
        assert_eq!(detail.faculty, "Fakultät II");
        assert_eq!(detail.department, "Institut für Mathematik");
    }

    #[rstest]
    #[case("<dt>Fachgebiet:</dt><dd>Mathematik</dd>", ErrorKind::MissingField("faculty"))]
    #[case("<dt>Fakultät:</dt><dt>Fachgebiet:</dt><dd>Mathematik</dd>", ErrorKind::MissingField("faculty"))]
    #[case("<dt>Fakultät:</dt><dd>II</dd><dt>Fachgebiet:</dt><dd> </dd>", ErrorKind::MissingField("department"))]
    fn test_missing_core_field(#[case] facts: &str, #[case] expected: ErrorKind) {
        let err = module_detail(&page(facts, PARTS)).unwrap_err();
        assert_eq!(*err, expected);
    }

    #[test]
    fn test_not_a_module_page() {
        let err = module_detail("<html><body>Sitzung abgelaufen</body></html>").unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidDocument("module facts"));
    }

    #[test]
    fn test_unparseable_part_fails_whole_page() {
        let parts = r#"<table class="module-parts"><tbody>
            <tr><td>Analysis I</td><td>VL</td><td></td><td>WiSe</td><td>Deutsch</td><td>4</td></tr>
            <tr><td>Analysis I</td><td>UE</td><td></td><td>WiSe</td><td>Deutsch</td><td>zwei</td></tr>
        </tbody></table>"#;
        let err = module_detail(&page(FACTS, parts)).unwrap_err();
        assert!(matches!(*err, ErrorKind::ParseError { field: "part workload", .. }));
    }
}
