//! Degree program catalog.

use crate::error::{ErrorKind, Result};
use crate::{consts, text_of};
use exn::{OptionExt, ResultExt};
use mts_models::DegreeProgram;
use scraper::{ElementRef, Html};
use tracing::instrument;

/// Extracts every degree program listed in the catalog table.
///
/// The first row is a header (`th` cells) and is skipped along with any
/// other row that has no `td` cells. Each data row must carry a link to the
/// program's combined view, which is where the program ID comes from.
#[instrument(skip(html), fields(html_size = html.len(), programs))]
pub fn catalog(html: &str) -> Result<Vec<DegreeProgram>> {
    let document = Html::parse_document(html);
    let table = document
        .select(&consts::CATALOG_TABLE_SELECTOR)
        .next()
        .ok_or_raise(|| ErrorKind::InvalidDocument("program table"))?;
    let mut programs = Vec::new();
    for row in table.select(&consts::ROW_SELECTOR) {
        let cells: Vec<_> = row.select(&consts::CELL_SELECTOR).collect();
        if cells.is_empty() {
            continue;
        }
        programs.push(program(&cells)?);
    }
    tracing::Span::current().record("programs", programs.len());
    Ok(programs)
}

fn program(cells: &[ElementRef<'_>]) -> Result<DegreeProgram> {
    let [name, degree, _, link, ..] = cells else {
        exn::bail!(ErrorKind::ParseError {
            field: "program row",
            value: cells.iter().map(|c| text_of(*c)).collect::<Vec<_>>().join(" | "),
        });
    };
    let href = link
        .select(&consts::ANCHOR_SELECTOR)
        .find_map(|a| a.value().attr("href"))
        .ok_or_raise(|| ErrorKind::MissingField("program link"))?;
    let id = consts::COMBINED_ID_REGEX
        .captures(href)
        .and_then(|c| c.get(1))
        .ok_or_raise(|| ErrorKind::ParseError { field: "program link", value: href.to_string() })?;
    let id = id
        .as_str()
        .parse::<u64>()
        .or_raise(|| ErrorKind::ParseError { field: "program id", value: id.as_str().to_string() })?;
    let title = text_of(*name);
    if title.is_empty() {
        exn::bail!(ErrorKind::MissingField("program title"));
    }
    Ok(DegreeProgram::new(id, title, text_of(*degree)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
        <form id="j_idt99">
          <table class="table">
            <tr><th>Studiengang</th><th>Abschluss</th><th>Stupo</th><th></th></tr>
            <tr>
              <td>Informatik</td>
              <td>Bachelor of Science</td>
              <td>2015</td>
              <td><a href="/moses/modultransfersystem/studiengaenge/anzeigenKombiniert.html?id=8791">Anzeigen</a></td>
            </tr>
            <tr>
              <td>  Technische
                    Informatik </td>
              <td>Master of Science</td>
              <td>2021</td>
              <td><a href="anzeigenKombiniert.html?lang=de&amp;id=9932">Anzeigen</a></td>
            </tr>
          </table>
        </form>
    "#;

    #[test]
    fn test_catalog() {
        let programs = catalog(CATALOG).unwrap();
        assert_eq!(
            programs,
            vec![
                DegreeProgram::new(8791, "Informatik", "Bachelor of Science"),
                DegreeProgram::new(9932, "Technische Informatik", "Master of Science"),
            ]
        );
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        let html = r#"<table class="table"><tr><th>Studiengang</th></tr></table>"#;
        assert!(catalog(html).unwrap().is_empty());
    }

    #[test]
    fn test_missing_table() {
        let err = catalog("<html><body><p>Wartungsarbeiten</p></body></html>").unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidDocument("program table"));
    }

    #[test]
    fn test_row_without_program_link() {
        let html = r#"<table class="table"><tr><td>Informatik</td><td>B. Sc.</td><td></td><td>-</td></tr></table>"#;
        let err = catalog(html).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingField("program link"));
    }
}
