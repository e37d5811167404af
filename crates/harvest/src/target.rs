use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mts_models::DegreeProgram;
use mts_portal::Portal;
use mts_store::Store;
use std::convert::Infallible;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use tracing::instrument;

/// The degree program a user asked to harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The portal's program ID.
    Id(u64),
    /// Case-insensitive text matched against program titles.
    Search(String),
}
impl FromStr for Target {
    type Err = Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Search(s.to_string()),
        })
    }
}
impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Search(text) => write!(f, "{text}"),
        }
    }
}
impl Target {
    /// Resolve to a single program.
    ///
    /// A program ID already in the store resolves without touching the
    /// portal. Other IDs are looked up in the full catalog, and search text
    /// is submitted to the catalog's search form.
    #[instrument(skip(portal, store), fields(target = %self))]
    pub async fn resolve(&self, portal: &mut dyn Portal, store: &dyn Store) -> Result<DegreeProgram> {
        if let Self::Id(id) = self
            && let Some(program) = store.get_program(*id).await.map_err(ErrorKind::store)?
        {
            tracing::debug!(%program, "Resolved from store");
            return Ok(program);
        }
        let catalog = match self {
            Self::Id(_) => portal.fetch_program_tree().await,
            Self::Search(text) => portal.search_programs(text).await,
        }
        .or_raise(|| ErrorKind::Fetch)?;
        self.select(catalog)
    }

    /// Pick the matching program out of a catalog listing.
    pub fn select(&self, catalog: Vec<DegreeProgram>) -> Result<DegreeProgram> {
        let mut candidates: Vec<_> = match self {
            Self::Id(id) => catalog.into_iter().filter(|p| p.id == *id).collect(),
            Self::Search(text) => {
                let needle = text.trim().to_lowercase();
                let exact: Vec<_> = catalog.iter().filter(|p| p.title.to_lowercase() == needle).cloned().collect();
                if exact.len() == 1 { exact } else { search(catalog, text) }
            },
        };
        match candidates.len() {
            0 => exn::bail!(ErrorKind::ProgramNotFound(self.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => exn::bail!(ErrorKind::AmbiguousTarget { target: self.to_string(), candidates }),
        }
    }
}

/// Programs whose title contains the text, ignoring case. Empty text matches everything.
pub fn search(catalog: Vec<DegreeProgram>, text: &str) -> Vec<DegreeProgram> {
    let needle = text.trim().to_lowercase();
    catalog.into_iter().filter(|p| p.title.to_lowercase().contains(&needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn catalog() -> Vec<DegreeProgram> {
        vec![
            DegreeProgram::new(8791, "Informatik", "Bachelor of Science"),
            DegreeProgram::new(9932, "Technische Informatik", "Master of Science"),
            DegreeProgram::new(7001, "Wirtschaftsinformatik", "Bachelor of Science"),
            DegreeProgram::new(6120, "Mathematik", "Bachelor of Science"),
        ]
    }

    #[rstest]
    #[case("8791", Target::Id(8791))]
    #[case(" 42 ", Target::Id(42))]
    #[case("Mathematik", Target::Search("Mathematik".to_string()))]
    #[case("8791a", Target::Search("8791a".to_string()))]
    fn test_parse(#[case] input: &str, #[case] expected: Target) {
        assert_eq!(input.parse::<Target>().unwrap(), expected);
    }

    #[rstest]
    #[case(Target::Id(6120), 6120)]
    #[case(Target::Search("mathe".to_string()), 6120)]
    #[case(Target::Search("TECHNISCHE".to_string()), 9932)]
    // An exact title wins over titles merely containing it.
    #[case(Target::Search("informatik".to_string()), 8791)]
    fn test_select(#[case] target: Target, #[case] expected: u64) {
        assert_eq!(target.select(catalog()).unwrap().id, expected);
    }

    #[test]
    fn test_select_not_found() {
        let err = Target::Id(1).select(catalog()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::ProgramNotFound(t) if t == "1"));
    }

    #[test]
    fn test_select_ambiguous() {
        let err = Target::Search("format".to_string()).select(catalog()).unwrap_err();
        match &*err {
            ErrorKind::AmbiguousTarget { candidates, .. } => assert_eq!(candidates.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
