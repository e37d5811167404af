use std::fmt::{Display, Formatter, Result as FmtResult};

/// Top-level catalog entry, e.g. "Informatik (B. Sc.)".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DegreeProgram {
    /// The portal's ID of the combined program view.
    pub id: u64,
    pub title: String,
    /// Degree kind as printed by the portal (e.g. `Bachelor of Science`).
    pub degree: String,
}
impl DegreeProgram {
    pub fn new(id: u64, title: impl Into<String>, degree: impl Into<String>) -> Self {
        Self { id, title: title.into(), degree: degree.into() }
    }
}
impl Display for DegreeProgram {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({}) [{}]", self.title, self.degree, self.id)
    }
}
