use crate::ModuleKey;

/// What a study area listing knows about a module.
///
/// This is enough to record the module in "listing" state; everything else
/// requires a visit to its description page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStub {
    pub key: ModuleKey,
    pub title: String,
    /// ECTS credits.
    pub credits: u32,
    pub exam_type: String,
}

/// Fields only available on a module's description page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDetail {
    pub faculty: String,
    pub department: String,
    /// Learning outcomes; some modules leave this blank.
    pub outcomes: Option<String>,
    pub content: Option<String>,
}

/// A scheduled sub-component of a module (lecture, exercise, seminar, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePart {
    pub title: String,
    pub language: String,
    /// Part type, e.g. `VL` (lecture) or `UE` (exercise).
    pub kind: String,
    /// Term offering pattern, e.g. `WiSe` or `WiSe/SoSe`.
    pub turnus: String,
    /// Weekly contact hours (SWS).
    pub workload: u32,
    /// Course number, if the part has one assigned.
    pub number: Option<String>,
}
