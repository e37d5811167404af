//! In-memory portal for testing.

use crate::error::{ErrorKind, Result};
use crate::{Navigation, Portal};
use async_trait::async_trait;
use mts_models::{DegreeProgram, ModuleDetail, ModuleKey, ModulePart, StudyAreaForest};
use std::collections::{HashMap, HashSet};

/// In-memory portal serving a fixed catalog.
///
/// Every navigation is logged, including failed ones, so tests can assert
/// exactly which pages a harvest visited.
///
/// # Example
///
/// ```
/// use mts_models::{DegreeProgram, ModuleDetail, ModuleKey, StudyAreaForest};
/// use mts_portal::MockPortal;
///
/// let key = ModuleKey::new(40001, 1).unwrap();
/// let portal = MockPortal::default()
///     .with_program(DegreeProgram::new(1, "Informatik", "B. Sc."), StudyAreaForest::new())
///     .with_detail(key, ModuleDetail::default(), vec![])
///     .failing(key);
/// ```
#[derive(Debug, Default)]
pub struct MockPortal {
    programs: Vec<DegreeProgram>,
    forests: HashMap<u64, StudyAreaForest>,
    details: HashMap<ModuleKey, (ModuleDetail, Vec<ModulePart>)>,
    failing: HashSet<ModuleKey>,
    failing_trees: HashSet<u64>,
    requests: Vec<Navigation>,
    searches: Vec<String>,
}

impl MockPortal {
    /// List a program in the catalog, served with the given study area tree.
    pub fn with_program(mut self, program: DegreeProgram, forest: StudyAreaForest) -> Self {
        self.forests.insert(program.id, forest);
        self.programs.push(program);
        self
    }

    /// Serve a module description page.
    pub fn with_detail(mut self, key: ModuleKey, detail: ModuleDetail, parts: Vec<ModulePart>) -> Self {
        self.details.insert(key, (detail, parts));
        self
    }

    /// Make every fetch of the module's description page fail.
    pub fn failing(mut self, key: ModuleKey) -> Self {
        self.failing.insert(key);
        self
    }

    /// Make every fetch of the program's study area tree fail.
    pub fn failing_tree(mut self, program_id: u64) -> Self {
        self.failing_trees.insert(program_id);
        self
    }

    /// Stop failing a module, as if the portal recovered.
    pub fn recover(&mut self, key: ModuleKey) {
        self.failing.remove(&key);
    }

    /// Every navigation so far, in order.
    pub fn requests(&self) -> &[Navigation] {
        &self.requests
    }

    /// Text of every catalog search so far, in order.
    pub fn searches(&self) -> &[String] {
        &self.searches
    }

    /// Number of description page fetches for one module.
    pub fn detail_requests(&self, key: ModuleKey) -> usize {
        self.requests.iter().filter(|n| **n == Navigation::Module(key)).count()
    }
}

#[async_trait]
impl Portal for MockPortal {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_program_tree(&mut self) -> Result<Vec<DegreeProgram>> {
        self.search_programs("").await
    }

    async fn search_programs(&mut self, text: &str) -> Result<Vec<DegreeProgram>> {
        self.requests.push(Navigation::Catalog);
        self.searches.push(text.to_string());
        let needle = text.trim().to_lowercase();
        Ok(self.programs.iter().filter(|p| p.title.to_lowercase().contains(&needle)).cloned().collect())
    }

    async fn fetch_study_area_tree(&mut self, program: &DegreeProgram) -> Result<StudyAreaForest> {
        let navigation = Navigation::Program(program.id);
        self.requests.push(navigation);
        if self.failing_trees.contains(&program.id) {
            exn::bail!(ErrorKind::Fetch(navigation.to_string()));
        }
        self.forests.get(&program.id).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::Fetch(navigation.to_string())))
    }

    async fn fetch_module_detail(&mut self, key: ModuleKey) -> Result<(ModuleDetail, Vec<ModulePart>)> {
        let navigation = Navigation::Module(key);
        self.requests.push(navigation);
        if self.failing.contains(&key) {
            exn::bail!(ErrorKind::Fetch(navigation.to_string()));
        }
        self.details.get(&key).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::Fetch(navigation.to_string())))
    }
}
