//! SQLite persistence for harvested catalog data.
//!
//! The store is the harvester's only memory between runs. What it contains
//! decides what a harvest skips:
//!
//! - A stored **program** means its study area tree and module listing were
//!   fully written by an earlier run. They are trusted and never refetched.
//! - A stored **module** whose detail flag is still false was listed but
//!   never detailed, and will be fetched again.
//!
//! Module identity is the composite (ID, version) key throughout; rows that
//! differ in either component never overwrite each other.

mod db;
pub mod error;
mod repo;
mod rows;

pub use crate::db::Database;
pub use crate::repo::Repository;
use crate::error::Result;
use async_trait::async_trait;
use mts_models::{DegreeProgram, ModuleDetail, ModuleKey, ModulePart, ModuleStub, StudyAreaForest};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Surrogate ID of a stored study area.
pub type AreaId = i64;

/// How far the harvest of one program has progressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub areas: u64,
    /// Distinct module keys linked to the program.
    pub modules: u64,
    /// Linked modules whose details (and parts) have been written.
    pub detailed: u64,
    pub parts: u64,
}
impl Progress {
    pub fn pending(&self) -> u64 {
        self.modules.saturating_sub(self.detailed)
    }

    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }
}
impl Display for Progress {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} areas, {}/{} modules detailed, {} parts",
            self.areas, self.detailed, self.modules, self.parts
        )
    }
}

/// Table-level read/write operations the harvester needs.
///
/// Writes are individually atomic. Nothing here spans more than one
/// operation, so interrupting a caller between any two calls leaves the
/// store consistent.
#[async_trait]
pub trait Store: Send + Sync {
    async fn program_exists(&self, program_id: u64) -> Result<bool>;

    async fn get_program(&self, program_id: u64) -> Result<Option<DegreeProgram>>;

    /// Record a program. Fails with [`DuplicateKey`](error::ErrorKind::DuplicateKey)
    /// if it is already stored.
    async fn write_program(&self, program: &DegreeProgram) -> Result<()>;

    /// Insert a whole study area forest in one transaction, parents first.
    ///
    /// The returned IDs are indexed like [`StudyAreaForest::nodes`]. Module
    /// stubs listed by the areas are *not* written.
    async fn write_study_area_tree(&self, program_id: u64, forest: &StudyAreaForest) -> Result<Vec<AreaId>>;

    /// Every module key linked to any study area of the program.
    async fn list_known_module_keys(&self, program_id: u64) -> Result<BTreeSet<ModuleKey>>;

    /// Record a module in listing state and link it to an area.
    ///
    /// An existing module (same ID *and* version) is left untouched and only
    /// gains the link; an existing link is a no-op.
    async fn write_module_stub(&self, area: AreaId, stub: &ModuleStub) -> Result<()>;

    /// Store a module's details and all of its parts, and set its detail flag.
    ///
    /// Either everything is written or nothing is. Fails with
    /// [`ModuleNotFound`](error::ErrorKind::ModuleNotFound) unless the module
    /// is stored and not yet detailed.
    async fn mark_module_detailed(&self, key: ModuleKey, detail: &ModuleDetail, parts: &[ModulePart]) -> Result<()>;

    /// Modules linked to the program whose details are still missing, ordered by key.
    async fn list_unfetched_modules(&self, program_id: u64) -> Result<Vec<ModuleKey>>;

    async fn progress(&self, program_id: u64) -> Result<Progress>;
}
