//! Deciding what a harvest still has to do.
//!
//! The planner only reads from the store. Its single decision is binary:
//! either the program is unknown and its whole subtree must be built, or the
//! program is known and only the modules still lacking details are fetched.
//!
//! A stored program is trusted completely. If a previous run wrote the
//! program row but died before every study area and stub was written, a
//! resume will not notice the missing listing entries. Repairing that
//! requires deleting the program from the store.

use crate::error::{ErrorKind, Result};
use mts_models::ModuleKey;
use mts_store::Store;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::instrument;

/// How a harvest enters its program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The program is absent from the store; fetch and write its study area
    /// tree and module listing before fetching details.
    FullBuild,
    /// The program is present; its listing is trusted and only details are fetched.
    Resume,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::FullBuild => write!(f, "full build"),
            Self::Resume => write!(f, "resume"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub mode: Mode,
    /// Module keys already linked to the program.
    pub known: BTreeSet<ModuleKey>,
    /// Modules awaiting details, in processing order. Always empty for a
    /// full build until the listing has been written; see [`work_set`].
    pub work: Vec<ModuleKey>,
}

#[instrument(skip(store))]
pub async fn plan(store: &dyn Store, program_id: u64) -> Result<Plan> {
    if !store.program_exists(program_id).await.map_err(ErrorKind::store)? {
        tracing::debug!("Program not stored");
        return Ok(Plan { mode: Mode::FullBuild, known: BTreeSet::new(), work: Vec::new() });
    }
    let known = store.list_known_module_keys(program_id).await.map_err(ErrorKind::store)?;
    let work = work_set(store, program_id).await?;
    tracing::debug!(known = known.len(), work = work.len(), "Program stored");
    Ok(Plan { mode: Mode::Resume, known, work })
}

/// Modules of the program still lacking details, ordered by ID then version.
pub async fn work_set(store: &dyn Store, program_id: u64) -> Result<Vec<ModuleKey>> {
    store.list_unfetched_modules(program_id).await.map_err(ErrorKind::store)
}
