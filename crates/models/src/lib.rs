//! Catalog entities of the Modultransfersystem and their identity rules.
//!
//! The catalog is a four level hierarchy: degree programs own a forest of
//! study areas, study areas list modules, and modules own parts. Modules are
//! shared between study areas (and programs), so their identity is the
//! composite [`ModuleKey`] rather than anything positional.

mod area;
pub mod error;
mod key;
mod module;
mod program;

pub use crate::area::{AreaIndex, AreaNode, StudyAreaForest};
pub use crate::key::ModuleKey;
pub use crate::module::{ModuleDetail, ModulePart, ModuleStub};
pub use crate::program::DegreeProgram;
