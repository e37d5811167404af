//! Resumable harvesting of one degree program.
//!
//! A harvest runs through a fixed sequence of phases:
//!
//! 1. **Plan**: [`planner::plan`] checks whether the program is already
//!    stored and picks a [`Mode`].
//! 2. **Full build** (unknown programs only): the study area tree is fetched,
//!    then the program, its areas and every listed module stub are written.
//! 3. **Detail fetch loop**: every module still lacking details is fetched
//!    and written together with its parts, one at a time, in key order.
//!
//! The stream returned by [`harvest`] reports each step as a
//! [`HarvestEvent`]; [`run`] drives it to a [`Report`]. Which program to
//! harvest is decided beforehand by resolving a [`Target`].

mod engine;
pub mod error;
pub mod planner;
mod target;

pub use crate::engine::{HarvestEvent, Report, harvest, run};
pub use crate::planner::{Mode, Plan};
pub use crate::target::{Target, search};
