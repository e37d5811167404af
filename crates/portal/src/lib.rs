//! Access to the Modultransfersystem web portal.
//!
//! The portal is a server-rendered application with per-session state, so a
//! [`Portal`] is a *session*: it is exclusively owned by whoever drives the
//! harvest, takes `&mut self` for every navigation, and is torn down when it
//! is dropped.
//!
//! Rendering and parsing are split. A [`Driver`] turns a URL into rendered
//! HTML; [`BrowserPortal`] rate limits navigation, asks the driver for the
//! page and hands the markup to `mts-extract`.
//!
//! The program catalog only lists results after its search form has been
//! submitted. Drivers that can only load URLs report
//! [`ErrorKind::Unsupported`](crate::error::ErrorKind::Unsupported) for it.

mod browser;
mod chrome;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod navigation;
mod throttle;

pub use crate::browser::BrowserPortal;
pub use crate::chrome::ChromeDriver;
#[cfg(feature = "mock")]
pub use crate::mock::MockPortal;
pub use crate::navigation::{DEFAULT_BASE_URL, Navigation, PROGRAM_SEARCH_INPUT};
pub use crate::throttle::Throttle;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use mts_models::{DegreeProgram, ModuleDetail, ModuleKey, ModulePart, StudyAreaForest};

/// One live portal session.
///
/// Every method returns either a complete, well-formed result or an error;
/// callers never see partially parsed pages.
#[async_trait]
pub trait Portal: Send {
    /// Human-readable name of the implementation, for logging.
    fn name(&self) -> &str;

    /// All degree programs listed in the catalog.
    async fn fetch_program_tree(&mut self) -> Result<Vec<DegreeProgram>>;

    /// Degree programs the catalog search returns for the text.
    async fn search_programs(&mut self, text: &str) -> Result<Vec<DegreeProgram>>;

    /// The study area forest of one program, with the module stubs each area lists.
    async fn fetch_study_area_tree(&mut self, program: &DegreeProgram) -> Result<StudyAreaForest>;

    /// The description page of one module version.
    async fn fetch_module_detail(&mut self, key: ModuleKey) -> Result<(ModuleDetail, Vec<ModulePart>)>;
}

/// Turns a URL into rendered HTML.
#[async_trait]
pub trait Driver: Send {
    async fn render(&mut self, url: &str) -> Result<String>;

    /// Load the page, type the text into the input matched by the CSS
    /// selector, submit, and return the HTML of the result.
    async fn search(&mut self, url: &str, input: &str, text: &str) -> Result<String> {
        tracing::debug!(%url, %input, %text, "Driver cannot submit forms");
        exn::bail!(ErrorKind::Unsupported { action: "search form submission", url: url.to_string() })
    }
}
