use mts_models::ModuleKey;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Default portal root, overridable through configuration.
pub const DEFAULT_BASE_URL: &str = "https://moseskonto.tu-berlin.de/moses/modultransfersystem/";

/// Text input of the catalog's program search form.
pub const PROGRAM_SEARCH_INPUT: &str = "#j_idt99 input[type=text]";

/// A page the harvester asks the driver to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// The degree program catalog, reached through its search form.
    Catalog,
    /// The combined view of a program: study area tree and module listing.
    Program(u64),
    /// A module's description page.
    Module(ModuleKey),
}
impl Navigation {
    /// Absolute URL of the page beneath the given portal root.
    pub fn url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        match self {
            Self::Catalog => format!("{base}/studiengaenge/suchen.html"),
            Self::Program(id) => format!("{base}/studiengaenge/anzeigenKombiniert.html?id={id}"),
            Self::Module(key) => format!(
                "{base}/bolognamodule/beschreibung/anzeigen.html?nummer={}&version={}",
                key.id(),
                key.version()
            ),
        }
    }
}
impl Display for Navigation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Catalog => write!(f, "program catalog"),
            Self::Program(id) => write!(f, "program {id}"),
            Self::Module(key) => write!(f, "module {key}"),
        }
    }
}
