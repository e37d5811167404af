use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Composite identity of a module: the portal ID plus the version.
///
/// Two modules sharing an ID but differing in version are distinct entities;
/// they are never merged and never overwrite each other. Keys order by ID
/// first and version second, which is the order work is processed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleKey {
    id: u64,
    version: u32,
}
impl ModuleKey {
    /// Construct a key from its components.
    ///
    /// The portal never issues a zero ID or a zero version, so a zero
    /// component means the caller lost it somewhere upstream.
    pub fn new(id: u64, version: u32) -> Result<Self> {
        if id == 0 {
            exn::bail!(ErrorKind::MissingKeyComponent("id"));
        }
        if version == 0 {
            exn::bail!(ErrorKind::MissingKeyComponent("version"));
        }
        Ok(Self { id, version })
    }

    /// Construct a key from text scraped off a page.
    pub fn parse(id: &str, version: &str) -> Result<Self> {
        let (id, version) = (id.trim(), version.trim());
        if id.is_empty() {
            exn::bail!(ErrorKind::MissingKeyComponent("id"));
        }
        if version.is_empty() {
            exn::bail!(ErrorKind::MissingKeyComponent("version"));
        }
        let id = id.parse::<u64>().or_raise(|| ErrorKind::InvalidKey { field: "id", value: id.to_string() })?;
        let version = version
            .parse::<u32>()
            .or_raise(|| ErrorKind::InvalidKey { field: "version", value: version.to_string() })?;
        Self::new(id, version)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// True iff both the ID and the version are equal.
    pub fn is_same(&self, other: &ModuleKey) -> bool {
        self.id == other.id && self.version == other.version
    }
}
impl Display for ModuleKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{} v{}", self.id, self.version)
    }
}
