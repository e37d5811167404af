//! Row types and checked conversions between SQLite integers and domain types.

use crate::Progress;
use crate::error::{Error, ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use mts_models::{DegreeProgram, ModuleKey};

pub(crate) fn to_i64<T: TryInto<i64>>(value: T, field: &'static str) -> Result<i64> {
    value.try_into().ok().ok_or_raise(|| ErrorKind::InvalidData(field))
}

fn from_i64<T: TryFrom<i64>>(value: i64, field: &'static str) -> Result<T> {
    T::try_from(value).ok().ok_or_raise(|| ErrorKind::InvalidData(field))
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProgramRow {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) degree: String,
}
impl TryFrom<ProgramRow> for DegreeProgram {
    type Error = Error;
    fn try_from(row: ProgramRow) -> Result<Self> {
        Ok(DegreeProgram::new(from_i64(row.id, "program id")?, row.title, row.degree))
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct KeyRow {
    pub(crate) module_id: i64,
    pub(crate) module_version: i64,
}
impl TryFrom<KeyRow> for ModuleKey {
    type Error = Error;
    fn try_from(row: KeyRow) -> Result<Self> {
        ModuleKey::new(from_i64(row.module_id, "module id")?, from_i64(row.module_version, "module version")?)
            .or_raise(|| ErrorKind::InvalidData("module key"))
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProgressRow {
    pub(crate) areas: i64,
    pub(crate) modules: i64,
    pub(crate) detailed: i64,
    pub(crate) parts: i64,
}
impl TryFrom<ProgressRow> for Progress {
    type Error = Error;
    fn try_from(row: ProgressRow) -> Result<Self> {
        Ok(Progress {
            areas: from_i64(row.areas, "area count")?,
            modules: from_i64(row.modules, "module count")?,
            detailed: from_i64(row.detailed, "detailed count")?,
            parts: from_i64(row.parts, "part count")?,
        })
    }
}
