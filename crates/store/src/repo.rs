//! SQLite implementation of [`Store`].

use crate::error::{ErrorKind, Result};
use crate::rows::{KeyRow, ProgramRow, ProgressRow, to_i64};
use crate::{AreaId, Database, Progress, Store};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use mts_models::{DegreeProgram, ModuleDetail, ModuleKey, ModulePart, ModuleStub, StudyAreaForest};
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use time::UtcDateTime;
use tracing::instrument;

/// Repository for all harvested entities.
///
/// Programs, areas, modules and parts are tightly coupled through foreign
/// keys, so one repository covers them all rather than one per table.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn key_params(key: ModuleKey) -> Result<(i64, i64)> {
        Ok((to_i64(key.id(), "module id")?, to_i64(key.version(), "module version")?))
    }
}

#[async_trait]
impl Store for Repository {
    async fn program_exists(&self, program_id: u64) -> Result<bool> {
        let (present,): (bool,) = sqlx::query_as(include_str!("../queries/program_exists.sql"))
            .bind(to_i64(program_id, "program id")?)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(present)
    }

    async fn get_program(&self, program_id: u64) -> Result<Option<DegreeProgram>> {
        let row: Option<ProgramRow> = sqlx::query_as(include_str!("../queries/get_program.sql"))
            .bind(to_i64(program_id, "program id")?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(DegreeProgram::try_from).transpose()
    }

    #[instrument(skip(self), fields(program = program.id))]
    async fn write_program(&self, program: &DegreeProgram) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/insert_program.sql"))
            .bind(to_i64(program.id, "program id")?)
            .bind(&program.title)
            .bind(&program.degree)
            .bind(UtcDateTime::now().unix_timestamp())
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                exn::bail!(ErrorKind::DuplicateKey(format!("program {}", program.id)))
            },
            Err(e) => Err(e).or_raise(|| ErrorKind::Database),
        }
    }

    #[instrument(skip(self, forest), fields(areas = forest.len()))]
    async fn write_study_area_tree(&self, program_id: u64, forest: &StudyAreaForest) -> Result<Vec<AreaId>> {
        let program_id = to_i64(program_id, "program id")?;
        let mut ids: Vec<AreaId> = Vec::with_capacity(forest.len());
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        // Arena order is topological, so a parent's ID is always known by the
        // time its children are inserted.
        for node in forest.nodes() {
            let parent = node
                .parent
                .map(|index| ids.get(index).copied().ok_or_raise(|| ErrorKind::InvalidData("area parent")))
                .transpose()?;
            let id = sqlx::query(include_str!("../queries/insert_study_area.sql"))
                .bind(program_id)
                .bind(parent)
                .bind(&node.title)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?
                .last_insert_rowid();
            ids.push(id);
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(ids)
    }

    async fn list_known_module_keys(&self, program_id: u64) -> Result<BTreeSet<ModuleKey>> {
        let rows: Vec<KeyRow> = sqlx::query_as(include_str!("../queries/list_known_module_keys.sql"))
            .bind(to_i64(program_id, "program id")?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(ModuleKey::try_from).collect()
    }

    #[instrument(level = "trace", skip(self, stub), fields(module = %stub.key))]
    async fn write_module_stub(&self, area: AreaId, stub: &ModuleStub) -> Result<()> {
        let (id, version) = Self::key_params(stub.key)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let inserted = sqlx::query(include_str!("../queries/insert_module_stub.sql"))
            .bind(id)
            .bind(version)
            .bind(&stub.title)
            .bind(to_i64(stub.credits, "ects")?)
            .bind(&stub.exam_type)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .rows_affected();
        if inserted == 0 {
            tracing::trace!("Module already stored; adding link only");
        }
        sqlx::query(include_str!("../queries/insert_module_link.sql"))
            .bind(area)
            .bind(id)
            .bind(version)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    #[instrument(skip(self, detail, parts), fields(module = %key, parts = parts.len()))]
    async fn mark_module_detailed(&self, key: ModuleKey, detail: &ModuleDetail, parts: &[ModulePart]) -> Result<()> {
        let (id, version) = Self::key_params(key)?;
        // Dropping the transaction on any early return rolls everything back.
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let updated = sqlx::query(include_str!("../queries/mark_module_detailed.sql"))
            .bind(&detail.faculty)
            .bind(&detail.department)
            .bind(detail.outcomes.as_deref())
            .bind(detail.content.as_deref())
            .bind(UtcDateTime::now().unix_timestamp())
            .bind(id)
            .bind(version)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .rows_affected();
        if updated == 0 {
            exn::bail!(ErrorKind::ModuleNotFound(key.to_string()));
        }
        for part in parts {
            sqlx::query(include_str!("../queries/insert_module_part.sql"))
                .bind(id)
                .bind(version)
                .bind(&part.title)
                .bind(&part.language)
                .bind(&part.kind)
                .bind(&part.turnus)
                .bind(to_i64(part.workload, "sws")?)
                .bind(part.number.as_deref())
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn list_unfetched_modules(&self, program_id: u64) -> Result<Vec<ModuleKey>> {
        let rows: Vec<KeyRow> = sqlx::query_as(include_str!("../queries/list_unfetched_modules.sql"))
            .bind(to_i64(program_id, "program id")?)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(ModuleKey::try_from).collect()
    }

    async fn progress(&self, program_id: u64) -> Result<Progress> {
        let row: ProgressRow = sqlx::query_as(include_str!("../queries/progress.sql"))
            .bind(to_i64(program_id, "program id")?)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    fn key(id: u64, version: u32) -> ModuleKey {
        ModuleKey::new(id, version).unwrap()
    }

    fn stub(id: u64, version: u32) -> ModuleStub {
        ModuleStub {
            key: key(id, version),
            title: format!("Module {id} v{version}"),
            credits: 6,
            exam_type: "Schriftliche Prüfung".to_string(),
        }
    }

    fn detail() -> ModuleDetail {
        ModuleDetail {
            faculty: "IV".to_string(),
            department: "Softwaretechnik".to_string(),
            outcomes: Some("Students can reason about programs.".to_string()),
            content: None,
        }
    }

    fn part(title: &str) -> ModulePart {
        ModulePart {
            title: title.to_string(),
            language: "Deutsch".to_string(),
            kind: "VL".to_string(),
            turnus: "WiSe".to_string(),
            workload: 2,
            number: Some("0434 L 001".to_string()),
        }
    }

    /// A program with one root area and one child area.
    async fn seeded(repo: &Repository) -> Vec<AreaId> {
        repo.write_program(&DegreeProgram::new(1, "Informatik", "Bachelor of Science")).await.unwrap();
        let mut forest = StudyAreaForest::new();
        let root = forest.push_root("Pflichtbereich");
        forest.push_child(root, "Grundlagen").unwrap();
        repo.write_study_area_tree(1, &forest).await.unwrap()
    }

    async fn count(repo: &Repository, sql: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as(sql).fetch_one(&repo.pool).await.unwrap();
        n
    }

    #[tokio::test]
    async fn test_program_roundtrip_and_duplicate() {
        let repo = repo().await;
        let program = DegreeProgram::new(8791, "Informatik", "Bachelor of Science");
        assert!(!repo.program_exists(8791).await.unwrap());
        assert_eq!(repo.get_program(8791).await.unwrap(), None);
        repo.write_program(&program).await.unwrap();
        assert!(repo.program_exists(8791).await.unwrap());
        assert_eq!(repo.get_program(8791).await.unwrap(), Some(program.clone()));
        let err = repo.write_program(&program).await.unwrap_err();
        assert!(matches!(*err, ErrorKind::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn test_tree_parents_resolve_to_surrogate_ids() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        let (parent,): (Option<i64>,) =
            sqlx::query_as("SELECT parent_id FROM study_areas WHERE id = ?").bind(ids[1]).fetch_one(&repo.pool).await.unwrap();
        assert_eq!(parent, Some(ids[0]));
    }

    #[tokio::test]
    async fn test_tree_requires_program() {
        let repo = repo().await;
        let mut forest = StudyAreaForest::new();
        forest.push_root("Pflichtbereich");
        let err = repo.write_study_area_tree(404, &forest).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Database);
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM study_areas").await, 0);
    }

    #[tokio::test]
    async fn test_stub_insertion_is_idempotent() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        repo.write_module_stub(ids[1], &stub(101, 1)).await.unwrap();
        repo.write_module_stub(ids[1], &stub(101, 1)).await.unwrap();
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM modules").await, 1);
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM module_study_areas").await, 1);
        // Same module listed by a second area only gains a link.
        repo.write_module_stub(ids[0], &stub(101, 1)).await.unwrap();
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM modules").await, 1);
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM module_study_areas").await, 2);
    }

    #[tokio::test]
    async fn test_existing_module_is_not_overwritten() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        repo.write_module_stub(ids[0], &stub(101, 1)).await.unwrap();
        let mut renamed = stub(101, 1);
        renamed.title = "Renamed".to_string();
        repo.write_module_stub(ids[1], &renamed).await.unwrap();
        let (title,): (String,) = sqlx::query_as("SELECT title FROM modules").fetch_one(&repo.pool).await.unwrap();
        assert_eq!(title, "Module 101 v1");
    }

    #[tokio::test]
    async fn test_versions_are_never_merged() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        repo.write_module_stub(ids[0], &stub(101, 1)).await.unwrap();
        repo.write_module_stub(ids[0], &stub(101, 2)).await.unwrap();
        repo.mark_module_detailed(key(101, 2), &detail(), &[part("Vorlesung")]).await.unwrap();
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM modules").await, 2);
        assert_eq!(repo.list_unfetched_modules(1).await.unwrap(), vec![key(101, 1)]);
        assert_eq!(
            count(&repo, "SELECT COUNT(*) FROM module_parts WHERE module_id = 101 AND module_version = 1").await,
            0
        );
    }

    #[tokio::test]
    async fn test_unfetched_modules_are_ordered_by_key() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        for (id, version) in [(40, 1), (12, 2), (12, 1), (7, 3)] {
            repo.write_module_stub(ids[1], &stub(id, version)).await.unwrap();
        }
        repo.write_module_stub(ids[0], &stub(12, 1)).await.unwrap();
        let unfetched = repo.list_unfetched_modules(1).await.unwrap();
        assert_eq!(unfetched, vec![key(7, 3), key(12, 1), key(12, 2), key(40, 1)]);
        let known = repo.list_known_module_keys(1).await.unwrap();
        assert_eq!(known.into_iter().collect::<Vec<_>>(), unfetched);
    }

    #[tokio::test]
    async fn test_keys_are_scoped_to_program() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        repo.write_module_stub(ids[0], &stub(101, 1)).await.unwrap();
        repo.write_program(&DegreeProgram::new(2, "Mathematik", "Bachelor of Science")).await.unwrap();
        let mut forest = StudyAreaForest::new();
        forest.push_root("Pflichtbereich");
        let other = repo.write_study_area_tree(2, &forest).await.unwrap();
        repo.write_module_stub(other[0], &stub(202, 1)).await.unwrap();
        assert_eq!(repo.list_known_module_keys(1).await.unwrap(), BTreeSet::from([key(101, 1)]));
        assert_eq!(repo.list_unfetched_modules(2).await.unwrap(), vec![key(202, 1)]);
    }

    #[tokio::test]
    async fn test_mark_detailed_writes_parts_and_flag() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        repo.write_module_stub(ids[0], &stub(101, 1)).await.unwrap();
        repo.mark_module_detailed(key(101, 1), &detail(), &[part("Vorlesung"), part("Übung")]).await.unwrap();
        assert!(repo.list_unfetched_modules(1).await.unwrap().is_empty());
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM module_parts").await, 2);
        let (faculty, content): (String, Option<String>) =
            sqlx::query_as("SELECT faculty, content FROM modules").fetch_one(&repo.pool).await.unwrap();
        assert_eq!(faculty, "IV");
        assert_eq!(content, None);
    }

    #[tokio::test]
    async fn test_mark_detailed_with_zero_parts() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        repo.write_module_stub(ids[0], &stub(101, 1)).await.unwrap();
        repo.mark_module_detailed(key(101, 1), &detail(), &[]).await.unwrap();
        assert!(repo.list_unfetched_modules(1).await.unwrap().is_empty());
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM module_parts").await, 0);
    }

    #[tokio::test]
    async fn test_mark_detailed_twice_is_rejected() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        repo.write_module_stub(ids[0], &stub(101, 1)).await.unwrap();
        repo.mark_module_detailed(key(101, 1), &detail(), &[part("Vorlesung")]).await.unwrap();
        let err = repo.mark_module_detailed(key(101, 1), &detail(), &[part("Vorlesung")]).await.unwrap_err();
        assert!(matches!(*err, ErrorKind::ModuleNotFound(_)));
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM module_parts").await, 1);
    }

    #[tokio::test]
    async fn test_mark_unknown_module_is_rejected() {
        let repo = repo().await;
        let err = repo.mark_module_detailed(key(999, 1), &detail(), &[]).await.unwrap_err();
        assert!(matches!(*err, ErrorKind::ModuleNotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_detailed_is_atomic() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        repo.write_module_stub(ids[0], &stub(101, 1)).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER fail_part BEFORE INSERT ON module_parts WHEN NEW.title = 'boom' \
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END",
        )
        .execute(&repo.pool)
        .await
        .unwrap();
        let parts = [part("Vorlesung"), part("boom"), part("Übung")];
        let err = repo.mark_module_detailed(key(101, 1), &detail(), &parts).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Database);
        assert_eq!(repo.list_unfetched_modules(1).await.unwrap(), vec![key(101, 1)]);
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM module_parts").await, 0);
        assert_eq!(count(&repo, "SELECT COUNT(*) FROM modules WHERE faculty IS NOT NULL").await, 0);
    }

    #[tokio::test]
    async fn test_progress() {
        let repo = repo().await;
        let ids = seeded(&repo).await;
        repo.write_module_stub(ids[0], &stub(101, 1)).await.unwrap();
        repo.write_module_stub(ids[1], &stub(101, 1)).await.unwrap();
        repo.write_module_stub(ids[1], &stub(102, 1)).await.unwrap();
        repo.mark_module_detailed(key(101, 1), &detail(), &[part("Vorlesung"), part("Übung")]).await.unwrap();
        let progress = repo.progress(1).await.unwrap();
        assert_eq!(progress, Progress { areas: 2, modules: 2, detailed: 1, parts: 2 });
        assert_eq!(progress.pending(), 1);
        assert!(!progress.is_complete());
        assert_eq!(repo.progress(404).await.unwrap(), Progress::default());
    }
}
