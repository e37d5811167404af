use crate::error::{ErrorKind, Result};
use crate::planner::{self, Mode};
use async_stream::stream;
use exn::{OptionExt, ResultExt};
use futures::{Stream, StreamExt};
use mts_models::{DegreeProgram, ModuleKey, StudyAreaForest};
use mts_portal::Portal;
use mts_portal::error::Error as PortalError;
use mts_store::Store;
use std::collections::BTreeSet;
use std::pin::pin;

/// Progress events emitted by [`harvest`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`TreeBuilt`](Self::TreeBuilt): once for a full build, never for a resume.
/// 3. [`WorkSet`](Self::WorkSet): exactly once, with the number of modules to detail.
/// 4. [`ModuleDetailed`](Self::ModuleDetailed) or [`ModuleFailed`](Self::ModuleFailed):
///    once per module in the work set, in key order.
/// 5. [`Complete`](Self::Complete): exactly once, signalling the stream is finished.
///
/// A fatal error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum HarvestEvent {
    Started { program: DegreeProgram, mode: Mode },
    /// The study area tree and module listing have been written.
    TreeBuilt { areas: usize, modules: usize },
    WorkSet(usize),
    ModuleDetailed { key: ModuleKey, parts: usize },
    /// The module's details could not be fetched; it stays pending for the next run.
    ModuleFailed { key: ModuleKey, error: PortalError },
    Complete(Report),
}

/// Summary of one harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub program_id: u64,
    pub mode: Mode,
    /// Modules detailed by this run.
    pub detailed: usize,
    /// Modules whose detail fetch failed, in the order they were attempted.
    pub failed: Vec<ModuleKey>,
}
impl Report {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Harvest one degree program into the store, streaming progress events.
///
/// The portal session is borrowed exclusively for the lifetime of the stream
/// and navigated strictly sequentially. Dropping the stream between events
/// is always safe: every store write is individually atomic, and anything
/// not yet detailed is picked up again by the next run.
///
/// Per-module fetch failures are reported as [`HarvestEvent::ModuleFailed`]
/// and do not end the stream. Tree fetch failures and every store failure
/// are fatal.
pub fn harvest<'a>(
    portal: &'a mut dyn Portal,
    store: &'a dyn Store,
    program: &'a DegreeProgram,
) -> impl Stream<Item = Result<HarvestEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let plan = match planner::plan(store, program.id).await {
            Ok(plan) => plan,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        tracing::info!(program = %program, mode = %plan.mode, portal = portal.name(), "Harvest started");
        yield Ok(HarvestEvent::Started { program: program.clone(), mode: plan.mode });

        let work = match plan.mode {
            Mode::Resume => plan.work,
            Mode::FullBuild => {
                let (areas, modules) = match build(portal, store, program).await {
                    Ok(counts) => counts,
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                };
                yield Ok(HarvestEvent::TreeBuilt { areas, modules });
                match planner::work_set(store, program.id).await {
                    Ok(work) => work,
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                }
            },
        };
        tracing::info!(modules = work.len(), "Fetching module details");
        yield Ok(HarvestEvent::WorkSet(work.len()));

        let mut detailed = 0;
        let mut failed = Vec::new();
        for key in work {
            match portal.fetch_module_detail(key).await {
                Ok((detail, parts)) => {
                    if let Err(e) = store.mark_module_detailed(key, &detail, &parts).await {
                        yield Err(ErrorKind::store(e));
                        return;
                    }
                    detailed += 1;
                    yield Ok(HarvestEvent::ModuleDetailed { key, parts: parts.len() });
                },
                Err(error) => {
                    tracing::warn!(module = %key, error = ?error, "Failed to fetch module details; it remains pending");
                    failed.push(key);
                    yield Ok(HarvestEvent::ModuleFailed { key, error });
                },
            }
        }

        let report = Report { program_id: program.id, mode: plan.mode, detailed, failed };
        tracing::info!(detailed = report.detailed, failed = report.failed.len(), "Harvest complete");
        yield Ok(HarvestEvent::Complete(report));
    })
}

/// Drive [`harvest`] to completion, discarding intermediate events.
pub async fn run(portal: &mut dyn Portal, store: &dyn Store, program: &DegreeProgram) -> Result<Report> {
    let mut events = pin!(harvest(portal, store, program));
    while let Some(event) = events.next().await {
        if let HarvestEvent::Complete(report) = event? {
            return Ok(report);
        }
    }
    exn::bail!(ErrorKind::Aborted)
}

/// Fetch the study area tree, then write the program, the tree and every
/// listed module stub.
///
/// Nothing is written unless the tree was fetched and parsed completely.
/// Returns the number of areas and of distinct modules written.
async fn build(portal: &mut dyn Portal, store: &dyn Store, program: &DegreeProgram) -> Result<(usize, usize)> {
    let forest: StudyAreaForest = portal.fetch_study_area_tree(program).await.or_raise(|| ErrorKind::Fetch)?;
    tracing::debug!(areas = forest.len(), stubs = forest.module_count(), "Study area tree fetched");
    store.write_program(program).await.map_err(ErrorKind::store)?;
    let ids = store.write_study_area_tree(program.id, &forest).await.map_err(ErrorKind::store)?;
    let mut modules = BTreeSet::new();
    for (index, node) in forest.walk() {
        let area = *ids.get(index).ok_or_raise(|| ErrorKind::Construction)?;
        for stub in &node.modules {
            store.write_module_stub(area, stub).await.map_err(ErrorKind::store)?;
            modules.insert(stub.key);
        }
    }
    Ok((ids.len(), modules.len()))
}
