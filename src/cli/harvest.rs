use super::{HarvestArgs, open_portal, open_store};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use futures::StreamExt;
use mts_config::Config;
use mts_harvest::error::ErrorKind as HarvestErrorKind;
use mts_harvest::{HarvestEvent, Report};
use mts_store::Store;
use std::pin::pin;
use std::process::ExitCode;

/// Exit code when the run finished but some modules are still pending.
const EXIT_INCOMPLETE: u8 = 2;

pub async fn execute(args: HarvestArgs, config: Config) -> Result<ExitCode> {
    let (db, store) = open_store(&config).await?;
    let mut portal = open_portal(&config).await?;

    let program = match args.target.resolve(&mut portal, &store).await {
        Ok(program) => program,
        Err(err) => {
            if let HarvestErrorKind::AmbiguousTarget { candidates, .. } = &*err {
                eprintln!("Several degree programs match '{}':", args.target);
                for candidate in candidates {
                    eprintln!("  {candidate}");
                }
                eprintln!("Pass a program ID to choose one.");
            }
            return Err(err.raise(ErrorKind::Harvest));
        },
    };

    let mut report: Option<Report> = None;
    {
        let mut events = pin!(mts_harvest::harvest(&mut portal, &store, &program));
        while let Some(event) = events.next().await {
            match event.or_raise(|| ErrorKind::Harvest)? {
                HarvestEvent::Started { program, mode } => println!("{program}: {mode}"),
                HarvestEvent::TreeBuilt { areas, modules } => {
                    println!("Recorded {areas} study areas listing {modules} modules")
                },
                HarvestEvent::WorkSet(0) => println!("All module details already fetched"),
                HarvestEvent::WorkSet(n) => println!("Fetching details for {n} modules"),
                HarvestEvent::ModuleDetailed { key, parts } => println!("  {key}: {parts} parts"),
                HarvestEvent::ModuleFailed { key, .. } => println!("  {key}: failed, will retry on next run"),
                HarvestEvent::Complete(done) => report = Some(done),
            }
        }
    }
    let report = report.ok_or_raise(|| ErrorKind::Harvest)?;

    let progress = store.progress(program.id).await.or_raise(|| ErrorKind::Store)?;
    println!("Detailed {} modules this run; {progress}", report.detailed);
    db.close().await;
    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{} modules could not be fetched; run again to retry them", report.failed.len());
        Ok(ExitCode::from(EXIT_INCOMPLETE))
    }
}
