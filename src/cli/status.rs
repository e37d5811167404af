use super::{StatusArgs, open_store};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mts_config::Config;
use mts_store::Store;
use std::process::ExitCode;

pub async fn execute(args: StatusArgs, config: Config) -> Result<ExitCode> {
    let (db, store) = open_store(&config).await?;
    let program = store.get_program(args.program_id).await.or_raise(|| ErrorKind::Store)?;
    let Some(program) = program else {
        db.close().await;
        exn::bail!(ErrorKind::NotHarvested(args.program_id));
    };
    let progress = store.progress(program.id).await.or_raise(|| ErrorKind::Store)?;
    println!("{program}");
    println!("  {progress}");
    if !progress.is_complete() {
        println!("  {} modules pending", progress.pending());
    }
    db.close().await;
    Ok(ExitCode::SUCCESS)
}
