use super::{ProgramsArgs, open_portal};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mts_config::Config;
use mts_portal::Portal;
use std::process::ExitCode;

pub async fn execute(args: ProgramsArgs, config: Config) -> Result<ExitCode> {
    let mut portal = open_portal(&config).await?;
    let programs = match args.search.as_deref() {
        Some(text) => portal.search_programs(text).await,
        None => portal.fetch_program_tree().await,
    }
    .or_raise(|| ErrorKind::Portal)?;
    for program in &programs {
        println!("{:>6}  {}  ({})", program.id, program.title, program.degree);
    }
    if programs.is_empty() {
        eprintln!("No degree programs found");
    }
    Ok(ExitCode::SUCCESS)
}
