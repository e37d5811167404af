pub mod harvest;
pub mod programs;
pub mod status;

use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use exn::ResultExt;
use mts_config::Config;
use mts_harvest::Target;
use mts_portal::{BrowserPortal, ChromeDriver};
use mts_store::{Database, Repository};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mts")]
#[command(author, version, about = "Resumable harvester for the TU Berlin Modultransfersystem catalog")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeatable); `RUST_LOG` takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Additional configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file [default: mts.sqlite]
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Minimum seconds between page requests [default: 2]
    #[arg(short, long, global = true)]
    pub rate_limit: Option<f64>,
}
impl Cli {
    /// Load configuration and apply command line overrides on top.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).or_raise(|| ErrorKind::Config)?;
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(rate_limit) = self.rate_limit {
            config.portal.rate_limit = rate_limit;
        }
        config.validate().or_raise(|| ErrorKind::Config)?;
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest a degree program, resuming wherever a previous run stopped
    Harvest(HarvestArgs),

    /// List degree programs in the portal's catalog
    Programs(ProgramsArgs),

    /// Show how much of a program has been harvested
    Status(StatusArgs),
}

#[derive(Args, Clone)]
pub struct HarvestArgs {
    /// Program ID, or text to search program titles for
    pub target: Target,
}

#[derive(Args, Clone)]
pub struct ProgramsArgs {
    /// Only list programs whose title contains this text
    pub search: Option<String>,
}

#[derive(Args, Clone)]
pub struct StatusArgs {
    pub program_id: u64,
}

async fn open_store(config: &Config) -> Result<(Database, Repository)> {
    let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Store)?;
    let repo = Repository::from(&db);
    Ok((db, repo))
}

async fn open_portal(config: &Config) -> Result<BrowserPortal<ChromeDriver>> {
    let portal = &config.portal;
    let timeout = portal.timeout().or_raise(|| ErrorKind::Config)?;
    let rate_limit = portal.rate_limit().or_raise(|| ErrorKind::Config)?;
    let driver = match &portal.chrome {
        Some(path) => ChromeDriver::with_executable(path, timeout),
        None => ChromeDriver::discover(timeout).await,
    }
    .or_raise(|| ErrorKind::Portal)?;
    Ok(BrowserPortal::new(driver, &portal.base_url, rate_limit))
}
