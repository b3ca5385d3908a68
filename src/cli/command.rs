use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::{context, seed};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(
        about = "Reset the database and load fixture data",
        long_about = "Drops and recreates the sectors and projects tables, loads both JSON fixture files, and moves the id counters past the loaded rows. Existing data is lost."
    )]
    Seed {
        #[arg(long, default_value = "data/sectorData.json", value_name = "PATH")]
        sectors: PathBuf,
        #[arg(long, default_value = "data/projectData.json", value_name = "PATH")]
        projects: PathBuf,
    },
}

impl Command {
    pub fn run(&self, ctx: &context::Context) -> Result<()> {
        match self {
            Command::Seed { sectors, projects } => {
                let summary = seed::run(&ctx.storage(), sectors, projects)?;
                log::info!(
                    "🌱 Loaded {} sectors and {} projects",
                    summary.sectors,
                    summary.projects
                );
                Ok(())
            }
        }
    }
}
