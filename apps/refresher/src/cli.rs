use clap::{Parser, Subcommand};

/// Keeps a Naukri profile's resume fresh by re-uploading it on a schedule.
#[derive(Parser, Debug)]
#[command(name = "naukri-refresh", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Serve `/` and `/run-now` and run the daily schedule (default)
    Serve,
    /// Run one update now and exit non-zero if it fails
    RunOnce,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
