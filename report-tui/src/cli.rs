use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "report-tui")]
#[command(about = "Terminal UI for viewing and editing IMS incident reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open an incident report on the configured IMS server
    Run {
        /// Report number to open. Omit to start a new report.
        #[arg(short, long)]
        number: Option<i64>,
    },
    /// Run against an in-memory server with sample data
    Dev {
        /// Report number to open. Omit to start a new report.
        #[arg(short, long)]
        number: Option<i64>,
    },
    /// Print config path and create default file if missing
    ConfigPath,
}
