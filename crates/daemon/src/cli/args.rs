pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "formsink")]
#[command(about = "Turn HTML form submissions into mail delivered to a maildir")]
pub struct Args {
    /// Path to a TOML settings file providing defaults for `serve`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
