// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Forms, Serve, Version};

use formsink_daemon::Settings;

command_enum! {
    (Serve, Serve),
    (Forms, Forms),
    (Version, Version),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?;
    let ctx = cli::op::OpContext::new(settings);

    let output = args.command.execute(&ctx).await?;
    println!("{}", output);
    Ok(())
}
