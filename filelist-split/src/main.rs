use anyhow::Result;
use clap::Parser;
use filelist_split::cli::{run, Cli};
use filelist_split::logging::setup_logging;

fn main() -> Result<()> {
    // Load environment (RUST_LOG and friends)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.log_directives());
    tracing::info!("CLI arguments parsed, invoking run");

    let result = run(cli);
    match &result {
        Ok(_) => tracing::info!("CLI completed successfully"),
        Err(e) => tracing::error!(error = %e, "CLI exited with error"),
    }
    result
}
