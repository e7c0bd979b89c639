use anyhow::Result;
use clap::Parser;

use whorf::cli::{Cli, Commands};
use whorf::{commands, observability};

fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();

    match cli.command.unwrap_or_default() {
        Commands::Serve { listen } => commands::serve(listen),
        Commands::Scan { file } => {
            if !commands::scan(&file)? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
