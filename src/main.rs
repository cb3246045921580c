use std::process::ExitCode;

use clap::Parser;
use s2s_skill::cli::{command, init_tracing, Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let saved = match &cli.command {
        Commands::Score(args) => command::score(args, cli.config.as_deref()).await,
        Commands::Seasonal {
            observation,
            output,
        } => command::seasonal(observation, output.as_deref(), cli.config.as_deref()),
    };

    match saved {
        Ok(filename) => {
            println!("File saved to `{}`", filename);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
