//! steb CLI entry point

use std::process::ExitCode;

use clap::Parser;

use steb::cli::Commands;
use steb::commands::{run_config, run_open, run_serve, run_toggle, CommandContext};
use steb::Cli;

fn main() -> ExitCode {
    match run() {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run() -> steb::Result<String> {
    let cli = Cli::parse();
    let ctx = CommandContext::from_cli(cli.config.clone(), cli.verbose)?;

    match &cli.command {
        Commands::Serve(args) => run_serve(args, &ctx),
        Commands::Open(args) => {
            ctx.init_tracing("warn");
            run_open(args, &ctx)
        }
        Commands::Toggle => {
            ctx.init_tracing("warn");
            run_toggle(&ctx)
        }
        Commands::Config(args) => {
            ctx.init_tracing("warn");
            run_config(args, &ctx)
        }
    }
}
