use clap::Parser;
use edp_cli::cli::{build_cli_command, Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

use crate::commands::{parametrize, scalars, schema, tables, ts};

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let (name, result) = match &cli.command {
        Some(Commands::Schema { kind }) => ("schema", schema::print_schema(kind)),
        Some(Commands::Validate { kind, input }) => ("validate", schema::validate(kind, input)),
        Some(Commands::Ts { command }) => ("ts", ts::handle(command)),
        Some(Commands::Scalars { command }) => ("scalars", scalars::handle(command)),
        Some(Commands::Tables {
            input,
            output,
            carrier,
        }) => ("tables", tables::handle(input, output, carrier)),
        Some(Commands::Parametrize { spec, scalars }) => {
            ("parametrize", parametrize::handle(spec, scalars))
        }
        None => {
            if let Err(err) = build_cli_command().print_help() {
                error!("printing help failed: {err}");
                std::process::exit(1);
            }
            println!();
            return;
        }
    };

    if let Err(err) = result {
        error!("{name} failed: {err:?}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
