use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "edp", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the columns of a record kind
    Schema {
        /// Record kind (scalars or timeseries)
        kind: String,
    },
    /// Load a file and check it against its record kind
    Validate {
        /// Record kind (scalars or timeseries)
        kind: String,
        /// File to check
        input: PathBuf,
    },
    /// Time-series utilities
    Ts {
        #[command(subcommand)]
        command: TsCommands,
    },
    /// Scalar table utilities
    Scalars {
        #[command(subcommand)]
        command: ScalarsCommands,
    },
    /// Write production and sink tables from result scalars
    Tables {
        /// Directory holding the result scalars.csv
        input: PathBuf,
        /// Directory receiving the tables
        output: PathBuf,
        /// Carrier whose flows define production
        #[arg(long, default_value = "electricity")]
        carrier: String,
    },
    /// Fill empty scalar values from a scenario's update file
    Parametrize {
        /// Scenario spec (YAML or JSON)
        spec: PathBuf,
        /// Scalars file updated in place
        scalars: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum TsCommands {
    /// Convert a column-wise file into stacked rows
    Stack {
        /// Unstacked input file
        input: PathBuf,
        /// Stacked output file
        output: PathBuf,
        /// Region written to every stacked row
        #[arg(long, default_value = "")]
        region: String,
    },
    /// Convert stacked rows into a column-wise file
    Unstack {
        /// Stacked (or unstacked) input file
        input: PathBuf,
        /// Unstacked output file
        output: PathBuf,
    },
    /// Check that all series share one time index
    Check {
        /// Time-series files to compare
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScalarsCommands {
    /// Keep rows whose column value is in a list
    Filter {
        input: PathBuf,
        output: PathBuf,
        /// Column to filter on
        #[arg(long)]
        column: String,
        /// Allowed values (comma separated)
        #[arg(long)]
        values: String,
    },
    /// Aggregate var_value over the dimensions not kept
    Agg {
        input: PathBuf,
        output: PathBuf,
        /// Dimensions to collapse (comma separated)
        #[arg(long)]
        over: String,
        /// Aggregation function (sum, mean, min, max, count)
        #[arg(long, default_value = "sum")]
        agg: String,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn parses_nested_ts_command() {
        let cli = Cli::try_parse_from(["edp", "ts", "stack", "in.csv", "out.csv", "--region", "BE"])
            .unwrap();
        match cli.command {
            Some(Commands::Ts {
                command: TsCommands::Stack { region, .. },
            }) => assert_eq!(region, "BE"),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.log_level, tracing::Level::INFO);
    }

    #[test]
    fn check_needs_at_least_one_file() {
        assert!(Cli::try_parse_from(["edp", "ts", "check"]).is_err());
    }
}
