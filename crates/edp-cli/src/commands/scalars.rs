use anyhow::{Context, Result};
use edp_cli::cli::ScalarsCommands;
use edp_core::{aggregate_scalars, filter_records, AggregationMethod};
use edp_io::{load_scalars, save_scalars};
use tracing::info;

use crate::commands::util::parse_list;

pub fn handle(command: &ScalarsCommands) -> Result<()> {
    match command {
        ScalarsCommands::Filter {
            input,
            output,
            column,
            values,
        } => {
            info!("Filtering {} on {}", input.display(), column);
            let scalars = load_scalars(input)
                .with_context(|| format!("loading '{}'", input.display()))?;
            let allowed = parse_list(values);
            let kept = filter_records(&scalars, column, &allowed)?;
            save_scalars(&kept, output)?;
            println!(
                "Kept {} of {} rows in {}",
                kept.len(),
                scalars.len(),
                output.display()
            );
            Ok(())
        }
        ScalarsCommands::Agg {
            input,
            output,
            over,
            agg,
        } => {
            let method: AggregationMethod = agg.parse()?;
            let over = parse_list(over);
            info!("Aggregating {} over {:?} with {}", input.display(), over, method);
            let scalars = load_scalars(input)
                .with_context(|| format!("loading '{}'", input.display()))?;
            let aggregated = aggregate_scalars(&scalars, &over, method)?;
            save_scalars(&aggregated, output)?;
            println!(
                "Aggregated {} rows into {} groups in {}",
                scalars.len(),
                aggregated.len(),
                output.display()
            );
            Ok(())
        }
    }
}
