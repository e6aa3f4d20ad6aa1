use anyhow::{Context, Result};
use edp_cli::cli::TsCommands;
use edp_io::{load_timeseries, load_unstacked, save_timeseries, save_unstacked};
use edp_ts::{check_consistency_timeindex, stack_records, unstack_records};
use tracing::info;

pub fn handle(command: &TsCommands) -> Result<()> {
    match command {
        TsCommands::Stack {
            input,
            output,
            region,
        } => {
            info!("Stacking {} into {}", input.display(), output.display());
            let frame = load_unstacked(input)
                .with_context(|| format!("loading '{}'", input.display()))?;
            let records = stack_records(&frame, region)?;
            save_timeseries(&records, output)?;
            println!(
                "Stacked {} series into {}",
                records.len(),
                output.display()
            );
            Ok(())
        }
        TsCommands::Unstack { input, output } => {
            info!("Unstacking {} into {}", input.display(), output.display());
            let records = load_timeseries(input)
                .with_context(|| format!("loading '{}'", input.display()))?;
            let frame = unstack_records(&records)?;
            save_unstacked(&frame, output)?;
            println!(
                "Unstacked {} series ({} steps) into {}",
                frame.width(),
                frame.height(),
                output.display()
            );
            Ok(())
        }
        TsCommands::Check { inputs } => {
            let mut tables = Vec::with_capacity(inputs.len());
            for input in inputs {
                let records = load_timeseries(input)
                    .with_context(|| format!("loading '{}'", input.display()))?;
                tables.push((input.display().to_string(), records));
            }
            let views: Vec<(&str, &[_])> = tables
                .iter()
                .map(|(label, records)| (label.as_str(), records.as_slice()))
                .collect();
            match check_consistency_timeindex(&views)? {
                Some(index) => println!("Consistent time index: {index}"),
                None => println!("No series found"),
            }
            Ok(())
        }
    }
}
