use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use betfair_prices::{get_prices_with, get_runners, PivotConflict, PriceOptions, TableFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Output {
    Table,
    Csv,
}

#[derive(Parser)]
#[command(name = "betfair-prices", about = "Last-traded probabilities from a Betfair market stream file")]
struct Cli {
    /// Market stream file (one JSON record per line)
    path: PathBuf,

    /// Table layout
    #[arg(long, value_enum, default_value = "wide")]
    format: TableFormat,

    /// Handling of two prices for one runner at the same publish time
    #[arg(long, value_enum, default_value = "keep-last")]
    on_conflict: PivotConflict,

    /// Print as an aligned table or as CSV
    #[arg(long, value_enum, default_value = "table")]
    output: Output,

    /// Print the deduplicated runner list instead of prices
    #[arg(long)]
    runners: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let batch = if cli.runners {
        get_runners(&cli.path)?
    } else {
        let options = PriceOptions { format: cli.format, on_conflict: cli.on_conflict };
        get_prices_with(&cli.path, &options)?
    };
    info!(path = %cli.path.display(), rows = batch.num_rows(), columns = batch.num_columns(), "table ready");

    match cli.output {
        Output::Table => arrow::util::pretty::print_batches(&[batch])?,
        Output::Csv => {
            let mut writer = arrow::csv::Writer::new(std::io::stdout().lock());
            writer.write(&batch)?;
        }
    }

    Ok(())
}
