//! Last-traded probability time series from Betfair market stream files.
//!
//! A stream file holds one JSON record per line. The pipeline is
//! load -> extract -> build: records are parsed ([`loader`]), runner
//! definitions and price updates are pulled out of them ([`extract`]), and the
//! two are joined into an Arrow table of implied probabilities ([`table`]),
//! either one row per update or pivoted to one column per runner.

pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod loader;
pub mod table;
pub mod types;

use std::path::Path;

use arrow::record_batch::RecordBatch;

pub use config::{PivotConflict, PriceOptions, TableFormat};
pub use error::{PricesError, Result};

use table::RunnerIndex;

/// Price table for the market in `path`, in the requested layout.
///
/// `TableFormat::Wide` (the default) is time-indexed and forward-filled;
/// `TableFormat::Long` has one row per matched price update.
pub fn get_prices(path: impl AsRef<Path>, format: TableFormat) -> Result<RecordBatch> {
    get_prices_with(path, &PriceOptions { format, ..PriceOptions::default() })
}

pub fn get_prices_with(path: impl AsRef<Path>, options: &PriceOptions) -> Result<RecordBatch> {
    let records = loader::load_records(path)?;
    let extracted = extract::extract(&records)?;
    let runners = RunnerIndex::dedup(&extracted.runners);
    let long = table::build_long(&extracted.prices, &runners)?;

    match options.format {
        TableFormat::Long => Ok(long),
        TableFormat::Wide => table::build_wide(&long, options.on_conflict),
    }
}

/// Deduplicated runner ids and names defined in `path`.
pub fn get_runners(path: impl AsRef<Path>) -> Result<RecordBatch> {
    let records = loader::load_records(path)?;
    let extracted = extract::extract(&records)?;
    table::runner_table(&RunnerIndex::dedup(&extracted.runners))
}
