use tracing::debug;

use crate::error::{PricesError, Result};
use crate::types::{EventRecord, PriceUpdate, RunnerDescriptor};

/// Only this entry of each record's `mc` list is inspected. Stream files for a
/// single market carry one market change per line.
pub const FIRST_MARKET_CHANGE: usize = 0;

/// Runner definitions and price updates pulled out of a stream, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    /// Every descriptor seen, duplicates included.
    pub runners: Vec<RunnerDescriptor>,
    pub prices: Vec<PriceUpdate>,
}

/// Single pass over the records collecting both runner definitions and
/// price updates.
///
/// A record without a market definition, a runners list, or an `rc` list just
/// contributes nothing to that output. An empty `mc` list is an error; records
/// map one-to-one onto file lines, so it reports the 1-based line.
pub fn extract(records: &[EventRecord]) -> Result<Extracted> {
    let mut out = Extracted::default();

    for (idx, record) in records.iter().enumerate() {
        let mc = record
            .mc
            .get(FIRST_MARKET_CHANGE)
            .ok_or_else(|| PricesError::EmptyMarketChange { line: idx + 1 })?;

        if let Some(runners) = mc.market_definition.as_ref().and_then(|d| d.runners.as_ref()) {
            out.runners.extend(runners.iter().cloned());
        }

        if let Some(rc) = &mc.rc {
            out.prices.extend(rc.iter().map(|item| PriceUpdate {
                id: item.id,
                ltp: item.ltp,
                pt: record.pt,
            }));
        }
    }

    debug!(
        records = records.len(),
        runners = out.runners.len(),
        prices = out.prices.len(),
        "extracted stream fields"
    );
    Ok(out)
}
