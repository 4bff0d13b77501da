use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{EventRecord, MarketChange, MarketDefinition, RunnerChange, RunnerDescriptor, RunnerId};

pub const RUNNER_NAMES: &[&str] = &[
    "Brave Lad",
    "Copper Kettle",
    "Dusty Road",
    "Emerald Isle",
    "Fast Freddie",
    "Golden Hour",
    "Harbour Light",
    "Iron Will",
];

const FIRST_SELECTION_ID: i64 = 1_000_001;
const MIN_LTP: f64 = 1.01;
const MAX_LTP: f64 = 1000.0;

/// Seeded generator for synthetic market stream files.
///
/// Emits one definition record up front, then one price record per tick with a
/// random subset of runners moving on a multiplicative random walk.
pub struct MarketGenerator {
    rng: StdRng,
    prices: Vec<f64>,
    pt: i64,
    tick: u64,
    pub tick_ms: i64,
    /// Re-publish the runner list every N ticks with renamed runners (0 = never).
    pub redefine_every: u64,
    /// Chance a tick also carries an update for a selection with no definition.
    pub orphan_rate: f64,
}

impl MarketGenerator {
    pub fn new(seed: u64, runners: usize, start_ms: i64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let prices = (0..runners.min(RUNNER_NAMES.len()))
            .map(|_| rng.gen_range(1.5..20.0))
            .collect();
        Self {
            rng,
            prices,
            pt: start_ms,
            tick: 0,
            tick_ms: 50,
            redefine_every: 0,
            orphan_rate: 0.0,
        }
    }

    pub fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    pub fn runner_id(idx: usize) -> RunnerId {
        RunnerId(FIRST_SELECTION_ID + idx as i64)
    }

    /// The orphan selection never appears in a definition.
    pub fn orphan_id() -> RunnerId {
        RunnerId(FIRST_SELECTION_ID - 1)
    }

    fn definition(&self, suffix: &str) -> MarketDefinition {
        let runners = (0..self.prices.len())
            .map(|i| RunnerDescriptor {
                id: Self::runner_id(i),
                name: format!("{}{}", RUNNER_NAMES[i], suffix),
            })
            .collect();
        MarketDefinition { runners: Some(runners) }
    }

    /// The opening record: full runner list, no prices.
    pub fn opening(&self) -> EventRecord {
        EventRecord {
            pt: self.pt,
            mc: vec![MarketChange { market_definition: Some(self.definition("")), rc: None }],
        }
    }

    pub fn next_record(&mut self) -> EventRecord {
        self.tick += 1;
        self.pt += self.tick_ms;

        let mut rc = Vec::new();
        for (i, price) in self.prices.iter_mut().enumerate() {
            if !self.rng.gen_bool(0.6) {
                continue;
            }
            let step = self.rng.gen_range(-0.04..0.04);
            *price = (*price * (1.0 + step)).clamp(MIN_LTP, MAX_LTP);
            rc.push(RunnerChange { id: Self::runner_id(i), ltp: Some((*price * 100.0).round() / 100.0) });
        }
        if self.orphan_rate > 0.0 && self.rng.gen_bool(self.orphan_rate.min(1.0)) {
            rc.push(RunnerChange { id: Self::orphan_id(), ltp: Some(self.rng.gen_range(2.0..50.0)) });
        }

        let market_definition = (self.redefine_every > 0 && self.tick % self.redefine_every == 0)
            .then(|| self.definition(" (R)"));

        EventRecord {
            pt: self.pt,
            mc: vec![MarketChange { market_definition, rc: (!rc.is_empty()).then_some(rc) }],
        }
    }

    /// Opening record plus `ticks` price records.
    pub fn generate(&mut self, ticks: usize) -> Vec<EventRecord> {
        let mut records = Vec::with_capacity(ticks + 1);
        records.push(self.opening());
        for _ in 0..ticks {
            records.push(self.next_record());
        }
        records
    }

    /// The same records rendered as a line-delimited stream file.
    pub fn generate_lines(&mut self, ticks: usize) -> serde_json::Result<String> {
        let mut out = String::new();
        for record in self.generate(ticks) {
            out.push_str(&serde_json::to_string(&record)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::loader::parse_records;

    #[test]
    fn test_seeded_output_is_deterministic() {
        let a = MarketGenerator::new(7, 4, 0).generate_lines(50).unwrap();
        let b = MarketGenerator::new(7, 4, 0).generate_lines(50).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_lines_round_trip_through_loader() {
        let mut gen = MarketGenerator::new(1, 3, 1_600_000_000_000);
        let text = gen.generate_lines(20).unwrap();
        let records = parse_records(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 21);

        let out = extract(&records).unwrap();
        assert_eq!(out.runners.len(), 3);
        assert!(out.prices.iter().all(|p| p.ltp.unwrap() >= MIN_LTP));
    }

    #[test]
    fn test_redefinitions_and_orphans() {
        let mut gen = MarketGenerator::new(3, 2, 0);
        gen.redefine_every = 5;
        gen.orphan_rate = 1.0;
        let out = extract(&gen.generate(10)).unwrap();

        // opening + ticks 5 and 10
        assert_eq!(out.runners.len(), 6);
        assert_eq!(out.prices.iter().filter(|p| p.id == MarketGenerator::orphan_id()).count(), 10);
    }
}
