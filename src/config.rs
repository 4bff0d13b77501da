use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Layout of the returned price table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// One row per matched price update.
    Long,
    /// One row per publish time, one forward-filled column per runner.
    #[default]
    Wide,
}

impl From<bool> for TableFormat {
    /// `true` selects the wide layout.
    fn from(wide_format: bool) -> Self {
        if wide_format {
            TableFormat::Wide
        } else {
            TableFormat::Long
        }
    }
}

/// What the pivot does when a runner has two observations at one publish time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PivotConflict {
    /// The observation later in long-table order wins.
    #[default]
    KeepLast,
    /// Fail with `PricesError::DuplicateObservation`.
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOptions {
    pub format: TableFormat,
    pub on_conflict: PivotConflict,
}

impl PriceOptions {
    pub fn long() -> Self {
        Self { format: TableFormat::Long, ..Self::default() }
    }

    pub fn wide() -> Self {
        Self::default()
    }

    pub fn with_conflict(mut self, on_conflict: PivotConflict) -> Self {
        self.on_conflict = on_conflict;
        self
    }
}
