use crate::advisor::DEFAULT_THRESHOLD;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

const DEFAULT_DATA_FILE: &str = "expenses.txt";

/// Settings for an `ExpenseTracker`
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    data_file: PathBuf,
    overspending_threshold: Decimal,
}

impl Config {
    pub fn with_data_file<P: Into<PathBuf>>(&mut self, data_file: P) -> &mut Self {
        self.data_file = data_file.into();
        self
    }

    pub fn with_threshold(&mut self, threshold: Decimal) -> &mut Self {
        self.overspending_threshold = threshold;
        self
    }

    /// Where expenses are loaded from on startup and saved to on exit
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn overspending_threshold(&self) -> Decimal {
        self.overspending_threshold
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: DEFAULT_DATA_FILE.into(),
            overspending_threshold: DEFAULT_THRESHOLD,
        }
    }
}
