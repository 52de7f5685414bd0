use crate::{
    advisor::{BudgetAdvisor, Verdict},
    config::Config,
    expense::Expense,
    store::{ExpenseStore, LoadReport, StoreError},
};
use log::{debug, warn};
use rust_decimal::Decimal;

/// The operations a user interface drives.
///
/// An `ExpenseTracker` ties one `ExpenseStore` to the data file and spending threshold
/// in its `Config`. It never reads from or writes to a terminal; prompting, parsing
/// raw input and deciding when to load or save are left to the caller.
#[derive(Debug)]
pub struct ExpenseTracker {
    config: Config,
    store: ExpenseStore,
    advisor: BudgetAdvisor,
}

impl ExpenseTracker {
    pub fn new(config: Config) -> Self {
        let advisor = BudgetAdvisor::new(config.overspending_threshold());
        ExpenseTracker {
            config,
            store: ExpenseStore::new(),
            advisor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ExpenseStore {
        &self.store
    }

    pub fn add_food_expense<D, S, F>(
        &mut self,
        amount: Decimal,
        date: D,
        description: S,
        food_type: F,
    ) where
        D: Into<String>,
        S: Into<String>,
        F: Into<String>,
    {
        self.store
            .add(Expense::food(amount, date, description, food_type));
    }

    pub fn add_travel_expense<D, S, T>(
        &mut self,
        amount: Decimal,
        date: D,
        description: S,
        destination: T,
    ) where
        D: Into<String>,
        S: Into<String>,
        T: Into<String>,
    {
        self.store
            .add(Expense::travel(amount, date, description, destination));
    }

    pub fn list_all_expenses(&self) -> Vec<String> {
        self.store.list()
    }

    pub fn total_expenses(&self) -> Decimal {
        self.store.total()
    }

    pub fn budget_verdict(&self) -> Verdict {
        self.advisor.advise(self.store.total())
    }

    /// Load expenses from the configured data file, replacing any already recorded
    pub fn load_on_startup(&mut self) -> Result<LoadReport, StoreError> {
        let report = self.store.load(self.config.data_file())?;

        if !report.found {
            debug!(
                "{} not found, starting with no expenses",
                self.config.data_file().display()
            );
        } else if !report.skipped.is_empty() {
            warn!(
                "{} malformed lines were skipped while loading {}",
                report.skipped.len(),
                self.config.data_file().display()
            );
        }

        Ok(report)
    }

    /// Write every recorded expense to the configured data file
    pub fn save_on_exit(&self) -> Result<(), StoreError> {
        self.store.save(self.config.data_file())
    }
}

impl Default for ExpenseTracker {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
