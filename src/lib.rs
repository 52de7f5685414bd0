pub mod advisor;
pub mod codec;
pub mod config;
pub mod expense;
pub mod store;
pub mod tracker;

pub use advisor::{advise, BudgetAdvisor, Verdict};
pub use codec::DecodeError;
pub use config::Config;
pub use expense::{Expense, ExpenseKind, KindTag};
pub use store::{ExpenseStore, LoadReport, SkippedLine, StoreError};
pub use tracker::ExpenseTracker;
