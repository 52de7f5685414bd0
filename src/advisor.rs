use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

/// Spending above this total is considered overspending
pub const DEFAULT_THRESHOLD: Decimal = dec!(10000);

/// A qualitative judgement of a spending total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Overspending,
    UnderControl,
}

/// Judges spending totals against a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetAdvisor {
    threshold: Decimal,
}

impl BudgetAdvisor {
    pub fn new(threshold: Decimal) -> Self {
        BudgetAdvisor { threshold }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Totals strictly greater than the threshold are overspending
    pub fn advise(&self, total: Decimal) -> Verdict {
        if total > self.threshold {
            Verdict::Overspending
        } else {
            Verdict::UnderControl
        }
    }
}

impl Default for BudgetAdvisor {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Advise on `total` using the default threshold
pub fn advise(total: Decimal) -> Verdict {
    BudgetAdvisor::default().advise(total)
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match *self {
            Verdict::Overspending => "Warning: You are overspending! Try to save more.",
            Verdict::UnderControl => "Good job! Your spending is under control.",
        };
        f.write_str(message)
    }
}
