use rust_decimal::Decimal;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A single logged expense.
///
/// Every `Expense` carries the fields shared by all kinds (amount, date and
/// description) plus the attribute that belongs to its `ExpenseKind`. Expenses are
/// immutable once created; the only way to get rid of one is to reload the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    amount: Decimal,
    // Free-form, expected to be "DD/MM" but never validated
    date: String,
    description: String,
    kind: ExpenseKind,
}

/// The category of an expense, along with its kind-specific attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseKind {
    Food { food_type: String },
    Travel { destination: String },
}

/// The bare discriminator of an `ExpenseKind`, as written at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTag {
    Food,
    Travel,
}

#[derive(Error, Debug, Eq, PartialEq)]
#[error("unknown expense kind '{0}'")]
pub struct UnknownKind(pub String);

impl Expense {
    pub fn new<D, S>(amount: Decimal, date: D, description: S, kind: ExpenseKind) -> Self
    where
        D: Into<String>,
        S: Into<String>,
    {
        Expense {
            amount,
            date: date.into(),
            description: description.into(),
            kind,
        }
    }

    pub fn food<D, S, F>(amount: Decimal, date: D, description: S, food_type: F) -> Self
    where
        D: Into<String>,
        S: Into<String>,
        F: Into<String>,
    {
        let kind = ExpenseKind::Food {
            food_type: food_type.into(),
        };
        Self::new(amount, date, description, kind)
    }

    pub fn travel<D, S, T>(amount: Decimal, date: D, description: S, destination: T) -> Self
    where
        D: Into<String>,
        S: Into<String>,
        T: Into<String>,
    {
        let kind = ExpenseKind::Travel {
            destination: destination.into(),
        };
        Self::new(amount, date, description, kind)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &ExpenseKind {
        &self.kind
    }

    /// The kind-specific attribute, i.e. the food type or the destination
    pub fn attribute(&self) -> &str {
        self.kind.attribute()
    }

    /// Returns a tagged, human readable line describing this expense.
    ///
    /// The amount is rendered exactly as it is serialised, so what the user sees is
    /// what ends up on disk.
    pub fn describe(&self) -> String {
        format!(
            "[{}] Amount: {} | Date: {} | Description: {} | {}: {}",
            self.kind.tag(),
            self.amount,
            self.date,
            self.description,
            self.kind.tag().label(),
            self.kind.attribute()
        )
    }

    /// Returns this expense as a single line of comma delimited text
    pub fn serialize(&self) -> String {
        crate::codec::encode(self)
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl ExpenseKind {
    /// Build the kind named by `tag`, attaching `attribute` as its payload
    pub fn with_attribute<S: Into<String>>(tag: KindTag, attribute: S) -> Self {
        match tag {
            KindTag::Food => ExpenseKind::Food {
                food_type: attribute.into(),
            },
            KindTag::Travel => ExpenseKind::Travel {
                destination: attribute.into(),
            },
        }
    }

    pub fn tag(&self) -> KindTag {
        match *self {
            ExpenseKind::Food { .. } => KindTag::Food,
            ExpenseKind::Travel { .. } => KindTag::Travel,
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            ExpenseKind::Food { food_type } => food_type,
            ExpenseKind::Travel { destination } => destination,
        }
    }
}

impl KindTag {
    pub fn as_str(&self) -> &'static str {
        match *self {
            KindTag::Food => "Food",
            KindTag::Travel => "Travel",
        }
    }

    /// The caption shown next to the kind-specific attribute
    pub fn label(&self) -> &'static str {
        match *self {
            KindTag::Food => "Food Type",
            KindTag::Travel => "Destination",
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KindTag {
    type Err = UnknownKind;

    // Tags are matched exactly; "food" is not a known kind.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Food" => Ok(KindTag::Food),
            "Travel" => Ok(KindTag::Travel),
            _ => Err(UnknownKind(s.into())),
        }
    }
}
