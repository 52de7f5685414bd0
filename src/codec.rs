//! One-line text encoding of an `Expense`.
//!
//! A line looks like `<Kind>,<amount>,<date>,<description>,<attribute>`. Fields are
//! joined with commas and are NOT escaped, so a comma inside the description or the
//! attribute shifts every field after it.
// @todo Move to a self-describing format (e.g. length prefixed fields) once we're
// prepared to migrate existing expense files.

use crate::expense::{Expense, ExpenseKind, KindTag, UnknownKind};
use rust_decimal::Decimal;
use std::str::{self, FromStr, Utf8Error};
use thiserror::Error;

const DELIMITER: &str = ",";

// Kind, amount, date, description, attribute
const FIELD_COUNT: usize = 5;

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error("'{amount}' is not a valid amount")]
    InvalidAmount {
        amount: String,
        source: rust_decimal::Error,
    },
    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),
    #[error("line is not valid UTF-8")]
    InvalidUtf8(#[from] Utf8Error),
}

/// Encode an expense as a single line, without a trailing line break
pub fn encode(expense: &Expense) -> String {
    let tag = expense.kind().tag();
    let amount = expense.amount().to_string();

    [
        tag.as_str(),
        amount.as_str(),
        expense.date(),
        expense.description(),
        expense.attribute(),
    ]
    .join(DELIMITER)
}

/// Decode a single line into an expense.
///
/// Missing trailing fields are read as empty strings, and anything after the fifth
/// field is ignored. The kind is checked before the amount, so a line with both an
/// unknown kind and a bad amount reports the unknown kind.
pub fn decode(line: &str) -> Result<Expense, DecodeError> {
    let mut fields = [""; FIELD_COUNT];
    for (slot, field) in fields.iter_mut().zip(line.split(DELIMITER)) {
        *slot = field;
    }
    let [kind, amount, date, description, attribute] = fields;

    let tag = KindTag::from_str(kind)?;
    let amount = parse_amount(amount)?;

    Ok(Expense::new(
        amount,
        date,
        description,
        ExpenseKind::with_attribute(tag, attribute),
    ))
}

/// Decode a single line read straight from disk, which may not be valid UTF-8
pub fn decode_bytes(line: &[u8]) -> Result<Expense, DecodeError> {
    decode(str::from_utf8(line)?)
}

/// Parse an amount in its canonical text form. Surrounding whitespace is tolerated.
pub fn parse_amount(amount: &str) -> Result<Decimal, DecodeError> {
    Decimal::from_str(amount.trim()).map_err(|source| DecodeError::InvalidAmount {
        amount: amount.into(),
        source,
    })
}
