use thiserror::Error;
use uuid::Uuid;

mod engine;

pub use engine::{odds, open_case, open_cases, round_value, DropOdds};

/// Decimal places awarded item values are rounded to, matching currency.
pub const VALUE_PRECISION: i32 = 2;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DropError {
    #[error("unknown case {0:?}")]
    UnknownCase(String),

    #[error("case {0:?} has no items that can drop")]
    NoValidDrops(String),
}

/// A freshly unboxed copy of an item. Ownership passes to the caller, which
/// typically appends it to a player's inventory.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AwardedItem {
    pub id: Uuid,
    pub name: String,
    pub value: f64,
}
