//! Loot case catalog and the weighted drop engine used to open cases.
//!
//! A [`catalog::Catalog`] is built once from rarity, item and case tables and
//! never changes afterwards. [`drops::open_case`] reads it to award a single
//! randomly chosen, randomly valued item.

pub mod catalog;
pub mod drops;
