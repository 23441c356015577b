use rand::Rng;
use uuid::Uuid;

use crate::catalog::{Catalog, Rarity};

use super::{AwardedItem, DropError, VALUE_PRECISION};

/// Drop chance of one distinct item in a case.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DropOdds {
    pub item: String,
    pub rarity: String,

    /// Probability in `[0, 1]`. Repeated entries of the item are summed.
    pub chance: f64,
}

struct PoolEntry<'a> {
    item: &'a str,
    rarity: &'a Rarity,
}

/// The resolved, weighted candidates of a single case in declaration order.
/// Never empty and always has a positive, finite total weight.
struct DropPool<'a> {
    case: &'a str,
    entries: Vec<PoolEntry<'a>>,
    total: f64,
}

impl<'a> DropPool<'a> {
    fn build(case_name: &str, catalog: &'a Catalog) -> Result<Self, DropError> {
        let case = catalog
            .get_case(case_name)
            .ok_or_else(|| DropError::UnknownCase(case_name.to_string()))?;

        // Unknown items are skipped, as are zero weight items which could
        // otherwise win a roll of exactly zero.
        let entries: Vec<PoolEntry> = case
            .items()
            .iter()
            .filter_map(|item| {
                catalog.rarity_of(item).map(|rarity| PoolEntry {
                    item: item.as_str(),
                    rarity,
                })
            })
            .filter(|entry| entry.rarity.weight() > 0.0)
            .collect();

        let total = entries
            .iter()
            .fold(0.0, |sum, entry| sum + entry.rarity.weight());

        // The catalog rejects cases whose weights overflow, the finite check
        // keeps the pool invariant local.
        if entries.is_empty() || total <= 0.0 || !total.is_finite() {
            Err(DropError::NoValidDrops(case_name.to_string()))
        } else {
            Ok(Self {
                case: case.name(),
                entries,
                total,
            })
        }
    }

    /// Walk the pool accumulating weight. The first entry whose cumulative
    /// weight reaches `roll` wins, so a roll on a boundary goes to the entry
    /// ending there.
    ///
    /// Cumulative weight ends at exactly `total` and rolls are below it, so
    /// the last entry is only a fallback for an out of range roll.
    fn select(&self, roll: f64) -> Option<&PoolEntry<'a>> {
        let mut cumulative = 0.0;
        self.entries
            .iter()
            .find(|entry| {
                cumulative += entry.rarity.weight();
                cumulative >= roll
            })
            .or_else(|| self.entries.last())
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<AwardedItem, DropError> {
        let roll = rng.gen::<f64>() * self.total;
        let Some(winner) = self.select(roll) else {
            return Err(DropError::NoValidDrops(self.case.to_string()));
        };

        Ok(AwardedItem {
            id: Uuid::new_v4(),
            name: winner.item.to_string(),
            value: roll_value(winner.rarity, rng),
        })
    }
}

/// Round half away from zero to [`VALUE_PRECISION`] decimal places.
pub fn round_value(value: f64) -> f64 {
    let scale = 10f64.powi(VALUE_PRECISION);
    (value * scale).round() / scale
}

/// Sample uniformly from the inclusive value range. Rounding may step past a
/// bound that has more precision than currency, so the result is clamped.
fn roll_value<R: Rng + ?Sized>(rarity: &Rarity, rng: &mut R) -> f64 {
    let (min, max) = rarity.value_range();
    let value = round_value(rng.gen_range(min..=max)).clamp(min, max);
    debug_assert!(rarity.contains(value));
    value
}

/// Open one case, returning the awarded item. Consumes two values from `rng`:
/// the item roll, then the value roll.
pub fn open_case<R: Rng + ?Sized>(
    case_name: &str,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<AwardedItem, DropError> {
    DropPool::build(case_name, catalog)?.draw(rng)
}

/// Open the same case `count` times. Fails without producing anything if the
/// case cannot drop items.
pub fn open_cases<R: Rng + ?Sized>(
    case_name: &str,
    count: usize,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<Vec<AwardedItem>, DropError> {
    let pool = DropPool::build(case_name, catalog)?;
    (0..count).map(|_| pool.draw(rng)).collect()
}

/// Exact drop chance of every distinct item in a case, in the order items
/// first appear.
pub fn odds(case_name: &str, catalog: &Catalog) -> Result<Vec<DropOdds>, DropError> {
    let pool = DropPool::build(case_name, catalog)?;

    let mut odds: Vec<DropOdds> = Vec::new();
    for entry in &pool.entries {
        let chance = entry.rarity.weight() / pool.total;
        match odds.iter_mut().find(|o| o.item == entry.item) {
            Some(existing) => existing.chance += chance,
            None => odds.push(DropOdds {
                item: entry.item.to_string(),
                rarity: entry.rarity.name().to_string(),
                chance,
            }),
        }
    }
    Ok(odds)
}
