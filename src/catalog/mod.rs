use std::{collections::HashMap, fmt::Debug};

use thiserror::Error;

pub mod files;
pub mod shared;

/// Rarity table entry as it appears in `rarities.json`.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RarityDef {
    /// Drop weight contributed by every item of this rarity.
    pub probability: f64,

    /// Inclusive `[min, max]` range item values are rolled from.
    pub value_range: (f64, f64),
}

/// Case table entry as it appears in `cases.json`.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CaseDef {
    pub price: f64,

    /// Item names in declaration order. Repeats are meaningful.
    pub skins: Vec<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("item {item:?} references unknown rarity {rarity:?}")]
    UnknownRarity { item: String, rarity: String },

    #[error("rarity {rarity:?} has invalid value range [{min}, {max}]")]
    InvalidValueRange { rarity: String, min: f64, max: f64 },

    #[error("rarity {rarity:?} has invalid probability {weight}")]
    InvalidWeight { rarity: String, weight: f64 },

    #[error("case {case:?} has invalid price {price}")]
    InvalidPrice { case: String, price: f64 },

    #[error("case {case:?} has a total drop weight too large to represent")]
    InvalidCaseWeight { case: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rarity {
    name: String,
    weight: f64,
    min_value: f64,
    max_value: f64,
}

impl Rarity {
    fn new(name: String, def: RarityDef) -> Result<Self, ValidationError> {
        if !def.probability.is_finite() || def.probability < 0.0 {
            return Err(ValidationError::InvalidWeight {
                rarity: name,
                weight: def.probability,
            });
        }

        let (min, max) = def.value_range;
        if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
            return Err(ValidationError::InvalidValueRange {
                rarity: name,
                min,
                max,
            });
        }

        Ok(Self {
            name,
            weight: def.probability,
            min_value: min,
            max_value: max,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Inclusive `(min, max)` value range.
    pub fn value_range(&self) -> (f64, f64) {
        (self.min_value, self.max_value)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min_value <= value && value <= self.max_value
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    name: String,
    rarity: String,
}

impl Item {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rarity(&self) -> &str {
        &self.rarity
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Case {
    name: String,
    price: f64,
    items: Vec<String>,
}

impl Case {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Item references in the order they were declared.
    pub fn items(&self) -> &[String] {
        &self.items
    }
}

/// Immutable set of rarities, items and cases. Every item is guaranteed to
/// reference a known rarity. Case contents are not checked against the item
/// table, see [`Catalog::dangling_references`].
#[derive(Default)]
pub struct Catalog {
    rarities: HashMap<String, Rarity>,
    items: HashMap<String, Item>,
    cases: HashMap<String, Case>,
}

impl Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Catalog {{ rarities: {}, items: {}, cases: {} }}",
            self.rarities.len(),
            self.items.len(),
            self.cases.len()
        )
    }
}

/// Sort a name-keyed table so validation reports the same error every run.
fn sorted<T>(table: HashMap<String, T>) -> Vec<(String, T)> {
    let mut entries: Vec<(String, T)> = table.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

impl Catalog {
    /// Validate the three tables and build a catalog from them. Fails on the
    /// first integrity problem found, checking rarities, then items, then
    /// cases, each in name order.
    pub fn load(
        rarities: HashMap<String, RarityDef>,
        items: HashMap<String, String>,
        cases: HashMap<String, CaseDef>,
    ) -> Result<Self, ValidationError> {
        let mut catalog = Self::default();

        for (name, def) in sorted(rarities) {
            let rarity = Rarity::new(name.clone(), def)?;
            catalog.rarities.insert(name, rarity);
        }

        for (name, rarity) in sorted(items) {
            if !catalog.rarities.contains_key(&rarity) {
                return Err(ValidationError::UnknownRarity { item: name, rarity });
            }
            catalog.items.insert(name.clone(), Item { name, rarity });
        }

        for (name, def) in sorted(cases) {
            if !def.price.is_finite() || def.price < 0.0 {
                return Err(ValidationError::InvalidPrice {
                    case: name,
                    price: def.price,
                });
            }

            let total = def
                .skins
                .iter()
                .filter_map(|item| catalog.rarity_of(item))
                .fold(0.0, |sum, rarity| sum + rarity.weight());
            if !total.is_finite() {
                return Err(ValidationError::InvalidCaseWeight { case: name });
            }

            catalog.cases.insert(
                name.clone(),
                Case {
                    name,
                    price: def.price,
                    items: def.skins,
                },
            );
        }

        for (case, item) in catalog.dangling_references() {
            tracing::warn!("Case {case:?} references unknown item {item:?}, it will never drop.");
        }

        tracing::debug!(
            "Loaded catalog with {} rarities, {} items and {} cases.",
            catalog.rarities.len(),
            catalog.items.len(),
            catalog.cases.len()
        );
        Ok(catalog)
    }

    pub fn get_rarity(&self, name: &str) -> Option<&Rarity> {
        self.rarities.get(name)
    }

    pub fn get_item(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn get_case(&self, name: &str) -> Option<&Case> {
        self.cases.get(name)
    }

    /// Rarity of the named item, if both the item and its rarity are known.
    pub fn rarity_of(&self, item: &str) -> Option<&Rarity> {
        self.get_item(item)
            .and_then(|item| self.get_rarity(item.rarity()))
    }

    pub fn rarities(&self) -> Vec<&Rarity> {
        let mut rarities: Vec<&Rarity> = self.rarities.values().collect();
        rarities.sort_by(|a, b| a.name.cmp(&b.name));
        rarities
    }

    pub fn items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    pub fn cases(&self) -> Vec<&Case> {
        let mut cases: Vec<&Case> = self.cases.values().collect();
        cases.sort_by(|a, b| a.name.cmp(&b.name));
        cases
    }

    /// Every (case, item) pair where a case lists an item the catalog does
    /// not know. Ordered by case name, then declaration order within a case.
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        let known = &self.items;
        self.cases()
            .into_iter()
            .flat_map(move |case| {
                case.items
                    .iter()
                    .filter(move |item| !known.contains_key(item.as_str()))
                    .map(move |item| (case.name(), item.as_str()))
            })
            .collect()
    }

    #[cfg(test)]
    pub fn sample() -> Self {
        Self::load(
            HashMap::from([
                ("Common".to_string(), rarity_def(90.0, 1.0, 5.0)),
                ("Rare".to_string(), rarity_def(10.0, 50.0, 100.0)),
                ("Retired".to_string(), rarity_def(0.0, 1.0, 1.0)),
            ]),
            HashMap::from([
                ("Sand Dune".to_string(), "Common".to_string()),
                ("Dragon Lore".to_string(), "Rare".to_string()),
                ("Old Camo".to_string(), "Retired".to_string()),
            ]),
            HashMap::from([
                (
                    "Weapon Case".to_string(),
                    case_def(2.5, &["Sand Dune", "Dragon Lore"]),
                ),
                ("Ghost Case".to_string(), case_def(1.0, &["Missing Skin"])),
                ("Retired Case".to_string(), case_def(1.0, &["Old Camo"])),
                (
                    "Mixed Case".to_string(),
                    case_def(
                        5.0,
                        &["Old Camo", "Missing Skin", "Sand Dune", "Dragon Lore"],
                    ),
                ),
            ]),
        )
        .unwrap()
    }
}

#[cfg(test)]
pub fn rarity_def(probability: f64, min: f64, max: f64) -> RarityDef {
    RarityDef {
        probability,
        value_range: (min, max),
    }
}

#[cfg(test)]
pub fn case_def(price: f64, skins: &[&str]) -> CaseDef {
    CaseDef {
        price,
        skins: skins.iter().map(|s| s.to_string()).collect(),
    }
}
