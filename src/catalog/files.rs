use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{CaseDef, Catalog, RarityDef, ValidationError};

pub const RARITIES_FILE: &str = "rarities.json";
pub const ITEMS_FILE: &str = "skins.json";
pub const CASES_FILE: &str = "cases.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid catalog: {0}")]
    Validation(#[from] ValidationError),
}

async fn read_table<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T, LoadError> {
    let path = dir.join(file);
    tracing::debug!("Reading {}.", path.display());

    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(source) => return Err(LoadError::Io { path, source }),
    };
    serde_json::from_slice(&raw).map_err(|source| LoadError::Json { path, source })
}

/// Load and validate the rarity, item and case tables found in `dir`.
pub async fn load_catalog(dir: &Path) -> Result<Catalog, LoadError> {
    tracing::debug!("Loading catalog from {}.", dir.display());

    let rarities: HashMap<String, RarityDef> = read_table(dir, RARITIES_FILE).await?;
    let items: HashMap<String, String> = read_table(dir, ITEMS_FILE).await?;
    let cases: HashMap<String, CaseDef> = read_table(dir, CASES_FILE).await?;

    Ok(Catalog::load(rarities, items, cases)?)
}

#[cfg(test)]
pub async fn write_tables(rarities: &str, items: &str, cases: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lootcase-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join(RARITIES_FILE), rarities)
        .await
        .unwrap();
    tokio::fs::write(dir.join(ITEMS_FILE), items).await.unwrap();
    tokio::fs::write(dir.join(CASES_FILE), cases).await.unwrap();
    dir
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use crate::catalog::ValidationError;

    use super::{load_catalog, write_tables, LoadError, CASES_FILE};

    const RARITIES: &str = r#"{
        "Mil-Spec": {"probability": 0.8, "value_range": [0.1, 4.0]},
        "Covert": {"probability": 0.2, "value_range": [15, 400]}
    }"#;
    const ITEMS: &str = r#"{"P250 | Sand Dune": "Mil-Spec", "AWP | Asiimov": "Covert"}"#;
    const CASES: &str = r#"{
        "Test Case": {"price": 2.49, "skins": ["P250 | Sand Dune", "AWP | Asiimov", "Ghost"]}
    }"#;

    fn shipped_data() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    #[tokio::test]
    async fn test_load_shipped_data() {
        let catalog = load_catalog(&shipped_data()).await.unwrap();
        assert!(!catalog.cases().is_empty());
        assert!(catalog.dangling_references().is_empty());
        assert!(catalog.get_case("Chroma Case").is_some());
    }

    #[tokio::test]
    async fn test_load_tables() {
        let dir = write_tables(RARITIES, ITEMS, CASES).await;
        let catalog = load_catalog(&dir).await.unwrap();

        assert_eq!(
            catalog.get_rarity("Covert").unwrap().value_range(),
            (15.0, 400.0)
        );
        assert_eq!(catalog.get_item("AWP | Asiimov").unwrap().rarity(), "Covert");
        let case = catalog.get_case("Test Case").unwrap();
        assert_eq!(case.price(), 2.49);
        assert_eq!(case.items().len(), 3);
        assert_eq!(catalog.dangling_references(), vec![("Test Case", "Ghost")]);

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = std::env::temp_dir().join("lootcase-does-not-exist");
        assert!(matches!(
            load_catalog(&dir).await,
            Err(LoadError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let dir = write_tables(RARITIES, ITEMS, "{\"Test Case\": [").await;
        match load_catalog(&dir).await {
            Err(LoadError::Json { path, .. }) => assert!(path.ends_with(CASES_FILE)),
            other => panic!("Expected JSON error, got {other:?}"),
        }
        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_invalid_tables() {
        let dir = write_tables(RARITIES, r#"{"Knife": "Gold"}"#, "{}").await;
        assert!(matches!(
            load_catalog(&dir).await,
            Err(LoadError::Validation(ValidationError::UnknownRarity { .. }))
        ));
        tokio::fs::remove_dir_all(dir).await.ok();
    }
}
