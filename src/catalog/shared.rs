use std::{
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};

use super::{
    files::{load_catalog, LoadError},
    Catalog,
};

/// Hands out catalog snapshots to concurrent draws. Reloading never mutates a
/// catalog in place; a new instance is swapped in and draws still holding the
/// old snapshot finish against it.
#[derive(Debug)]
pub struct SharedCatalog {
    current: RwLock<Arc<Catalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        // The lock only guards a pointer swap, so a poisoned lock still holds
        // a complete catalog.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a new catalog, returning the one it replaced.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, Arc::new(catalog))
    }

    /// Load a catalog from `dir` and install it. On failure the current
    /// catalog keeps serving.
    pub async fn reload(&self, dir: &Path) -> Result<(), LoadError> {
        let catalog = load_catalog(dir).await?;
        tracing::info!(
            "Reloaded catalog from {} ({} cases).",
            dir.display(),
            catalog.cases().len()
        );
        self.replace(catalog);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::catalog::{files::write_tables, Catalog};

    use super::SharedCatalog;

    #[test]
    fn test_replace_keeps_old_snapshot() {
        let shared = SharedCatalog::new(Catalog::sample());
        let before = shared.snapshot();

        let old = shared.replace(Catalog::default());
        assert!(Arc::ptr_eq(&before, &old));
        assert!(before.get_case("Weapon Case").is_some());
        assert!(shared.snapshot().get_case("Weapon Case").is_none());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_catalog() {
        let shared = SharedCatalog::new(Catalog::sample());
        let dir = write_tables("not json", "{}", "{}").await;

        assert!(shared.reload(&dir).await.is_err());
        assert!(shared.snapshot().get_case("Weapon Case").is_some());

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_reload() {
        let shared = SharedCatalog::new(Catalog::default());
        let dir = write_tables(
            r#"{"Common": {"probability": 1.0, "value_range": [1, 2]}}"#,
            r#"{"Sand Dune": "Common"}"#,
            r#"{"Starter Case": {"price": 0.5, "skins": ["Sand Dune"]}}"#,
        )
        .await;

        shared.reload(&dir).await.unwrap();
        assert!(shared.snapshot().get_case("Starter Case").is_some());

        tokio::fs::remove_dir_all(dir).await.ok();
    }
}
