// Selection store: ordered, id-unique set of selected products, persisted
// after every mutation.
//
// Only the methods on `SelectionStore` mutate the selection. Everything
// else reads it through `list()`. Storage failures never reach the caller:
// a corrupt or unreadable payload restores to an empty selection, and a
// failed write leaves the in-memory selection correct but not durable.

use tracing::{debug, info, warn};

use crate::catalog::{IntoProductId, Product, ProductId};

use super::storage::SelectionStorage;

/// Outcome of a toggle: the product's membership after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

pub struct SelectionStore {
    entries: Vec<Product>,
    storage: Box<dyn SelectionStorage>,
    key: String,
}

impl SelectionStore {
    /// Create an empty store backed by `storage` under `key`. Does not read
    /// from storage; see [`SelectionStore::open`].
    pub fn new(storage: Box<dyn SelectionStorage>, key: impl Into<String>) -> Self {
        SelectionStore {
            entries: Vec::new(),
            storage,
            key: key.into(),
        }
    }

    /// Create a store and restore its contents from storage.
    pub fn open(storage: Box<dyn SelectionStorage>, key: impl Into<String>) -> Self {
        let mut store = Self::new(storage, key);
        store.restore();
        store
    }

    /// Replace the in-memory selection with what storage holds.
    ///
    /// A missing key, a read failure, or a payload that does not parse all
    /// leave the selection empty. Duplicate ids in the payload are collapsed
    /// to their first occurrence.
    pub fn restore(&mut self) {
        self.entries.clear();

        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored selection under '{}'", self.key);
                return;
            }
            Err(e) => {
                warn!("Failed to read stored selection, starting empty: {:#}", e);
                return;
            }
        };

        let stored: Vec<Product> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Stored selection is corrupt, starting empty: {}", e);
                return;
            }
        };

        for product in stored {
            if self.position(product.id).is_none() {
                self.entries.push(product);
            }
        }
        info!("Restored {} selected products", self.entries.len());
    }

    /// Append `product` unless an entry with the same id exists.
    /// Returns `true` if the selection changed.
    pub fn add(&mut self, product: Product) -> bool {
        if self.position(product.id).is_some() {
            debug!("Product {} already selected", product.id);
            return false;
        }
        debug!("Selecting product {} ({})", product.id, product.name);
        self.entries.push(product);
        self.persist();
        true
    }

    /// Remove the entry named by `key` (numeric or textual id).
    /// Returns `true` if the selection changed.
    pub fn remove<K: IntoProductId>(&mut self, key: K) -> bool {
        let Some(id) = key.into_product_id() else {
            warn!("Ignoring removal with an unparseable product id");
            return false;
        };
        match self.position(id) {
            Some(idx) => {
                let removed = self.entries.remove(idx);
                debug!("Deselected product {} ({})", removed.id, removed.name);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Add `product` if absent, remove it if present. Membership is decided
    /// by id, never by record equality.
    pub fn toggle(&mut self, product: Product) -> Toggle {
        if self.contains(product.id) {
            self.remove(product.id);
            Toggle::Removed
        } else {
            self.add(product);
            Toggle::Added
        }
    }

    /// Drop every entry. Persists even when already empty so storage never
    /// disagrees with an explicit clear.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        info!("Cleared {} selected products", count);
        self.persist();
    }

    /// Write the full ordered selection to storage. Failures are logged and
    /// swallowed.
    pub fn persist(&self) {
        let payload = match serde_json::to_string(&self.entries) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize selection: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.write(&self.key, &payload) {
            warn!("Failed to persist selection (kept in memory): {:#}", e);
        }
    }

    /// The current selection in insertion order.
    pub fn list(&self) -> &[Product] {
        &self.entries
    }

    /// An owned copy of the selection, for consumers that must not observe
    /// later mutations.
    pub fn snapshot(&self) -> Vec<Product> {
        self.entries.clone()
    }

    pub fn contains<K: IntoProductId>(&self, key: K) -> bool {
        key.into_product_id()
            .is_some_and(|id| self.position(id).is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.entries.iter().position(|p| p.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::storage::MemoryStorage;
    use std::sync::Arc;

    const KEY: &str = "selectedProducts";

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId(id),
            name: name.to_string(),
            brand: "Brand".to_string(),
            category: "cleanser".to_string(),
            description: format!("{name} description"),
            image: format!("https://img.example/{id}.jpg"),
        }
    }

    fn ids(store: &SelectionStore) -> Vec<i64> {
        store.list().iter().map(|p| p.id.0).collect()
    }

    /// Storage whose writes always fail, as when the backing store is full.
    struct FullStorage;

    impl SelectionStorage for FullStorage {
        fn read(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        fn write(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("quota exceeded")
        }
    }

    /// Storage whose reads always fail.
    struct UnreadableStorage;

    impl SelectionStorage for UnreadableStorage {
        fn read(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("disk I/O error")
        }
        fn write(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn memory_store() -> (SelectionStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = SelectionStore::open(Box::new(Arc::clone(&storage)), KEY);
        (store, storage)
    }

    #[test]
    fn new_store_is_empty() {
        let (store, storage) = memory_store();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        // Opening does not write.
        assert!(storage.get(KEY).is_none());
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let (mut store, _) = memory_store();
        assert!(store.add(product(3, "C")));
        assert!(store.add(product(1, "A")));
        assert!(store.add(product(2, "B")));
        assert_eq!(ids(&store), vec![3, 1, 2]);
    }

    #[test]
    fn repeated_add_keeps_one_entry() {
        let (mut store, _) = memory_store();
        for _ in 0..5 {
            store.add(product(7, "Serum"));
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.list().iter().filter(|p| p.id == ProductId(7)).count(), 1);
    }

    #[test]
    fn add_duplicate_returns_false_and_keeps_original_record() {
        let (mut store, _) = memory_store();
        store.add(product(7, "Original"));
        assert!(!store.add(product(7, "Impostor")));
        assert_eq!(store.list()[0].name, "Original");
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let (mut store, storage) = memory_store();
        store.add(product(1, "A"));
        let before = storage.get(KEY);

        assert!(!store.remove(99i64));
        assert!(!store.remove("99"));
        assert_eq!(ids(&store), vec![1]);
        assert_eq!(storage.get(KEY), before);
    }

    #[test]
    fn remove_accepts_text_id() {
        let (mut store, _) = memory_store();
        store.add(product(7, "Serum"));
        assert_eq!(store.len(), 1);
        assert!(store.remove("7"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn remove_with_unparseable_id_is_noop() {
        let (mut store, _) = memory_store();
        store.add(product(7, "Serum"));
        assert!(!store.remove("seven"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_preserves_order_of_remaining_entries() {
        let (mut store, _) = memory_store();
        store.add(product(1, "A"));
        store.add(product(2, "B"));
        store.add(product(3, "C"));
        store.remove(2i64);
        assert_eq!(ids(&store), vec![1, 3]);
    }

    #[test]
    fn toggle_twice_restores_original_contents() {
        let (mut store, _) = memory_store();
        store.add(product(1, "A"));
        store.add(product(2, "B"));
        let before = store.snapshot();

        assert_eq!(store.toggle(product(5, "E")), Toggle::Added);
        assert_eq!(store.toggle(product(5, "E")), Toggle::Removed);
        assert_eq!(store.list(), before.as_slice());

        assert_eq!(store.toggle(product(1, "A")), Toggle::Removed);
        assert_eq!(store.toggle(product(1, "A")), Toggle::Added);
        assert_eq!(ids(&store), vec![2, 1]);
    }

    #[test]
    fn toggle_matches_by_id_not_record() {
        let (mut store, _) = memory_store();
        store.add(product(4, "Old name"));
        assert_eq!(store.toggle(product(4, "New name")), Toggle::Removed);
        assert!(store.is_empty());
    }

    #[test]
    fn every_mutation_persists_full_list() {
        let (mut store, storage) = memory_store();
        store.add(product(1, "A"));
        store.add(product(2, "B"));

        let saved: Vec<Product> = serde_json::from_str(&storage.get(KEY).unwrap()).unwrap();
        assert_eq!(saved, store.snapshot());

        store.remove(1i64);
        let saved: Vec<Product> = serde_json::from_str(&storage.get(KEY).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, ProductId(2));
    }

    #[test]
    fn clear_empties_and_persists() {
        let (mut store, storage) = memory_store();
        store.add(product(1, "A"));
        store.add(product(2, "B"));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(storage.get(KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn restore_reads_persisted_selection() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut store = SelectionStore::open(Box::new(Arc::clone(&storage)), KEY);
            store.add(product(2, "B"));
            store.add(product(1, "A"));
        }
        let store = SelectionStore::open(Box::new(Arc::clone(&storage)), KEY);
        assert_eq!(ids(&store), vec![2, 1]);
        assert_eq!(store.list()[0].name, "B");
    }

    #[test]
    fn restore_with_corrupt_payload_is_empty() {
        let storage = MemoryStorage::with_value(KEY, "{ this is not json");
        let store = SelectionStore::open(Box::new(storage), KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn restore_with_wrong_shape_is_empty() {
        let storage = MemoryStorage::with_value(KEY, r#"{"id": 1}"#);
        let store = SelectionStore::open(Box::new(storage), KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn restore_with_read_failure_is_empty() {
        let store = SelectionStore::open(Box::new(UnreadableStorage), KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn restore_collapses_duplicate_ids() {
        let payload = serde_json::to_string(&vec![
            product(1, "First"),
            product(2, "B"),
            product(1, "Second"),
        ])
        .unwrap();
        let storage = MemoryStorage::with_value(KEY, &payload);
        let store = SelectionStore::open(Box::new(storage), KEY);
        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.list()[0].name, "First");
    }

    #[test]
    fn restore_discards_previous_in_memory_entries() {
        let storage = Arc::new(MemoryStorage::with_value(KEY, "[]"));
        let mut store = SelectionStore::new(Box::new(Arc::clone(&storage)), KEY);
        store.entries.push(product(9, "Unsaved"));
        store.restore();
        assert!(store.is_empty());
    }

    #[test]
    fn write_failure_keeps_selection_in_memory() {
        let mut store = SelectionStore::open(Box::new(FullStorage), KEY);
        assert!(store.add(product(1, "A")));
        assert!(store.add(product(2, "B")));
        assert_eq!(ids(&store), vec![1, 2]);
        assert!(store.remove("1"));
        assert_eq!(ids(&store), vec![2]);
    }

    #[test]
    fn snapshot_is_detached_from_later_mutations() {
        let (mut store, _) = memory_store();
        store.add(product(1, "A"));
        let snapshot = store.snapshot();
        store.add(product(2, "B"));
        store.remove(1i64);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, ProductId(1));
    }

    #[test]
    fn contains_normalizes_ids() {
        let (mut store, _) = memory_store();
        store.add(product(12, "L"));
        assert!(store.contains(12i64));
        assert!(store.contains("12"));
        assert!(store.contains(" 12 "));
        assert!(!store.contains("13"));
        assert!(!store.contains("twelve"));
    }
}
