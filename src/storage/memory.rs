use std::cell::{Cell, RefCell};

use crate::{
    models::store::Store,
    storage::{Storage, StorageError},
};

/// Keeps the last saved store in memory; used by service tests
#[derive(Default)]
pub struct MemoryStorage {
    saved: RefCell<Option<Store>>,
    saves: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Store, StorageError> {
        Ok(self.saved.borrow().clone().unwrap_or_default())
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        *self.saved.borrow_mut() = Some(store.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
