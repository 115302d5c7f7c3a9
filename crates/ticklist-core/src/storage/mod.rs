mod collection_store;

pub use collection_store::{CollectionStore, InMemoryStore, StoreError};
