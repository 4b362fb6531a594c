// Selection state: the authoritative set of chosen products and its
// durable mirror.

pub mod storage;
pub mod store;

pub use storage::{MemoryStorage, SelectionStorage};
pub use store::{SelectionStore, Toggle};
