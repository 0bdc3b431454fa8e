mod errors;
mod memory;
mod types;

pub use errors::StorageError;
pub use types::{FlowStorage, InMemoryFlowStorage};
