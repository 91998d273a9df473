pub mod store;
pub mod sled_store;
pub mod factory;

pub use store::*;
pub use sled_store::SledRepository;
pub use factory::{create_in_memory_repository, create_repository};
