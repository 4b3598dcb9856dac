//! Contratos externos (persistencia y almacenamiento de objetos) y sus
//! implementaciones en memoria.

mod store;
mod types;

pub use store::{InMemoryObjectStorage, InMemorySpaceGateway, ObjectStorage, PersistenceGateway};
pub use types::{GatewayError, PublicUrl, SpaceOrder};
