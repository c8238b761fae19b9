///! Constellation catalog: durable store, fast tier, and the two-tier
///! read-through cache that fronts them

// ============ Durable Store ============
mod store;
pub use store::{CatalogStore, JsonCatalogStore, StoreError};

// ============ Fast Tier ============
mod tier;
pub use tier::{FastTier, RedisTier};
#[cfg(test)]
pub use tier::MemoryTier;

// ============ Two-Tier Manager ============
mod manager;
pub use manager::CatalogManager;
