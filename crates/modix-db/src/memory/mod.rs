//! In-process persistence for hosts that run without a database

mod store;

pub use store::InMemoryPromotionStore;
