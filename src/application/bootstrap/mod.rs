//! Wiring of configured adapters into the prediction service.

pub mod persistence;
pub mod services;

pub use persistence::{PersistenceBootstrap, PersistenceHandle};
pub use services::ServicesBootstrap;
