// Exchange profiles and market status
pub mod market;

// Model input schema
pub mod ml;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;

// Price and prediction types
pub mod trading;

// Domain-specific error types
pub mod errors;
