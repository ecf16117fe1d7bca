// Adapter wiring from configuration
pub mod bootstrap;

// Feature table construction
pub mod feature_engineering_service;

// Exchange open/closed verdicts
pub mod market_status;

// Model training and prediction
pub mod ml;

// Request orchestration
pub mod prediction_service;
