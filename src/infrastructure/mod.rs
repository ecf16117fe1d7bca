pub mod core;
pub mod csv_source;
pub mod mock;
pub mod persistence;
pub mod repositories;
pub mod yahoo;

pub use csv_source::CsvMarketDataService;
pub use mock::MockMarketDataService;
pub use repositories::InMemoryPredictionRepository;
pub use yahoo::YahooMarketDataService;
