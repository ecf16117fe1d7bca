pub mod trend_predictor;
