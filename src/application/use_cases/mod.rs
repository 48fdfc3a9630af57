pub mod analysis_session;
pub mod correlation;
pub mod distribution;
pub mod ranking;
pub mod statistics;
pub mod temporal;
pub mod time_series;
pub mod type_inference;
