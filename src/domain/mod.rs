// Domain layer - Telemetry aggregation and chart-safety pipeline
pub mod bucketing;
pub mod energy;
pub mod normalizer;
pub mod pipeline;
pub mod plant;
pub mod resolution;
pub mod sanitize;
pub mod telemetry;
pub mod units;
pub mod validation;
