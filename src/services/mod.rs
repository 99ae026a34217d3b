pub mod dataset;
pub mod elasticsearch;
