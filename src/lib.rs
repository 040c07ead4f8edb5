pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod regions;
pub mod series;
pub mod sink;
