pub mod agent;
pub mod json_pipeline;
pub mod runner;

pub use json_pipeline::JsonProcessor;
