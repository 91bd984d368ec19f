pub mod config;
pub mod csv_io;
pub mod errors;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod resolution;
pub mod submit;
pub mod types;
