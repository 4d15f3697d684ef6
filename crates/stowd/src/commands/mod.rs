pub mod bench;
pub mod config;
pub mod import;
pub mod plan;
pub mod serve;
