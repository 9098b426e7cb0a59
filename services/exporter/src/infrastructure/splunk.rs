// Splunk REST API module
pub mod client;
pub mod results_reader;

pub use client::SplunkClient;
pub use results_reader::ResultsReader;
