pub mod cache;
pub mod stats;
pub mod utils;

pub mod batch;
pub mod sentiment;
