pub mod conclusions;
pub mod dataset;
pub mod errors;
pub mod export;
pub mod filter;
mod information;
pub mod input;
pub mod output;
pub mod sampling;
pub mod sentiment;
pub mod session;
pub mod summary;
pub mod words;
