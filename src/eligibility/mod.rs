pub mod config;
pub mod filter;
