// Library exports for the binary and for embedding
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod constants;
pub mod dom;
pub mod error;
pub mod notify;
pub mod page;
pub mod types;
