// Crate root library declaration and module exports.
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod executor;
pub mod model;
pub mod printer;
pub mod render;
pub mod scheduler;
