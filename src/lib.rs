// src/lib.rs

pub mod config;
pub mod error;
pub mod extractor;
pub mod handlers;
pub mod leaderboard;
pub mod models;
pub mod routes;
pub mod scoring;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export specific items for convenience if needed
pub use routes::create_router;
