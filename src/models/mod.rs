// src/models/mod.rs

pub mod candidate;
pub mod report;
