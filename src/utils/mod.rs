// src/utils/mod.rs

pub mod fetch;
