//! Core lochat library (backend stream pipeline, session engine, config).

pub mod backend;
pub mod config;
pub mod core;
