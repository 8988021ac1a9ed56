//! Veriframe Core Library
//!
//! Configuration, logging and pipeline assembly for the `veriframe` binary.

pub mod colored_logger;
pub mod config;
pub mod pipeline;
