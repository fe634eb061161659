//! Scripted match replay for the darts scorekeeper.

pub mod config;
pub mod logging;
pub mod runner;
pub mod summary;
