//! CLI functionality for the ESQL tool
//!
//! This module contains all CLI-related functionality including:
//! - Mapping file loading
//! - Select, filter, sort and map commands
//! - REPL
//! - Output formatting

pub mod filter;
pub mod map;
pub mod output;
pub mod repl;
pub mod select;
pub mod session;
pub mod sort;
