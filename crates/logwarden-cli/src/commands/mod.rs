//! CLI command implementations.

pub mod db;
pub mod keys;
pub mod logs;
pub mod token;
