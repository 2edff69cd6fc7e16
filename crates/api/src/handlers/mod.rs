pub mod commands;
pub mod operations;
