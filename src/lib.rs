pub mod app;
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod render;
