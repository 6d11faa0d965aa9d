pub mod constants;
pub mod editor;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod library;
pub mod model;
pub mod normalizer;
pub mod server_protocol;
pub mod server_utils;
pub mod tactic_file;
pub mod types;
