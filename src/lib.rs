pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod math;
pub mod viewer;
pub mod window;

pub use error::{Error, Result};
