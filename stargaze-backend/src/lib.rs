///! Stargaze backend - constellation visibility and content service
pub mod config;
pub mod error;
pub mod logging;
pub mod module;
pub mod service;
