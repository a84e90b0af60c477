//! Avatar API
//!
//! HTTP service that accepts multipart avatar uploads, keeps the files whose declared
//! type is an allowed image type, and stores them on the backend selected at startup.

pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
