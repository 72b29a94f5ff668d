//! Fotogate API Library
//!
//! This crate provides the HTTP API handlers, auth middleware, and
//! application setup.

mod api_doc;
mod handlers;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
