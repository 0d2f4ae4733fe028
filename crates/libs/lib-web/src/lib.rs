//! # Web Library
//!
//! HTTP handlers, middleware, the presence registry, the delivery channel,
//! external collaborators, and server setup.

pub mod handlers;
pub mod middleware;
pub mod presence;
pub mod server;
pub mod services;

pub use server::{start_server, AppState, ServerConfig};
