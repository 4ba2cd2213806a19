//! vhostd - a small virtual-hosting HTTP/1.x server
//!
//! Core library: request parsing, response writing, vhost resolution,
//! content handlers and the per-connection dispatch loop.

pub mod config;
pub mod handler;
pub mod http;
pub mod server;
