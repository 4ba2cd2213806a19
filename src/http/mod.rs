//! HTTP/1.0 and HTTP/1.1 protocol engine.
//!
//! # Architecture
//!
//! - **`grammar`**: RFC 7230 character classes for tokens, targets and field values
//! - **`parser`**: Reads a request head line by line from a buffered stream
//! - **`request`**: Request representation, target splitting and persistence rules
//! - **`response`**: Status codes and the response intent with its builder
//! - **`writer`**: Serializes status lines, headers and bodies onto a stream
//! - **`error`**: Request-scoped failure kinds
//! - **`connection`**: The per-connection dispatch loop
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌────────────────┐
//!        │  AwaitRequest  │ ← Read the next request head
//!        └──────┬─────────┘
//!               │ Request parsed        (end of stream → Closed)
//!               │                       (parse error   → Failed)
//!               ▼
//!        ┌────────────────┐
//!        │   Processing   │ ← Validate, resolve vhost, run handler
//!        └──────┬─────────┘
//!               │ Handler wrote the response   (failure → Failed)
//!               ▼
//!        ┌────────────────┐        ┌────────────────┐
//!        │   Responded    │ ◄───── │     Failed     │ ← Write error response
//!        └──────┬─────────┘        └────────────────┘
//!               ├─ HTTP/1.1 without `Connection: close` → AwaitRequest
//!               └─ otherwise → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vhostd::config::Config;
//! use vhostd::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::default());
//!     let listener = TcpListener::bind("127.0.0.1:9999").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let config = config.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, config);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod error;
pub mod grammar;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
