//! Content handlers.
//!
//! A handler turns one routed request into one complete response written to
//! the connection, or fails with an [`HttpError`] before anything is written.
//! The set of handlers is closed: a vhost picks one through the `handler` tag
//! of its configuration, and [`Handler::for_vhost`] builds it for each request.

pub mod file;
pub mod text;

use tokio::io::AsyncWrite;

use crate::config::{HandlerConfig, VhostConfig};
use crate::http::error::HttpError;
use crate::http::request::{Request, Target};

pub use file::FileHandler;
pub use text::TextHandler;

/// One handler instance, borrowing its settings from the vhost.
#[derive(Debug)]
pub enum Handler<'a> {
    File(FileHandler<'a>),
    Text(TextHandler<'a>),
}

impl<'a> Handler<'a> {
    pub fn for_vhost(vhost: &'a VhostConfig) -> Self {
        match &vhost.handler {
            HandlerConfig::File { root } => Handler::File(FileHandler::new(root)),
            HandlerConfig::Text { body, content_type } => {
                Handler::Text(TextHandler::new(body, content_type))
            }
        }
    }

    pub async fn handle<W>(&self, req: &Request, target: &Target, out: &mut W) -> Result<(), HttpError>
    where
        W: AsyncWrite + Unpin,
    {
        match self {
            Handler::File(h) => h.handle(req, target, out).await,
            Handler::Text(h) => h.handle(req, out).await,
        }
    }
}
