use tokio::io::AsyncWrite;

use crate::http::error::HttpError;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::send_response;

/// Answers every request with a fixed body.
#[derive(Debug, Clone, Copy)]
pub struct TextHandler<'a> {
    body: &'a str,
    content_type: &'a str,
}

impl<'a> TextHandler<'a> {
    pub fn new(body: &'a str, content_type: &'a str) -> Self {
        Self { body, content_type }
    }

    pub async fn handle<W>(&self, req: &Request, out: &mut W) -> Result<(), HttpError>
    where
        W: AsyncWrite + Unpin,
    {
        let response = Response::ok(self.body.to_owned(), self.content_type);
        send_response(out, response, req.version)
            .await
            .map_err(HttpError::Interrupted)
    }
}
