use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, ReadHalf, WriteHalf};

use crate::config::{Config, DEFAULT_VHOST};
use crate::handler::Handler;
use crate::http::error::{Failure, HttpError, ReadError};
use crate::http::parser::read_request;
use crate::http::request::{Method, Request, Version};
use crate::http::response::StatusCode;
use crate::http::writer::{DEFAULT_CONTENT_TYPE, send_simple_response};

/// One accepted connection and the request/response loop running on it.
pub struct Connection<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: BufWriter<WriteHalf<S>>,
    config: Arc<Config>,
    /// Most recent successfully parsed request; sources the version of an
    /// error response and the persistence decision.
    request: Option<Request>,
    state: ConnectionState,
}

#[derive(Debug)]
pub enum ConnectionState {
    AwaitRequest,
    Processing,
    Responded,
    Failed(Failure),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite,
{
    pub fn new(stream: S, config: Arc<Config>) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            config,
            request: None,
            state: ConnectionState::AwaitRequest,
        }
    }

    /// Serves requests until the client leaves or persistence ends.
    ///
    /// Returns an error only for I/O failures on the connection itself;
    /// protocol and handler failures are answered in-band.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::AwaitRequest => {
                    self.request = None;
                    let max_line = self.config.server.max_line_length;

                    self.state = match read_request(&mut self.reader, max_line).await {
                        Ok(Some(req)) => {
                            tracing::debug!(
                                method = %req.method,
                                target = %req.target,
                                version = %req.version,
                                "Request received"
                            );
                            self.request = Some(req);
                            ConnectionState::Processing
                        }
                        Ok(None) => {
                            tracing::debug!("Client closed connection");
                            ConnectionState::Closed
                        }
                        Err(ReadError::Malformed(e)) => ConnectionState::Failed(e.into()),
                        Err(ReadError::Io(e)) => return Err(e.into()),
                    };
                }

                ConnectionState::Processing => {
                    let Some(req) = self.request.as_ref() else {
                        self.state = ConnectionState::Closed;
                        continue;
                    };

                    self.state = match process(req, &self.config, &mut self.writer).await {
                        Ok(()) => ConnectionState::Responded,
                        Err(HttpError::Interrupted(e)) => {
                            tracing::warn!(
                                method = %req.method,
                                target = %req.target,
                                error = %e,
                                "Response interrupted, closing connection"
                            );
                            return Err(e.into());
                        }
                        Err(e) => ConnectionState::Failed(e.into()),
                    };
                }

                ConnectionState::Failed(failure) => {
                    let status = failure_status(&failure);
                    let version = self
                        .request
                        .as_ref()
                        .map_or(Version::HTTP_1_0, |req| req.version);

                    tracing::info!(status = status.as_u16(), error = %failure, "Request failed");

                    send_simple_response(
                        &mut self.writer,
                        status,
                        failure.to_string().as_bytes(),
                        version,
                        DEFAULT_CONTENT_TYPE,
                    )
                    .await?;

                    self.state = ConnectionState::Responded;
                }

                ConnectionState::Responded => {
                    self.writer.flush().await?;

                    let keep_alive = self.request.as_ref().is_some_and(Request::keep_alive);
                    tracing::debug!(keep_alive, "Exchange complete");

                    self.state = if keep_alive {
                        ConnectionState::AwaitRequest
                    } else {
                        ConnectionState::Closed
                    };
                }

                ConnectionState::Closed => break,
            }
        }

        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!(error = %e, "Shutdown after close failed");
        }

        Ok(())
    }
}

/// Validates and routes one request, then lets the vhost's handler write the
/// response.
async fn process<W>(req: &Request, config: &Config, out: &mut W) -> Result<(), HttpError>
where
    W: AsyncWrite + Unpin,
{
    if req.method != Method::GET {
        return Err(HttpError::NotImplemented(format!(
            "Method {} is not implemented",
            req.method
        )));
    }

    let host = match req.host() {
        Some(host) => host,
        None if req.version.is_legacy() => DEFAULT_VHOST,
        None => return Err(HttpError::BadRequest("Host header absent".to_string())),
    };

    let vhost = config.vhosts.resolve(host);
    let target = req.split_target();
    tracing::debug!(host, vhost = %vhost.name, uri = %target.uri, "Routing request");

    Handler::for_vhost(vhost).handle(req, &target, out).await
}

/// The one place failures become status codes.
pub fn failure_status(failure: &Failure) -> StatusCode {
    match failure {
        Failure::Parse(_) => StatusCode::BadRequest,
        Failure::Http(e) => match e {
            HttpError::BadRequest(_) => StatusCode::BadRequest,
            HttpError::Forbidden(_) => StatusCode::Forbidden,
            HttpError::NotFound(_) => StatusCode::NotFound,
            HttpError::NotImplemented(_) => StatusCode::NotImplemented,
            HttpError::Internal(_) | HttpError::Io(_) | HttpError::Interrupted(_) => {
                StatusCode::InternalServerError
            }
        },
    }
}
