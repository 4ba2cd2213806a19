//! Serves regular files below a vhost's document root.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWrite;

use crate::http::error::HttpError;
use crate::http::mime::content_type_for;
use crate::http::request::{Request, Target};
use crate::http::response::{ResponseBuilder, StatusCode};
use crate::http::writer::send_response;

#[derive(Debug, Clone, Copy)]
pub struct FileHandler<'a> {
    root: &'a Path,
}

impl<'a> FileHandler<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    /// Maps a request path onto the filesystem.
    ///
    /// Normalization is lexical: `.` and empty segments are dropped and `..`
    /// removes the previous segment. A path that would climb above the root
    /// is refused. Symlinks inside the root are followed as-is.
    pub fn resolve(&self, uri: &str) -> Result<PathBuf, HttpError> {
        let mut segments: Vec<&str> = Vec::new();

        for segment in uri.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(HttpError::Forbidden(
                            "Path escapes the document root".to_string(),
                        ));
                    }
                }
                s => segments.push(s),
            }
        }

        let mut path = self.root.to_path_buf();
        path.extend(segments);
        Ok(path)
    }

    pub async fn handle<W>(&self, req: &Request, target: &Target, out: &mut W) -> Result<(), HttpError>
    where
        W: AsyncWrite + Unpin,
    {
        let path = self.resolve(&target.uri)?;

        let size = match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => return Err(HttpError::NotFound("File doesn't exist".to_string())),
        };

        let file = match File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(HttpError::Forbidden("Permissions denied".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let content_type = content_type_for(&path);
        tracing::debug!(path = %path.display(), size, content_type, "Serving file");

        let response = ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .stream(file, size)
            .build();

        // From here on the client has seen a 200; failures can only cut the
        // response short.
        send_response(out, response, req.version)
            .await
            .map_err(HttpError::Interrupted)?;

        tracing::trace!(path = %path.display(), size, "File sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_normalizes_inside_root() {
        let handler = FileHandler::new(Path::new("/srv/www"));

        assert_eq!(
            handler.resolve("/a/./b//c.txt").unwrap(),
            PathBuf::from("/srv/www/a/b/c.txt")
        );
        assert_eq!(
            handler.resolve("/a/../index.html").unwrap(),
            PathBuf::from("/srv/www/index.html")
        );
        assert_eq!(handler.resolve("/").unwrap(), PathBuf::from("/srv/www"));
    }

    #[test]
    fn resolve_refuses_traversal() {
        let handler = FileHandler::new(Path::new("/srv/www"));

        assert!(matches!(
            handler.resolve("/../etc/passwd"),
            Err(HttpError::Forbidden(_))
        ));
        assert!(matches!(
            handler.resolve("/a/../../secret"),
            Err(HttpError::Forbidden(_))
        ));
    }
}
