use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{url} is not valid UTF-8")]
    Decode { url: String },
}

/// Where dataset urls resolve: an HTTP origin or a local directory.
#[derive(Debug, Clone)]
pub enum DataSource {
    Http { base: String, client: reqwest::Client },
    Dir(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` roots fetch over the network, anything else is
    /// a directory.
    pub fn from_root(root: &str) -> Self {
        if root.starts_with("http://") || root.starts_with("https://") {
            DataSource::Http {
                base: root.trim_end_matches('/').to_string(),
                client: reqwest::Client::new(),
            }
        } else {
            DataSource::Dir(PathBuf::from(root))
        }
    }

    /// Absolute urls pass through; relative ones join the root.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match self {
            DataSource::Http { base, .. } => format!("{base}/{}", url.trim_start_matches('/')),
            DataSource::Dir(dir) => dir
                .join(url.trim_start_matches('/'))
                .to_string_lossy()
                .into_owned(),
        }
    }

    /// Fetches a text resource. No retries: a failure is final for that
    /// dataset.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let resolved = self.resolve(url);
        debug!(url = %resolved, "fetch");
        let is_remote = resolved.starts_with("http://") || resolved.starts_with("https://");
        match self {
            DataSource::Http { client, .. } if is_remote => {
                fetch_http(client, &resolved).await
            }
            DataSource::Dir(_) if is_remote => fetch_http(&reqwest::Client::new(), &resolved).await,
            _ => {
                let bytes = tokio::fs::read(&resolved)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: resolved.clone(),
                        source,
                    })?;
                String::from_utf8(bytes).map_err(|_| FetchError::Decode { url: resolved })
            }
        }
    }
}

async fn fetch_http(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await.map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = resp.bytes().await.map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })?;
    String::from_utf8(bytes.to_vec()).map_err(|_| FetchError::Decode {
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{DataSource, FetchError};

    #[test]
    fn resolves_against_http_base() {
        let src = DataSource::from_root("http://localhost:5173/");
        assert_eq!(
            src.resolve("/data/forestclipped.asc"),
            "http://localhost:5173/data/forestclipped.asc"
        );
        assert_eq!(src.resolve("https://x.org/a.asc"), "https://x.org/a.asc");
    }

    #[test]
    fn resolves_against_directory() {
        let src = DataSource::from_root("/srv/site");
        assert_eq!(src.resolve("/data/a.asc"), "/srv/site/data/a.asc");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = DataSource::from_root(&dir.path().to_string_lossy());
        let err = src.fetch_text("/nope.asc").await.expect_err("missing");
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn reads_local_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.txt"), "hello").expect("write");
        let src = DataSource::from_root(&dir.path().to_string_lossy());
        assert_eq!(src.fetch_text("a.txt").await.expect("read"), "hello");
    }
}
