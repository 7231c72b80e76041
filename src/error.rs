use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while deriving, fetching or assembling a region.
///
/// `InvalidArgument`, `UnsupportedSource` and `EmptyRegion` are raised before
/// any network or disk activity. `DownloadFailed` and `DecodeFailed` only ever
/// describe a single tile slot; a region download carries on past them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported map source `{0}`")]
    UnsupportedSource(String),

    #[error("failed downloading tile from {url}")]
    DownloadFailed { url: String },

    #[error("failed decoding tile #{index}: {reason}")]
    DecodeFailed { index: usize, reason: String },

    #[error("region spans {tiles_wide}x{tiles_high} tiles, expected a north-west and a south-east corner")]
    EmptyRegion { tiles_wide: i64, tiles_high: i64 },

    /// A single failed HTTP attempt.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_mentions_dimensions() {
        let msg = Error::EmptyRegion {
            tiles_wide: 0,
            tiles_high: -3,
        }
        .to_string();
        assert!(msg.contains("0x-3"));
    }

    #[test]
    fn io_error_mentions_path() {
        let err = Error::io(
            "cache/1_2_out.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("cache/1_2_out.png"));
    }
}
