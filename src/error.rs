use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("relay channel error: {0}")]
    Transport(#[from] rust_socketio::Error),

    #[error("{endpoint} request failed: {source}")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    HttpStatus {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("{endpoint} returned status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Upstream {
        endpoint: &'static str,
        status: String,
        message: Option<String>,
    },

    #[error("malformed {endpoint} response: {source}")]
    MalformedResponse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no route found")]
    NoRoute,

    #[error("place has no geometry")]
    MissingGeometry,

    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    #[error("failed to load track: {0}")]
    Track(#[from] csv::Error),

    #[error("track contains no positions")]
    EmptyTrack,

    #[error("report interval must be at least one second")]
    InvalidInterval,
}

pub type Result<T> = std::result::Result<T, Error>;
