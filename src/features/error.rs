use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Malformed rational in {tag}: {num}/{denom}")]
    MalformedRational {
        tag: &'static str,
        num: u32,
        denom: u32,
    },

    #[error("Field {tag} does not hold the expected value: {reason}")]
    MalformedField { tag: &'static str, reason: String },

    #[error("Unreadable EXIF block: {0}")]
    Exif(#[from] exif::Error),
}

#[derive(Error, Debug)]
pub enum ElevationError {
    #[error("Elevation API error: {0}")]
    Api(String),

    #[error("Elevation request timed out")]
    Timeout,

    #[error("Transport error during elevation request")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ElevationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Api("malformed response".to_string())
        } else if let Some(status) = error.status() {
            Self::Api(format!("HTTP {status}"))
        } else {
            Self::Transport(error)
        }
    }
}
