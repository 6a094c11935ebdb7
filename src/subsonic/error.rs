use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubsonicError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("server error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("response has no {0}")]
    MissingPayload(&'static str),
}
