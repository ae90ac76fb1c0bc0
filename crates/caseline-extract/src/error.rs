pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing credential: {name} is not set")]
    MissingCredential { name: &'static str },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service error: {message}")]
    Api { message: String },

    #[error("malformed service response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("extraction returned an empty completion")]
    EmptyCompletion,
}
