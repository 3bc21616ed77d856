use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("No user is logged in")]
    NotLoggedIn,

    #[error("Browser error: {0}")]
    Browser(String),
}

impl AppError {
    /// Wrap a JS exception value coming back from a web API call.
    pub fn browser(value: wasm_bindgen::JsValue) -> Self {
        AppError::Browser(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
