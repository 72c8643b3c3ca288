#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Sheet request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("No sheet URL configured for {0}")]
    MissingUrl(&'static str),
}
