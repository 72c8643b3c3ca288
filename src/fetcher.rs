use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::csv_parser::{self, RawRow};
use crate::fetch_error::FetchError;

/// Source of published sheet text. Injected so the engine never owns the transport.
#[async_trait]
pub trait SheetFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    async fn fetch_rows(&self, url: &str) -> Result<Vec<RawRow>, FetchError> {
        let text = self.fetch_text(url).await?;
        Ok(csv_parser::parse(&text))
    }
}

#[derive(Clone)]
pub struct HttpSheetFetcher {
    client: reqwest::Client,
}

impl HttpSheetFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpSheetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetFetcher for HttpSheetFetcher {
    #[instrument(skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("Sending HTTP request for sheet");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        debug!("Retrieved sheet content, size: {} bytes", text.len());
        Ok(text)
    }
}
