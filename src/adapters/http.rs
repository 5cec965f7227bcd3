use crate::domain::ports::PageFetcher;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// reqwest-backed carrier page fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn returns_the_response_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/waybill");
            then.status(200).body("<html>Beklemede</html>");
        });

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher.get_text(&server.url("/waybill")).await.unwrap();

        mock.assert();
        assert_eq!(body, "<html>Beklemede</html>");
    }

    #[tokio::test]
    async fn http_error_status_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/waybill");
            then.status(500);
        });

        let fetcher = HttpFetcher::new().unwrap();
        assert!(fetcher.get_text(&server.url("/waybill")).await.is_err());
    }
}
