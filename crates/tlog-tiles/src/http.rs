//! HTTP tile storage

use std::pin::Pin;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::layout::{TileId, CHECKPOINT_PATH};
use crate::{Error, Result, TileFetcher};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A tiled log served over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTiles {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpTiles {
    /// Read tiles below `base_url` with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            client: build_client(DEFAULT_TIMEOUT)?,
        })
    }

    /// Use a different per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    /// Use a preconfigured client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of a slash-separated log path
    pub fn url_for(&self, relative: &str) -> Result<Url> {
        self.base_url
            .join(relative)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", relative, e)))
    }

    async fn get(&self, relative: &str) -> Result<Vec<u8>> {
        let url = self.url_for(relative)?;
        debug!(%url, "fetching");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(Error::NotFound(url.to_string())),
            status => {
                return Err(Error::Http(format!("{} returned status {}", url, status)));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("failed to read {}: {}", url, e)))?;
        Ok(body.to_vec())
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Http(e.to_string()))
}

impl TileFetcher for HttpTiles {
    fn read_checkpoint(
        &self,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<u8>>> + Send + '_>> {
        Box::pin(async move { self.get(CHECKPOINT_PATH).await })
    }

    fn read_tile(
        &self,
        tile: TileId,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<u8>>> + Send + '_>> {
        Box::pin(async move { self.get(&tile.path()).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let tiles = HttpTiles::new("https://log.example/prefix").unwrap();
        assert_eq!(
            tiles.url_for(&TileId::full(0, 1234067).path()).unwrap().as_str(),
            "https://log.example/prefix/tile/0/x001/x234/067"
        );
        assert_eq!(
            tiles.url_for(CHECKPOINT_PATH).unwrap().as_str(),
            "https://log.example/prefix/checkpoint"
        );
    }

    #[test]
    fn test_url_with_trailing_slash() {
        let tiles = HttpTiles::new("https://log.example/").unwrap();
        assert_eq!(tiles.base_url().as_str(), "https://log.example/");
        assert_eq!(
            tiles.url_for("checkpoint").unwrap().as_str(),
            "https://log.example/checkpoint"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpTiles::new("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_with_timeout() {
        let tiles = HttpTiles::new("https://log.example/")
            .unwrap()
            .with_timeout(Duration::from_secs(1))
            .unwrap();
        assert_eq!(tiles.base_url().as_str(), "https://log.example/");
    }
}
