use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::TransportError;

/// Thin JSON-over-HTTP handle on the ledger service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    base_url: String,
    http: reqwest::Client,
}

impl LedgerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| TransportError::Request {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode a 2xx JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.url(path);
        debug!("GET {url}");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;
        decode(url, resp).await
    }

    /// POST a JSON body to `path` and decode a 2xx JSON body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.post(path, body).await?;
        decode(self.url(path), resp).await
    }

    /// POST a JSON body and hand back the raw response, whatever its status.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, TransportError> {
        let url = self.url(path);
        debug!("POST {url}");
        self.http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| TransportError::Request { url, source })
    }
}

async fn decode<T: DeserializeOwned>(
    url: String,
    resp: reqwest::Response,
) -> Result<T, TransportError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(TransportError::Status { url, status });
    }
    let body = match resp.text().await {
        Ok(body) => body,
        Err(source) => return Err(TransportError::Request { url, source }),
    };
    serde_json::from_str(&body).map_err(|e| TransportError::Malformed {
        url,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slash() {
        let client = LedgerClient::new("http://ledger.local:5000/", Duration::from_secs(1))
            .expect("client");
        assert_eq!(client.base_url(), "http://ledger.local:5000");
        assert_eq!(client.url("/chain"), "http://ledger.local:5000/chain");
    }
}
