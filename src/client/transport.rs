use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use crate::error::ClientError;
use crate::model::{SearchQuery, SearchResponse};
use crate::providers::http_client;
use crate::query::to_query_pairs;

/// Carries a query to a search endpoint
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn fetch(&self, query: &SearchQuery) -> Result<SearchResponse, ClientError>;
}

/// Calls `GET {base_url}/search` over HTTP
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        HttpTransport {
            client: http_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn fetch(&self, query: &SearchQuery) -> Result<SearchResponse, ClientError> {
        let url = format!("{}/search", self.base_url);
        debug!("GET {} for page {}", url, query.page);

        let response = self
            .client
            .get(&url)
            .query(&to_query_pairs(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::StatusError(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::DecodeError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_http_transport_decodes_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "pasta".into()),
                Matcher::UrlEncoded("pageSize".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "results": [{"id": "1", "title": "Pasta A", "source": "local"}],
                    "total": 1,
                    "source": "all"
                }"#,
            )
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url(), Duration::from_secs(5));
        let query = SearchQuery {
            text: Some("pasta".to_string()),
            ..Default::default()
        };
        let response = transport.fetch(&query).await.unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.results[0].title, "Pasta A");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_transport_reports_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url(), Duration::from_secs(5));
        let err = transport.fetch(&SearchQuery::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::StatusError(500)));
    }

    #[tokio::test]
    async fn test_http_transport_reports_decode_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url(), Duration::from_secs(5));
        let err = transport.fetch(&SearchQuery::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::DecodeError(_)));
    }
}
