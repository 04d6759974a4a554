use crate::domain::model::{EndpointConfig, FetchOutcome, FetchReport};
use crate::domain::ports::Storage;
use crate::utils::error::{CatalogError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// API key sent with every request as a query parameter.
#[derive(Clone)]
pub struct ApiKey {
    pub param: String,
    pub value: String,
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("param", &self.param)
            .field("value", &"***")
            .finish()
    }
}

/// Issues one GET per endpoint and stores each decoded body.
pub struct Fetcher<S: Storage> {
    storage: S,
    client: Client,
    api_key: Option<ApiKey>,
}

impl<S: Storage> Fetcher<S> {
    pub fn new(storage: S, timeout: Duration, api_key: Option<ApiKey>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("catalog-sheets/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::ConfigValidationError {
                field: "fetch".to_string(),
                message: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            storage,
            client,
            api_key,
        })
    }

    /// Fetches `endpoint` and writes its body to `endpoint.file_name`.
    /// Returns the number of bytes stored.
    pub async fn fetch_endpoint(&self, endpoint: &EndpointConfig) -> Result<usize> {
        let response_kind = endpoint.kind;
        let mut query = endpoint.query_pairs();
        if let Some(key) = &self.api_key {
            query.retain(|(name, _)| name != &key.param);
            query.push((key.param.clone(), key.value.clone()));
        }

        tracing::debug!(
            "{}: GET {} ({} query parameters)",
            response_kind,
            endpoint.url,
            query.len()
        );

        let response = self
            .client
            .get(&endpoint.url)
            .query(&query)
            .send()
            .await
            .map_err(|source| CatalogError::Http {
                response: response_kind,
                source,
            })?;

        let status = response.status();
        tracing::debug!("{}: API response status: {}", response_kind, status);

        if status != StatusCode::OK {
            return Err(CatalogError::HttpStatus {
                response: response_kind,
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| CatalogError::Http {
            response: response_kind,
            source,
        })?;

        let document: serde_json::Value =
            serde_json::from_slice(&body).map_err(|source| CatalogError::InvalidJson {
                response: response_kind,
                source,
            })?;

        let data = serde_json::to_vec(&document)?;
        self.storage.write_file(&endpoint.file_name, &data).await?;

        tracing::debug!(
            "{}: wrote {} bytes to {}",
            response_kind,
            data.len(),
            endpoint.file_name
        );
        Ok(data.len())
    }

    /// Fetches every endpoint in order. A failing endpoint is recorded in the
    /// report and does not stop the ones after it.
    pub async fn fetch_all(&self, endpoints: &[EndpointConfig]) -> FetchReport {
        let mut report = FetchReport::default();

        for endpoint in endpoints {
            let result = self.fetch_endpoint(endpoint).await;
            match &result {
                Ok(bytes) => tracing::info!(
                    "✅ {}: saved {} ({} bytes)",
                    endpoint.kind,
                    endpoint.file_name,
                    bytes
                ),
                Err(e) => tracing::error!("❌ {}: fetch failed: {}", endpoint.kind, e),
            }
            report.outcomes.push(FetchOutcome {
                kind: endpoint.kind,
                file_name: endpoint.file_name.clone(),
                result,
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ResponseKind;
    use httpmock::prelude::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CatalogError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn endpoint(kind: ResponseKind, url: String, file_name: &str) -> EndpointConfig {
        let mut parameters = BTreeMap::new();
        parameters.insert("format".to_string(), toml::Value::String("json".to_string()));
        EndpointConfig {
            kind,
            url,
            file_name: file_name.to_string(),
            parameters,
        }
    }

    fn fetcher(storage: MockStorage) -> Fetcher<MockStorage> {
        let key = ApiKey {
            param: "apiKey".to_string(),
            value: "secret".to_string(),
        };
        Fetcher::new(storage, Duration::from_secs(5), Some(key)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_parameters_and_stores_body() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/taxonomy")
                .query_param("format", "json")
                .query_param("apiKey", "secret");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"categories": [{"id": "0", "name": "Root"}]}));
        });

        let storage = MockStorage::new();
        let fetcher = fetcher(storage.clone());
        let taxonomy = endpoint(ResponseKind::Taxonomy, server.url("/v1/taxonomy"), "taxonomy.txt");

        let written = fetcher.fetch_endpoint(&taxonomy).await.unwrap();

        api_mock.assert();
        let stored = storage.get_file("taxonomy.txt").await.unwrap();
        assert_eq!(stored.len(), written);
        let value: serde_json::Value = serde_json::from_slice(&stored).unwrap();
        assert_eq!(value["categories"][0]["name"], "Root");
    }

    #[tokio::test]
    async fn test_non_ok_status_is_fatal_for_endpoint() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v1/search");
            then.status(403);
        });

        let storage = MockStorage::new();
        let fetcher = fetcher(storage.clone());
        let search = endpoint(ResponseKind::Search, server.url("/v1/search"), "search.txt");

        let err = fetcher.fetch_endpoint(&search).await.unwrap_err();

        api_mock.assert();
        assert!(matches!(
            err,
            CatalogError::HttpStatus {
                response: ResponseKind::Search,
                status,
            } if status == StatusCode::FORBIDDEN
        ));
        assert!(storage.get_file("search.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_fatal_for_endpoint() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/items/46784935");
            then.status(200).body("<html>maintenance</html>");
        });

        let storage = MockStorage::new();
        let fetcher = fetcher(storage.clone());
        let lookup = endpoint(
            ResponseKind::ProductLookup,
            server.url("/v1/items/46784935"),
            "productLookup.txt",
        );

        let err = fetcher.fetch_endpoint(&lookup).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidJson {
                response: ResponseKind::ProductLookup,
                ..
            }
        ));
        assert!(storage.get_file("productLookup.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_all_continues_after_failure() {
        let server = MockServer::start();
        let failing = server.mock(|when, then| {
            when.method(GET).path("/v1/search");
            then.status(500);
        });
        let working = server.mock(|when, then| {
            when.method(GET).path("/v1/taxonomy");
            then.status(200).json_body(serde_json::json!({"categories": []}));
        });

        let storage = MockStorage::new();
        let fetcher = fetcher(storage.clone());
        let endpoints = vec![
            endpoint(ResponseKind::Search, server.url("/v1/search"), "search.txt"),
            endpoint(ResponseKind::Taxonomy, server.url("/v1/taxonomy"), "taxonomy.txt"),
        ];

        let report = fetcher.fetch_all(&endpoints).await;

        failing.assert();
        working.assert();
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert!(report.outcomes[0].result.is_err());
        assert!(report.outcomes[1].result.is_ok());
        assert!(storage.get_file("taxonomy.txt").await.is_some());
    }

    #[test]
    fn test_api_key_is_not_printed() {
        let key = ApiKey {
            param: "apiKey".to_string(),
            value: "super-secret".to_string(),
        };
        assert!(!format!("{:?}", key).contains("super-secret"));
    }
}
