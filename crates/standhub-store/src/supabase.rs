//! Supabase (PostgREST) stand repository.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde_json::value::RawValue;
use tracing::{debug, warn};

use standhub_core::config::StoreConfig;
use standhub_core::error::{AppError, ErrorKind};
use standhub_core::result::AppResult;
use standhub_core::traits::StandRepository;
use standhub_core::types::{StandId, StandSnapshot};

/// Stand repository backed by a Supabase REST table.
#[derive(Debug, Clone)]
pub struct SupabaseStandRepository {
    client: Client,
    base_url: String,
    table: String,
    api_key: String,
}

impl SupabaseStandRepository {
    /// Create a repository from store configuration.
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn url_with(&self, params: &[(&str, String)]) -> AppResult<Url> {
        Url::parse_with_params(&self.table_url(), params)
            .map_err(|e| AppError::configuration(format!("Invalid store URL: {e}")))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }
}

fn transport_error(op: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(
        ErrorKind::ExternalService,
        format!("Supabase {op} request failed: {err}"),
        err,
    )
}

async fn status_error(op: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, op, "Supabase returned an error status");
    AppError::external(format!(
        "Supabase {op} returned status {}, body {body}",
        status.as_u16()
    ))
}

#[async_trait]
impl StandRepository for SupabaseStandRepository {
    async fn patch(&self, id: &StandId, update: &RawValue) -> AppResult<()> {
        let url = self.url_with(&[("id", format!("eq.{id}"))])?;

        let response = self
            .authorized(self.client.patch(url))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "resolution=merge-duplicates")
            .body(update.get().to_owned())
            .send()
            .await
            .map_err(|e| transport_error("patch", e))?;

        if !response.status().is_success() {
            return Err(status_error("patch", response).await);
        }

        debug!(stand_id = %id, "Stand patched in Supabase");
        Ok(())
    }

    async fn get_stands(&self) -> AppResult<StandSnapshot> {
        let url = self.url_with(&[("select", "*".to_string())])?;

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| transport_error("read", e))?;

        if response.status() != StatusCode::OK {
            return Err(status_error("read", response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error("read", e))?;

        StandSnapshot::from_bytes(&body)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode as HttpStatus};
    use axum::routing::get;

    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Recorded {
        query: HashMap<String, String>,
        apikey: Option<String>,
        bearer: Option<String>,
        prefer: Option<String>,
        body: String,
    }

    type Shared = Arc<Mutex<Vec<Recorded>>>;

    fn header(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    async fn stub(fail: bool) -> (String, Shared) {
        let recorded: Shared = Arc::default();

        let app = Router::new()
            .route(
                "/rest/v1/stands",
                get(move |Query(q): Query<HashMap<String, String>>| async move {
                    if fail {
                        return (HttpStatus::SERVICE_UNAVAILABLE, "down".to_string());
                    }
                    assert_eq!(q.get("select").map(String::as_str), Some("*"));
                    (HttpStatus::OK, r#"[{"id":"1","status":"free"}]"#.to_string())
                })
                .patch(
                    move |State(rec): State<Shared>,
                          Query(query): Query<HashMap<String, String>>,
                          headers: HeaderMap,
                          body: String| async move {
                        rec.lock().unwrap().push(Recorded {
                            query,
                            apikey: header(&headers, "apikey"),
                            bearer: header(&headers, "authorization"),
                            prefer: header(&headers, "prefer"),
                            body,
                        });
                        if fail {
                            (HttpStatus::BAD_REQUEST, "bad column")
                        } else {
                            (HttpStatus::NO_CONTENT, "")
                        }
                    },
                ),
            )
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), recorded)
    }

    fn repo(url: &str) -> SupabaseStandRepository {
        SupabaseStandRepository::new(&StoreConfig {
            url: url.to_string(),
            api_key: "secret".to_string(),
            ..StoreConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_stands_returns_body() {
        let (url, _) = stub(false).await;
        let snapshot = repo(&url).get_stands().await.unwrap();
        assert_eq!(snapshot.as_str(), r#"[{"id":"1","status":"free"}]"#);
    }

    #[tokio::test]
    async fn test_patch_sends_filter_and_headers() {
        let (url, recorded) = stub(false).await;
        let update = RawValue::from_string(r#"{"status":"occupied"}"#.to_string()).unwrap();
        let id: StandId = "A 1".parse().unwrap();

        repo(&url).patch(&id, &update).await.unwrap();

        let calls = recorded.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.query.get("id").map(String::as_str), Some("eq.A 1"));
        assert_eq!(call.apikey.as_deref(), Some("secret"));
        assert_eq!(call.bearer.as_deref(), Some("Bearer secret"));
        assert_eq!(call.prefer.as_deref(), Some("resolution=merge-duplicates"));
        assert_eq!(call.body, r#"{"status":"occupied"}"#);
    }

    #[tokio::test]
    async fn test_error_status_maps_to_external_service() {
        let (url, _) = stub(true).await;
        let repo = repo(&url);

        let err = repo.get_stands().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert!(err.message.contains("503"));

        let update = RawValue::from_string("{}".to_string()).unwrap();
        let err = repo
            .patch(&"1".parse().unwrap(), &update)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert!(err.message.contains("bad column"));
    }

    #[tokio::test]
    async fn test_unreachable_store() {
        let repo = repo("http://127.0.0.1:1");
        let err = repo.get_stands().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
    }
}
