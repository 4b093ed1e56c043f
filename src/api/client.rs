//! Typed REST client for the backend - the single transport adapter.
//!
//! Constructed once at startup from the loaded config; the base URL and the
//! configured extra headers apply to every call. List endpoints answer with
//! a `{success, data}` envelope while single-entity endpoints sometimes
//! return a bare `{data}` object, so both shapes are tolerated.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::config::Config;
use crate::messages::api::{EntityDetail, EntityList};
use crate::models::{
    ApiRequest, BodyModel, Collection, HealthStatus, NewRequest, OpenApiSpec, ResourceKind,
};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    root_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(key.as_str()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            } else {
                tracing::warn!(header = %key, "Skipping malformed configured header");
            }
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        ApiClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            root_url: config.root_url(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    // ========================
    // Generic entity access
    // ========================

    pub async fn list_entities(&self, kind: ResourceKind) -> Result<EntityList, ApiError> {
        let path = kind.base_path();
        match kind {
            ResourceKind::Collections => Ok(EntityList::Collections(self.fetch_list(path).await?)),
            ResourceKind::Requests => Ok(EntityList::Requests(self.fetch_list(path).await?)),
            ResourceKind::OpenApi => Ok(EntityList::OpenApi(self.fetch_list(path).await?)),
        }
    }

    pub async fn get_entity(&self, kind: ResourceKind, id: &str) -> Result<EntityDetail, ApiError> {
        let path = format!("{}/{}", kind.base_path(), id);
        match kind {
            ResourceKind::Collections => Ok(EntityDetail::Collection(Box::new(
                self.fetch_item(&path).await?,
            ))),
            ResourceKind::Requests => {
                Ok(EntityDetail::Request(Box::new(self.fetch_item(&path).await?)))
            }
            ResourceKind::OpenApi => {
                Ok(EntityDetail::OpenApi(Box::new(self.fetch_item(&path).await?)))
            }
        }
    }

    pub async fn delete_entity(&self, kind: ResourceKind, id: &str) -> Result<(), ApiError> {
        let path = format!("{}/{}", kind.base_path(), id);
        self.send_checked(self.http.delete(self.url(&path))).await
    }

    /// Upload a file to the kind's import endpoint as multipart field `file`
    pub async fn import_file(&self, kind: ResourceKind, path: &Path) -> Result<(), ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("import.json")
            .to_string();
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let url = self.url(&format!("{}/import", kind.base_path()));
        self.send_checked(self.http.post(url).multipart(form)).await
    }

    // ========================
    // Collections
    // ========================

    pub async fn update_collection(&self, collection: &Collection) -> Result<(), ApiError> {
        let url = self.url(&format!("postman/{}", collection.id));
        self.send_checked(self.http.put(url).json(collection)).await
    }

    pub async fn requests_in_collection(&self, id: &str) -> Result<Vec<ApiRequest>, ApiError> {
        self.fetch_list(&format!("postman/{id}/requests")).await
    }

    // ========================
    // Requests
    // ========================

    pub async fn create_request(&self, request: &NewRequest) -> Result<(), ApiError> {
        self.send_checked(self.http.post(self.url("requests")).json(request))
            .await
    }

    pub async fn update_request_payload(&self, id: &str, body: &BodyModel) -> Result<(), ApiError> {
        let url = self.url(&format!("requests/{id}/payload"));
        self.send_checked(self.http.put(url).json(&json!({ "payload": body })))
            .await
    }

    pub async fn update_request_headers(
        &self,
        id: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("requests/{id}/headers"));
        self.send_checked(self.http.put(url).json(headers)).await
    }

    pub async fn update_request_params(
        &self,
        id: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("requests/{id}/params"));
        self.send_checked(self.http.put(url).json(&json!({ "params": params })))
            .await
    }

    pub async fn clone_request(&self, id: &str, name: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("requests/{id}/clone"));
        self.send_checked(self.http.post(url).json(&json!({ "name": name })))
            .await
    }

    // ========================
    // OpenAPI specs
    // ========================

    pub async fn update_openapi(&self, spec: &OpenApiSpec) -> Result<(), ApiError> {
        let url = self.url(&format!("openapi/{}", spec.id));
        self.send_checked(self.http.put(url).json(spec)).await
    }

    // ========================
    // Health
    // ========================

    /// Health lives at the server root, not under the API prefix
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let value = self
            .send_json(self.http.get(format!("{}/health", self.root_url)))
            .await?;
        serde_json::from_value(value).map_err(|err| ApiError::UnexpectedContentType {
            detail: err.to_string(),
        })
    }

    // ========================
    // Plumbing
    // ========================

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let value = self.send_json(self.http.get(self.url(path))).await?;
        parse_list(value)
    }

    async fn fetch_item<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.send_json(self.http.get(self.url(path))).await?;
        parse_item(value)
    }

    /// Send a request and parse its body as JSON. Non-2xx responses carry
    /// the body as raw text; a 2xx non-JSON body is its own failure.
    async fn send_json(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Transport { status, body: text });
        }
        serde_json::from_str(&text).map_err(|err| ApiError::UnexpectedContentType {
            detail: err.to_string(),
        })
    }

    /// Send a mutation. Success bodies are not required to be JSON, but an
    /// envelope that parses and says `success: false` still fails.
    async fn send_checked(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Transport { status, body: text });
        }
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            check_envelope(&value)?;
        }
        Ok(())
    }
}

fn check_envelope(value: &Value) -> Result<(), ApiError> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Application {
            message: "API returned unsuccessful response".to_string(),
        });
    }
    Ok(())
}

/// Parse a `{success, data: [...]}` list envelope; a missing `data` array
/// reads as empty
fn parse_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    check_envelope(&value)?;
    let data = value
        .get("data")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    serde_json::from_value(data).map_err(|err| ApiError::UnexpectedContentType {
        detail: err.to_string(),
    })
}

/// Parse a single-entity response; the entity may be wrapped in `data` or
/// returned bare, with or without a `success` flag
fn parse_item<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    check_envelope(&value)?;
    let data = match value.get("data") {
        Some(data) => data.clone(),
        None => value,
    };
    serde_json::from_value(data).map_err(|err| ApiError::UnexpectedContentType {
        detail: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&Config::default())
    }

    #[test]
    fn urls_join_under_the_base() {
        let client = client();
        assert_eq!(client.url("postman"), "http://localhost:8080/api/v1/postman");
        assert_eq!(
            client.url(&format!("{}/{}", ResourceKind::OpenApi.base_path(), "s1")),
            "http://localhost:8080/api/v1/openapi/s1"
        );
    }

    #[test]
    fn health_url_skips_the_api_prefix() {
        let client = client();
        assert_eq!(client.root_url, "http://localhost:8080");
    }

    #[test]
    fn list_envelope_parses_data() {
        let items: Vec<Collection> = parse_list(json!({
            "success": true,
            "data": [{ "id": "c1" }, { "id": "c2" }],
        }))
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "c1");
    }

    #[test]
    fn list_envelope_rejects_unsuccessful_responses() {
        let result: Result<Vec<Collection>, ApiError> =
            parse_list(json!({ "success": false, "data": [] }));
        assert!(matches!(result, Err(ApiError::Application { .. })));
        assert_eq!(
            result.unwrap_err().to_string(),
            "API returned unsuccessful response"
        );
    }

    #[test]
    fn list_envelope_tolerates_missing_data() {
        let items: Vec<Collection> = parse_list(json!({ "success": true })).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn item_envelope_accepts_wrapped_and_bare_entities() {
        let wrapped: Collection =
            parse_item(json!({ "data": { "id": "c1", "name": "a" } })).unwrap();
        assert_eq!(wrapped.id, "c1");

        let bare: Collection = parse_item(json!({ "id": "c2" })).unwrap();
        assert_eq!(bare.id, "c2");
    }

    #[test]
    fn item_envelope_accepts_success_flag_variants() {
        let with_flag: Collection =
            parse_item(json!({ "success": true, "data": { "id": "c1" } })).unwrap();
        assert_eq!(with_flag.id, "c1");

        let result: Result<Collection, ApiError> =
            parse_item(json!({ "success": false, "data": { "id": "c1" } }));
        assert!(matches!(result, Err(ApiError::Application { .. })));
    }
}
