use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Entity kinds managed by the console
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Collections,
    Requests,
    OpenApi,
}

impl ResourceKind {
    /// Path segment under the API base URL
    pub fn base_path(&self) -> &'static str {
        match self {
            ResourceKind::Collections => "postman",
            ResourceKind::Requests => "requests",
            ResourceKind::OpenApi => "openapi",
        }
    }

    /// Human-readable noun for messages and titles
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceKind::Collections => "collection",
            ResourceKind::Requests => "request",
            ResourceKind::OpenApi => "OpenAPI spec",
        }
    }

    pub fn supports_import(&self) -> bool {
        matches!(self, ResourceKind::Collections | ResourceKind::OpenApi)
    }

    pub fn supports_clone(&self) -> bool {
        matches!(self, ResourceKind::Requests)
    }
}

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
        }
    }

    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::PATCH,
            HttpMethod::PATCH => HttpMethod::GET,
        }
    }

    pub fn prev(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::PATCH,
            HttpMethod::POST => HttpMethod::GET,
            HttpMethod::PUT => HttpMethod::POST,
            HttpMethod::DELETE => HttpMethod::PUT,
            HttpMethod::PATCH => HttpMethod::DELETE,
        }
    }
}

/// Request URL: raw string plus whatever parsed parts the backend includes.
///
/// The backend serves this as an object with a `raw` field, but the create
/// endpoint accepts a bare string, so deserialization tolerates both.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "UrlRepr")]
pub struct RequestUrl {
    #[serde(default)]
    pub raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UrlRepr {
    Raw(String),
    Parts {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        protocol: Option<String>,
        #[serde(default)]
        host: Vec<String>,
        #[serde(default)]
        path: Vec<String>,
    },
}

impl From<UrlRepr> for RequestUrl {
    fn from(repr: UrlRepr) -> Self {
        match repr {
            UrlRepr::Raw(raw) => RequestUrl {
                raw,
                ..RequestUrl::default()
            },
            UrlRepr::Parts {
                raw,
                protocol,
                host,
                path,
            } => RequestUrl {
                raw,
                protocol,
                host,
                path,
            },
        }
    }
}

/// One record of a form-style body
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl FormField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        FormField {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Collapse form records into a mapping; duplicate keys keep the last value.
pub fn form_fields_to_map(fields: &[FormField]) -> BTreeMap<String, String> {
    fields
        .iter()
        .map(|f| (f.key.clone(), f.value.clone()))
        .collect()
}

/// Project a mapping back into form records
pub fn map_to_form_fields(map: &BTreeMap<String, String>) -> Vec<FormField> {
    map.iter()
        .map(|(k, v)| FormField::new(k.clone(), v.clone()))
        .collect()
}

/// Request payload, tagged by `mode` on the wire.
///
/// Exactly one variant is active at a time; switching modes discards the
/// other modes' content. Modes the console cannot edit are preserved
/// verbatim in `Other` so they survive a round trip.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum BodyModel {
    #[default]
    None,
    Raw(String),
    FormData(Vec<FormField>),
    UrlEncoded(Vec<FormField>),
    Other(Value),
}

impl BodyModel {
    /// Mode string as the backend spells it
    pub fn mode(&self) -> &str {
        match self {
            BodyModel::None => "none",
            BodyModel::Raw(_) => "raw",
            BodyModel::FormData(_) => "formdata",
            BodyModel::UrlEncoded(_) => "urlencoded",
            BodyModel::Other(value) => value
                .get("mode")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    /// Whether the console offers an edit surface for this mode
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            BodyModel::Raw(_) | BodyModel::FormData(_) | BodyModel::UrlEncoded(_)
        )
    }
}

impl Serialize for BodyModel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = match self {
            BodyModel::None => json!({ "mode": "none" }),
            BodyModel::Raw(raw) => json!({ "mode": "raw", "raw": raw }),
            BodyModel::FormData(fields) => json!({ "mode": "formdata", "formdata": fields }),
            BodyModel::UrlEncoded(fields) => json!({ "mode": "urlencoded", "urlencoded": fields }),
            BodyModel::Other(value) => value.clone(),
        };
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BodyModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(BodyModel::None);
        }
        let mode = value.get("mode").and_then(Value::as_str).unwrap_or("none");
        match mode {
            "none" => Ok(BodyModel::None),
            "raw" => {
                let raw = value
                    .get("raw")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(BodyModel::Raw(raw))
            }
            "formdata" => Ok(BodyModel::FormData(parse_form_fields::<D>(
                value.get("formdata"),
            )?)),
            "urlencoded" => Ok(BodyModel::UrlEncoded(parse_form_fields::<D>(
                value.get("urlencoded"),
            )?)),
            _ => Ok(BodyModel::Other(value)),
        }
    }
}

/// The backend serves form fields as a list of `{key, value}` records, but
/// older documents carry a plain mapping; accept both.
fn parse_form_fields<'de, D>(value: Option<&Value>) -> Result<Vec<FormField>, D::Error>
where
    D: Deserializer<'de>,
{
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| serde_json::from_value(item.clone()).map_err(D::Error::custom))
            .collect(),
        Some(Value::Object(map)) => Ok(map
            .iter()
            .map(|(key, value)| {
                let value = value
                    .as_str()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| value.to_string());
                FormField::new(key.clone(), value)
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Query parameters arrive wrapped: `{"params": {...}}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamsWrapper {
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// A collection of requests, aggregated by back-reference
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields the console does not model; carried so updates round-trip
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A single stored HTTP request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub url: RequestUrl,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub params: ParamsWrapper,
    #[serde(default)]
    pub body: BodyModel,
    #[serde(
        default,
        alias = "collectionId",
        skip_serializing_if = "Option::is_none"
    )]
    pub collection_id: Option<String>,
}

/// An imported OpenAPI specification; flat document fields only
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Payload for creating a new request.
///
/// An empty `collectionId` means unassociated, matching what the backend
/// expects from the create endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NewRequest {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    #[serde(rename = "collectionId")]
    pub collection_id: String,
    pub payload: String,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
}

/// Response of `GET /health`
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

/// Common surface the generic synchronizer needs from every entity kind
pub trait Resource: Clone {
    fn kind() -> ResourceKind;
    fn id(&self) -> &str;
    /// Label shown in list rows; falls back to the id
    fn list_label(&self) -> &str;
    /// Title shown in the detail heading; absent names render as "Unnamed"
    fn detail_title(&self) -> &str;
}

impl Resource for Collection {
    fn kind() -> ResourceKind {
        ResourceKind::Collections
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn list_label(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.id)
    }

    fn detail_title(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unnamed")
    }
}

impl Resource for ApiRequest {
    fn kind() -> ResourceKind {
        ResourceKind::Requests
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn list_label(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.id)
    }

    fn detail_title(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unnamed")
    }
}

impl Resource for OpenApiSpec {
    fn kind() -> ResourceKind {
        ResourceKind::OpenApi
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn list_label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }

    fn detail_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unnamed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_raw_round_trip() {
        let body: BodyModel = serde_json::from_value(json!({ "mode": "raw", "raw": "hello" })).unwrap();
        assert_eq!(body, BodyModel::Raw("hello".to_string()));

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({ "mode": "raw", "raw": "hello" }));
    }

    #[test]
    fn body_formdata_from_record_list() {
        let body: BodyModel = serde_json::from_value(json!({
            "mode": "formdata",
            "formdata": [
                { "key": "a", "value": "1" },
                { "key": "b", "value": "2" },
            ],
        }))
        .unwrap();
        assert_eq!(
            body,
            BodyModel::FormData(vec![FormField::new("a", "1"), FormField::new("b", "2")])
        );
    }

    #[test]
    fn body_formdata_from_plain_mapping() {
        let body: BodyModel = serde_json::from_value(json!({
            "mode": "formdata",
            "formdata": { "a": "1" },
        }))
        .unwrap();
        assert_eq!(body, BodyModel::FormData(vec![FormField::new("a", "1")]));
    }

    #[test]
    fn body_unknown_mode_survives_round_trip() {
        let wire = json!({ "mode": "file", "file": { "src": "data.bin" } });
        let body: BodyModel = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(body.mode(), "file");
        assert!(!body.is_editable());
        assert_eq!(serde_json::to_value(&body).unwrap(), wire);
    }

    #[test]
    fn body_null_is_none() {
        let body: BodyModel = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(body, BodyModel::None);
    }

    #[test]
    fn form_projection_preserves_distinct_records() {
        let fields = vec![FormField::new("a", "1"), FormField::new("b", "2")];
        let map = form_fields_to_map(&fields);
        assert_eq!(map.len(), 2);
        let back = map_to_form_fields(&map);
        assert_eq!(back.len(), 2);
        for field in &fields {
            assert!(back.contains(field));
        }
    }

    #[test]
    fn form_projection_collapses_duplicates_last_wins() {
        let fields = vec![FormField::new("a", "1"), FormField::new("a", "2")];
        let map = form_fields_to_map(&fields);
        assert_eq!(map.get("a").map(String::as_str), Some("2"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn url_accepts_bare_string() {
        let url: RequestUrl = serde_json::from_value(json!("https://example.com/x")).unwrap();
        assert_eq!(url.raw, "https://example.com/x");
        assert!(url.host.is_empty());
    }

    #[test]
    fn url_accepts_parsed_parts() {
        let url: RequestUrl = serde_json::from_value(json!({
            "raw": "https://example.com/x",
            "protocol": "https",
            "host": ["example", "com"],
            "path": ["x"],
        }))
        .unwrap();
        assert_eq!(url.raw, "https://example.com/x");
        assert_eq!(url.protocol.as_deref(), Some("https"));
    }

    #[test]
    fn request_tolerates_both_collection_id_spellings() {
        let snake: ApiRequest =
            serde_json::from_value(json!({ "id": "r1", "collection_id": "c1" })).unwrap();
        let camel: ApiRequest =
            serde_json::from_value(json!({ "id": "r1", "collectionId": "c1" })).unwrap();
        assert_eq!(snake.collection_id.as_deref(), Some("c1"));
        assert_eq!(camel.collection_id.as_deref(), Some("c1"));
    }

    #[test]
    fn request_params_are_wrapped() {
        let request: ApiRequest = serde_json::from_value(json!({
            "id": "r1",
            "params": { "params": { "page": "2" } },
        }))
        .unwrap();
        assert_eq!(request.params.params.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn labels_fall_back_to_id_and_unnamed() {
        let anonymous = Collection {
            id: "c9".to_string(),
            ..Collection::default()
        };
        assert_eq!(anonymous.list_label(), "c9");
        assert_eq!(anonymous.detail_title(), "Unnamed");

        let spec = OpenApiSpec {
            id: "s1".to_string(),
            name: Some("petstore".to_string()),
            ..OpenApiSpec::default()
        };
        assert_eq!(spec.list_label(), "petstore");
    }
}
