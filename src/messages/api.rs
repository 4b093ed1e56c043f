//! API messages - communication between the App and API layers

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::models::{
    ApiRequest, BodyModel, Collection, HealthStatus, NewRequest, OpenApiSpec, ResourceKind,
};

/// Commands sent from the App layer to the API layer
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCommand {
    /// Fetch the full entity list for a kind
    FetchList { kind: ResourceKind },
    /// Fetch one entity; `generation` guards against stale completions
    FetchDetail {
        kind: ResourceKind,
        id: String,
        generation: u64,
    },
    /// Secondary fetch: requests belonging to a collection
    FetchCollectionRequests {
        collection_id: String,
        generation: u64,
    },
    /// Persist a full collection entity
    SaveCollection { collection: Collection },
    /// Persist a full OpenAPI spec entity
    SaveOpenApi { spec: OpenApiSpec },
    /// Persist one request's payload sub-resource
    SaveRequestPayload { id: String, body: BodyModel },
    /// Persist one request's headers sub-resource
    SaveRequestHeaders {
        id: String,
        headers: BTreeMap<String, String>,
    },
    /// Persist one request's query-params sub-resource
    SaveRequestParams {
        id: String,
        params: BTreeMap<String, String>,
    },
    CreateRequest { request: NewRequest },
    DeleteEntity { kind: ResourceKind, id: String },
    CloneRequest { id: String, name: String },
    /// Upload a file to the kind's import endpoint
    ImportFile { kind: ResourceKind, path: PathBuf },
    FetchHealth,
    /// Shutdown the API actor
    Shutdown,
}

impl ApiCommand {
    /// The synchronizer guard this command passes through, if it mutates.
    /// Fetches and health checks are not serialized.
    pub fn mutation(&self) -> Option<(ResourceKind, MutationKind)> {
        match self {
            ApiCommand::SaveCollection { collection } => Some((
                ResourceKind::Collections,
                MutationKind::Save {
                    id: collection.id.clone(),
                },
            )),
            ApiCommand::SaveOpenApi { spec } => Some((
                ResourceKind::OpenApi,
                MutationKind::Save { id: spec.id.clone() },
            )),
            ApiCommand::SaveRequestPayload { id, .. }
            | ApiCommand::SaveRequestHeaders { id, .. }
            | ApiCommand::SaveRequestParams { id, .. } => {
                Some((ResourceKind::Requests, MutationKind::Save { id: id.clone() }))
            }
            ApiCommand::CreateRequest { .. } => Some((ResourceKind::Requests, MutationKind::Create)),
            ApiCommand::DeleteEntity { kind, id } => {
                Some((*kind, MutationKind::Delete { id: id.clone() }))
            }
            ApiCommand::CloneRequest { .. } => Some((ResourceKind::Requests, MutationKind::Clone)),
            ApiCommand::ImportFile { kind, .. } => Some((*kind, MutationKind::Import)),
            _ => None,
        }
    }
}

/// What a mutating command did, carried back with its outcome
#[derive(Debug, Clone, PartialEq)]
pub enum MutationKind {
    Save { id: String },
    Create,
    Delete { id: String },
    Clone,
    Import,
}

/// A full list of one entity kind
#[derive(Debug, Clone, PartialEq)]
pub enum EntityList {
    Collections(Vec<Collection>),
    Requests(Vec<ApiRequest>),
    OpenApi(Vec<OpenApiSpec>),
}

/// One fetched entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityDetail {
    Collection(Box<Collection>),
    Request(Box<ApiRequest>),
    OpenApi(Box<OpenApiSpec>),
}

/// Results sent from the API layer back to the App layer.
///
/// Failure payloads are already-formatted human-readable strings; the app
/// layer stores them verbatim for display and never inspects them.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult {
    List {
        kind: ResourceKind,
        outcome: Result<EntityList, String>,
    },
    Detail {
        kind: ResourceKind,
        generation: u64,
        outcome: Result<EntityDetail, String>,
    },
    CollectionRequests {
        generation: u64,
        outcome: Result<Vec<ApiRequest>, String>,
    },
    Mutation {
        kind: ResourceKind,
        mutation: MutationKind,
        outcome: Result<(), String>,
    },
    Health {
        outcome: Result<HealthStatus, String>,
    },
}
