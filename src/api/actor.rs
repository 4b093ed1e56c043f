//! API actor - executes backend commands on the Tokio runtime.
//!
//! One task per command, spawned on a JoinSet; nothing is retried,
//! de-duplicated or cancelled. Late completions are sorted out by the app
//! layer's generation counters.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::messages::api::{ApiCommand, ApiResult};

/// API actor that processes backend commands
pub struct ApiActor {
    client: Arc<ApiClient>,
    result_tx: mpsc::UnboundedSender<ApiResult>,
    tasks: JoinSet<()>,
}

impl ApiActor {
    pub fn new(client: ApiClient, result_tx: mpsc::UnboundedSender<ApiResult>) -> Self {
        ApiActor {
            client: Arc::new(client),
            result_tx,
            tasks: JoinSet::new(),
        }
    }

    /// Run the actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<ApiCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(ApiCommand::Shutdown) | None => break,
                        Some(cmd) => self.spawn(cmd),
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.tasks.join_next() => {}
            }
        }
    }

    fn spawn(&mut self, cmd: ApiCommand) {
        let client = Arc::clone(&self.client);
        let result_tx = self.result_tx.clone();
        self.tasks.spawn(async move {
            if let Some(result) = execute(&client, cmd).await {
                let _ = result_tx.send(result);
            }
        });
    }
}

async fn execute(client: &ApiClient, cmd: ApiCommand) -> Option<ApiResult> {
    // mutations share one result shape, keyed by their guard metadata
    if let Some((kind, mutation)) = cmd.mutation() {
        tracing::info!(?kind, ?mutation, "Executing mutation");
        let outcome = run_mutation(client, cmd).await.map_err(|err| err.to_string());
        if let Err(message) = &outcome {
            tracing::warn!(?kind, %message, "Mutation failed");
        }
        return Some(ApiResult::Mutation {
            kind,
            mutation,
            outcome,
        });
    }

    match cmd {
        ApiCommand::FetchList { kind } => {
            tracing::info!(?kind, "Fetching list");
            let outcome = client
                .list_entities(kind)
                .await
                .map_err(|err| err.to_string());
            Some(ApiResult::List { kind, outcome })
        }
        ApiCommand::FetchDetail {
            kind,
            id,
            generation,
        } => {
            tracing::info!(?kind, %id, generation, "Fetching detail");
            let outcome = client
                .get_entity(kind, &id)
                .await
                .map_err(|err| err.to_string());
            Some(ApiResult::Detail {
                kind,
                generation,
                outcome,
            })
        }
        ApiCommand::FetchCollectionRequests {
            collection_id,
            generation,
        } => {
            tracing::debug!(%collection_id, "Fetching collection requests");
            let outcome = client
                .requests_in_collection(&collection_id)
                .await
                .map_err(|err| err.to_string());
            Some(ApiResult::CollectionRequests {
                generation,
                outcome,
            })
        }
        ApiCommand::FetchHealth => {
            let outcome = client.health().await.map_err(|err| err.to_string());
            Some(ApiResult::Health { outcome })
        }
        // mutations were handled above; Shutdown is consumed by the loop
        _ => None,
    }
}

async fn run_mutation(client: &ApiClient, cmd: ApiCommand) -> Result<(), ApiError> {
    match cmd {
        ApiCommand::SaveCollection { collection } => client.update_collection(&collection).await,
        ApiCommand::SaveOpenApi { spec } => client.update_openapi(&spec).await,
        ApiCommand::SaveRequestPayload { id, body } => {
            client.update_request_payload(&id, &body).await
        }
        ApiCommand::SaveRequestHeaders { id, headers } => {
            client.update_request_headers(&id, &headers).await
        }
        ApiCommand::SaveRequestParams { id, params } => {
            client.update_request_params(&id, &params).await
        }
        ApiCommand::CreateRequest { request } => client.create_request(&request).await,
        ApiCommand::DeleteEntity { kind, id } => client.delete_entity(kind, &id).await,
        ApiCommand::CloneRequest { id, name } => client.clone_request(&id, &name).await,
        ApiCommand::ImportFile { kind, path } => client.import_file(kind, &path).await,
        _ => Ok(()),
    }
}
