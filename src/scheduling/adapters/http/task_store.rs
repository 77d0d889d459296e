//! REST client implementation of the external task-store port.

use super::wire::{DataEnvelope, DueDatePayload, TaskDto};
use crate::scheduling::{
    domain::{ProjectGid, SectionGid, TaskGid, TaskRecord},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use std::time::Duration;

/// Fields requested with every task read; the automation rules need the
/// name, the due date, and the priority custom field.
const OPT_FIELDS: &str = "name,due_on,custom_fields.name,custom_fields.enum_value.name";

/// Request timeout applied to every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bearer-token REST client for the external task store.
#[derive(Debug, Clone)]
pub struct ApiTaskStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiTaskStore {
    /// Creates a client against the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Transport`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> TaskStoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(TaskStoreError::transport)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn list_tasks(&self, path: &str) -> TaskStoreResult<Vec<TaskRecord>> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .query(&[("opt_fields", OPT_FIELDS)])
            .send()
            .await
            .map_err(TaskStoreError::transport)?;

        let envelope: DataEnvelope<Vec<TaskDto>> = decode_success(response).await?;
        envelope
            .data
            .into_iter()
            .map(TaskDto::into_record)
            .collect()
    }
}

async fn decode_success<T>(response: reqwest::Response) -> TaskStoreResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        return Err(TaskStoreError::UnexpectedStatus {
            status: status.as_u16(),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|err| TaskStoreError::Decode(err.to_string()))
}

#[async_trait]
impl TaskStore for ApiTaskStore {
    async fn project_tasks(&self, project: &ProjectGid) -> TaskStoreResult<Vec<TaskRecord>> {
        self.list_tasks(&format!("/projects/{project}/tasks")).await
    }

    async fn section_tasks(&self, section: &SectionGid) -> TaskStoreResult<Vec<TaskRecord>> {
        self.list_tasks(&format!("/sections/{section}/tasks")).await
    }

    async fn fetch_task(&self, task: &TaskGid) -> TaskStoreResult<TaskRecord> {
        let response = self
            .client
            .get(self.url(&format!("/tasks/{task}")))
            .bearer_auth(&self.token)
            .query(&[("opt_fields", OPT_FIELDS)])
            .send()
            .await
            .map_err(TaskStoreError::transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TaskStoreError::NotFound(task.clone()));
        }

        let envelope: DataEnvelope<TaskDto> = decode_success(response).await?;
        envelope.data.into_record()
    }

    async fn set_due_date(&self, task: &TaskGid, due_on: NaiveDate) -> TaskStoreResult<()> {
        let response = self
            .client
            .put(self.url(&format!("/tasks/{task}")))
            .bearer_auth(&self.token)
            .json(&DueDatePayload::for_date(due_on))
            .send()
            .await
            .map_err(TaskStoreError::transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TaskStoreError::NotFound(task.clone()));
        }
        if !status.is_success() {
            return Err(TaskStoreError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
