//! In-memory task store for automation engine tests.
//!
//! Models a single project: every inserted task belongs to it, and sections
//! hold whichever tasks tests place there. Individual operations can be made
//! to fail so per-item and bulk failure handling is exercisable without a
//! network.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::scheduling::{
    domain::{ProjectGid, SectionGid, TaskGid, TaskRecord},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: HashMap<TaskGid, TaskRecord>,
    insertion_order: Vec<TaskGid>,
    sections: HashMap<SectionGid, Vec<TaskGid>>,
    fail_fetch: HashSet<TaskGid>,
    fail_update: HashSet<TaskGid>,
    fail_section_listing: bool,
    fail_project_listing: bool,
}

fn lock_error(err: impl std::fmt::Display) -> TaskStoreError {
    TaskStoreError::transport(std::io::Error::other(err.to_string()))
}

fn injected_failure() -> TaskStoreError {
    TaskStoreError::UnexpectedStatus { status: 500 }
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory task store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a task in the store's single project.
    pub fn upsert_task(&self, task: TaskRecord) {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !state.tasks.contains_key(task.gid()) {
            state.insertion_order.push(task.gid().clone());
        }
        state.tasks.insert(task.gid().clone(), task);
    }

    /// Places a task in a section, keeping placement order.
    pub fn place_in_section(&self, section: &SectionGid, task: &TaskGid) {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        let members = state.sections.entry(section.clone()).or_default();
        if !members.contains(task) {
            members.push(task.clone());
        }
    }

    /// Removes a task from a section.
    pub fn remove_from_section(&self, section: &SectionGid, task: &TaskGid) {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(members) = state.sections.get_mut(section) {
            members.retain(|member| member != task);
        }
    }

    /// Returns the due date currently stored for a task.
    #[must_use]
    pub fn due_on_of(&self, task: &TaskGid) -> Option<NaiveDate> {
        let state = self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.tasks.get(task).and_then(TaskRecord::due_on)
    }

    /// Makes subsequent detail fetches for the task fail.
    pub fn fail_fetching(&self, task: &TaskGid) {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.fail_fetch.insert(task.clone());
    }

    /// Makes subsequent due-date writes for the task fail.
    pub fn fail_updating(&self, task: &TaskGid) {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.fail_update.insert(task.clone());
    }

    /// Toggles failure of section listings.
    pub fn fail_section_listing(&self, fail: bool) {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.fail_section_listing = fail;
    }

    /// Toggles failure of project listings.
    pub fn fail_project_listing(&self, fail: bool) {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.fail_project_listing = fail;
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn project_tasks(&self, _project: &ProjectGid) -> TaskStoreResult<Vec<TaskRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        if state.fail_project_listing {
            return Err(injected_failure());
        }
        let tasks = state
            .insertion_order
            .iter()
            .filter_map(|gid| state.tasks.get(gid).cloned())
            .collect();
        Ok(tasks)
    }

    async fn section_tasks(&self, section: &SectionGid) -> TaskStoreResult<Vec<TaskRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        if state.fail_section_listing {
            return Err(injected_failure());
        }
        let members = state.sections.get(section).cloned().unwrap_or_default();
        let tasks = members
            .iter()
            .filter_map(|gid| state.tasks.get(gid).cloned())
            .collect();
        Ok(tasks)
    }

    async fn fetch_task(&self, task: &TaskGid) -> TaskStoreResult<TaskRecord> {
        let state = self.state.read().map_err(lock_error)?;
        if state.fail_fetch.contains(task) {
            return Err(injected_failure());
        }
        state
            .tasks
            .get(task)
            .cloned()
            .ok_or(TaskStoreError::NotFound(task.clone()))
    }

    async fn set_due_date(&self, task: &TaskGid, due_on: NaiveDate) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.fail_update.contains(task) {
            return Err(injected_failure());
        }
        let record = state
            .tasks
            .get(task)
            .cloned()
            .ok_or(TaskStoreError::NotFound(task.clone()))?;
        let gid = record.gid().clone();
        let name = record.name().to_owned();
        let mut updated = TaskRecord::new(gid, name).with_due_on(due_on);
        if let Some(priority) = record.priority() {
            updated = updated.with_priority(priority);
        }
        state.tasks.insert(task.clone(), updated);
        Ok(())
    }
}
