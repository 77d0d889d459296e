//! Automation engine: membership diffing, due-date extension and
//! restoration, and the default priority pass.

use crate::scheduling::domain::{
    ExtensionRecord, Priority, ProjectGid, SectionEvent, SectionGid, TaskGid, TaskRecord, policy,
};
use crate::scheduling::ports::{ExtensionLedger, TaskStore, TaskStoreError};
use chrono::NaiveDate;
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Identifies which project and tracked section the engine watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    project: ProjectGid,
    tracked_section: SectionGid,
}

impl EngineConfig {
    /// Creates an engine configuration.
    #[must_use]
    pub const fn new(project: ProjectGid, tracked_section: SectionGid) -> Self {
        Self {
            project,
            tracked_section,
        }
    }

    /// Returns the watched project.
    #[must_use]
    pub const fn project(&self) -> &ProjectGid {
        &self.project
    }

    /// Returns the tracked section.
    #[must_use]
    pub const fn tracked_section(&self) -> &SectionGid {
        &self.tracked_section
    }
}

/// Errors that abort an automation cycle.
///
/// Everything else is a per-item failure collected in the [`CycleReport`].
#[derive(Debug, Clone, Error)]
pub enum CycleError {
    /// The tracked-section listing could not be fetched.
    #[error("tracked-section listing unavailable: {0}")]
    SectionListUnavailable(#[source] TaskStoreError),

    /// The project listing could not be fetched.
    #[error("project listing unavailable: {0}")]
    ProjectListUnavailable(#[source] TaskStoreError),
}

/// Operation that failed for a single task during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOperation {
    /// Fetching a task's details.
    FetchDetails,
    /// Writing an extended due date.
    ExtendDueDate,
    /// Recording an extension in the ledger.
    RecordExtension,
    /// Listing a trigger's extensions.
    ListExtensions,
    /// Writing a restored due date.
    RestoreDueDate,
    /// Clearing a trigger's extensions.
    ClearExtensions,
    /// Writing a default priority-based due date.
    ApplyDefault,
    /// Writing an initial due date after a priority change.
    AssignInitialDueDate,
}

impl ItemOperation {
    /// Returns a short human-readable operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchDetails => "fetch details",
            Self::ExtendDueDate => "extend due date",
            Self::RecordExtension => "record extension",
            Self::ListExtensions => "list extensions",
            Self::RestoreDueDate => "restore due date",
            Self::ClearExtensions => "clear extensions",
            Self::ApplyDefault => "apply default due date",
            Self::AssignInitialDueDate => "assign initial due date",
        }
    }
}

impl fmt::Display for ItemOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caught per-task failure that did not abort the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Task the operation concerned.
    pub task: TaskGid,
    /// Operation that failed.
    pub operation: ItemOperation,
    /// Failure description.
    pub message: String,
}

/// Summary of one automation cycle or one handled event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Tasks detected entering the tracked section.
    pub moved_in: usize,
    /// Tasks detected leaving the tracked section.
    pub moved_out: usize,
    /// Sibling due dates pushed out.
    pub extended: usize,
    /// Due dates restored to their recorded originals.
    pub restored: usize,
    /// Default priority-based due dates written.
    pub defaults_applied: usize,
    /// Initial due dates assigned after priority changes.
    pub initial_assignments: usize,
    /// Siblings skipped because they had no due date to extend.
    pub skipped_without_due_date: usize,
    /// Per-task failures caught during the cycle.
    pub failures: Vec<ItemFailure>,
}

impl CycleReport {
    /// Returns `true` when no per-task failure was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn note_failure(&mut self, task: &TaskGid, operation: ItemOperation, error: &dyn fmt::Display) {
        self.failures.push(ItemFailure {
            task: task.clone(),
            operation,
            message: error.to_string(),
        });
    }
}

/// Priority-driven due-date automation over one project and one tracked
/// section.
///
/// The engine owns the membership snapshot and the adjusted-due-date cache
/// explicitly; nothing about its behaviour lives in process-wide state. It
/// is driven either by [`run_cycle`](Self::run_cycle) from a polling loop or
/// by [`handle_event`](Self::handle_event) from an inbound webhook, but
/// never by both concurrently: callers serialize access.
pub struct AutomationEngine<S, L, C>
where
    S: TaskStore,
    L: ExtensionLedger,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    ledger: Arc<L>,
    clock: Arc<C>,
    config: EngineConfig,
    previous_members: HashSet<TaskGid>,
    adjusted_due_dates: HashMap<TaskGid, NaiveDate>,
}

impl<S, L, C> AutomationEngine<S, L, C>
where
    S: TaskStore,
    L: ExtensionLedger,
    C: Clock + Send + Sync,
{
    /// Creates an engine with an empty membership snapshot and cache.
    #[must_use]
    pub fn new(store: Arc<S>, ledger: Arc<L>, clock: Arc<C>, config: EngineConfig) -> Self {
        Self {
            store,
            ledger,
            clock,
            config,
            previous_members: HashSet::new(),
            adjusted_due_dates: HashMap::new(),
        }
    }

    /// Returns the task gids last observed in the tracked section.
    #[must_use]
    pub const fn tracked_members(&self) -> &HashSet<TaskGid> {
        &self.previous_members
    }

    /// Returns the due date the engine most recently wrote for a task.
    #[must_use]
    pub fn adjusted_due_date(&self, task: &TaskGid) -> Option<NaiveDate> {
        self.adjusted_due_dates.get(task).copied()
    }

    /// Runs one full automation cycle.
    ///
    /// Order within a cycle: section diffing with its triggered writes
    /// first, then the default pass consulting the cache those writes
    /// populated. Exits are handled before entries, mirroring how the
    /// membership diff is applied.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] when a bulk listing cannot be fetched; the
    /// membership snapshot is left untouched by a failed section listing so
    /// the next successful poll re-detects the same transitions.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let section_tasks = self
            .store
            .section_tasks(self.config.tracked_section())
            .await
            .map_err(CycleError::SectionListUnavailable)?;
        let current: HashSet<TaskGid> = section_tasks
            .iter()
            .map(|task| task.gid().clone())
            .collect();
        let members: Vec<TaskGid> = section_tasks
            .iter()
            .map(|task| task.gid().clone())
            .collect();

        let mut moved_out: Vec<TaskGid> =
            self.previous_members.difference(&current).cloned().collect();
        moved_out.sort();
        let mut moved_in: Vec<TaskGid> =
            current.difference(&self.previous_members).cloned().collect();
        moved_in.sort();

        let mut report = CycleReport {
            moved_in: moved_in.len(),
            moved_out: moved_out.len(),
            ..CycleReport::default()
        };

        for leaving in &moved_out {
            info!("task {leaving} left the tracked section");
            self.handle_exit(leaving, &mut report).await;
        }
        for entering in &moved_in {
            info!("task {entering} entered the tracked section");
            self.handle_entry(entering, &members, &mut report).await;
        }

        // The snapshot advances only after this cycle's transitions were
        // dispatched; an aborted listing leaves it untouched.
        self.previous_members = current;

        let project_tasks = self
            .store
            .project_tasks(self.config.project())
            .await
            .map_err(CycleError::ProjectListUnavailable)?;
        self.apply_default_due_dates(&project_tasks, &mut report)
            .await;

        Ok(report)
    }

    /// Applies one decoded notification event.
    ///
    /// Entries and exits mutate the membership snapshot so a subsequent
    /// poll does not re-apply the same transition; a duplicate entry
    /// delivery is ignored outright.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::SectionListUnavailable`] when an entry needs
    /// the current section membership and the listing cannot be fetched.
    pub async fn handle_event(&mut self, event: &SectionEvent) -> Result<CycleReport, CycleError> {
        let mut report = CycleReport::default();
        match event {
            SectionEvent::Entered(task) => {
                if self.previous_members.contains(task) {
                    debug!("task {task} is already a tracked member; duplicate entry ignored");
                    return Ok(report);
                }
                report.moved_in = 1;
                let section_tasks = self
                    .store
                    .section_tasks(self.config.tracked_section())
                    .await
                    .map_err(CycleError::SectionListUnavailable)?;
                let members: Vec<TaskGid> = section_tasks
                    .iter()
                    .map(|member| member.gid().clone())
                    .collect();
                self.handle_entry(task, &members, &mut report).await;
                self.previous_members.insert(task.clone());
            }
            SectionEvent::Left(task) => {
                report.moved_out = 1;
                self.handle_exit(task, &mut report).await;
                self.previous_members.remove(task);
            }
            SectionEvent::PriorityChanged(task) => {
                self.assign_initial_due_date(task, &mut report).await;
            }
        }
        Ok(report)
    }

    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }

    /// Restores every due date the leaving trigger pushed out, then clears
    /// its ledger records whether or not each restore succeeded.
    async fn handle_exit(&mut self, leaving: &TaskGid, report: &mut CycleReport) {
        let records = match self.ledger.extensions_for(leaving).await {
            Ok(records) => records,
            Err(err) => {
                warn!("could not list extensions for {leaving}: {err}");
                report.note_failure(leaving, ItemOperation::ListExtensions, &err);
                return;
            }
        };

        for record in &records {
            let affected = record.affected();
            let original = record.original_due_on();
            // Unconditional: this is an undo, even when the original date is
            // already in the past.
            match self.store.set_due_date(affected, original).await {
                Ok(()) => {
                    info!("restored due date of task {affected} to {original}");
                    self.adjusted_due_dates.insert(affected.clone(), original);
                    report.restored += 1;
                }
                Err(err) => {
                    warn!("could not restore due date of task {affected}: {err}");
                    report.note_failure(affected, ItemOperation::RestoreDueDate, &err);
                }
            }
        }

        if let Err(err) = self.ledger.clear(leaving).await {
            warn!("could not clear extensions for {leaving}: {err}");
            report.note_failure(leaving, ItemOperation::ClearExtensions, &err);
        }
    }

    /// Extends every sibling's due date when the entering task is
    /// high-priority; entries at other priorities have no side effects.
    async fn handle_entry(
        &mut self,
        entering: &TaskGid,
        section_members: &[TaskGid],
        report: &mut CycleReport,
    ) {
        let details = match self.store.fetch_task(entering).await {
            Ok(details) => details,
            Err(err) => {
                warn!("could not fetch details of entering task {entering}: {err}");
                report.note_failure(entering, ItemOperation::FetchDetails, &err);
                return;
            }
        };

        if details.priority() != Some(Priority::High) {
            debug!("task {entering} entered without high priority; siblings untouched");
            return;
        }

        info!("high-priority task {entering} entered; extending sibling due dates");
        for sibling in section_members {
            if sibling == entering {
                continue;
            }
            self.extend_sibling(entering, sibling, report).await;
        }
    }

    async fn extend_sibling(
        &mut self,
        entering: &TaskGid,
        sibling: &TaskGid,
        report: &mut CycleReport,
    ) {
        let details = match self.store.fetch_task(sibling).await {
            Ok(details) => details,
            Err(err) => {
                warn!("could not fetch details of sibling task {sibling}: {err}");
                report.note_failure(sibling, ItemOperation::FetchDetails, &err);
                return;
            }
        };

        let Some(original) = details.due_on() else {
            debug!("sibling task {sibling} has no due date to extend");
            report.skipped_without_due_date += 1;
            return;
        };

        let extended = policy::extended_due_date(original);
        if let Err(err) = self.store.set_due_date(sibling, extended).await {
            warn!("could not extend due date of task {sibling}: {err}");
            report.note_failure(sibling, ItemOperation::ExtendDueDate, &err);
            return;
        }

        self.adjusted_due_dates.insert(sibling.clone(), extended);
        report.extended += 1;
        info!("extended due date of task {sibling} from {original} to {extended}");

        let record = ExtensionRecord::new(entering.clone(), sibling.clone(), original);
        if let Err(err) = self.ledger.record(&record).await {
            // The external write already happened; without the record the
            // extension cannot be auto-restored when the trigger leaves.
            warn!("could not record extension of {sibling} by {entering}: {err}");
            report.note_failure(sibling, ItemOperation::RecordExtension, &err);
        }
    }

    /// Writes priority-based default due dates to every task the engine has
    /// not already adjusted.
    async fn apply_default_due_dates(&mut self, tasks: &[TaskRecord], report: &mut CycleReport) {
        let today = self.today();
        for task in tasks {
            if self.adjusted_due_dates.contains_key(task.gid()) {
                continue;
            }
            let Some(priority) = task.priority() else {
                continue;
            };
            let due = policy::compute_due_date(priority, today);
            match self.store.set_due_date(task.gid(), due).await {
                Ok(()) => {
                    self.adjusted_due_dates.insert(task.gid().clone(), due);
                    report.defaults_applied += 1;
                    debug!(
                        "applied {} default due date {due} to task {}",
                        priority.as_str(),
                        task.gid()
                    );
                }
                Err(err) => {
                    warn!(
                        "could not apply default due date to task {}: {err}",
                        task.gid()
                    );
                    report.note_failure(task.gid(), ItemOperation::ApplyDefault, &err);
                }
            }
        }
    }

    /// Assigns a default due date after a priority change, but only to
    /// tasks that have none yet.
    async fn assign_initial_due_date(&mut self, task: &TaskGid, report: &mut CycleReport) {
        let details = match self.store.fetch_task(task).await {
            Ok(details) => details,
            Err(err) => {
                warn!("could not fetch details of task {task}: {err}");
                report.note_failure(task, ItemOperation::FetchDetails, &err);
                return;
            }
        };

        if details.due_on().is_some() {
            debug!("task {task} already has a due date; priority change leaves it as-is");
            return;
        }
        let Some(priority) = details.priority() else {
            debug!("task {task} has no priority; no initial due date assigned");
            return;
        };

        let due = policy::compute_due_date(priority, self.today());
        match self.store.set_due_date(task, due).await {
            Ok(()) => {
                self.adjusted_due_dates.insert(task.clone(), due);
                report.initial_assignments += 1;
                info!("assigned initial due date {due} to task {task}");
            }
            Err(err) => {
                warn!("could not assign initial due date to task {task}: {err}");
                report.note_failure(task, ItemOperation::AssignInitialDueDate, &err);
            }
        }
    }
}
