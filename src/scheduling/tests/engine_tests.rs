//! Automation engine tests: membership transitions, extension round trips,
//! the default pass, and failure handling.

use super::support::{FixedClock, date, gid, project, section};
use crate::scheduling::adapters::memory::{InMemoryExtensionLedger, InMemoryTaskStore};
use crate::scheduling::domain::{ExtensionRecord, Priority, SectionEvent, TaskRecord};
use crate::scheduling::ports::ExtensionLedger;
use crate::scheduling::services::{AutomationEngine, CycleError, EngineConfig, ItemOperation};
use rstest::{fixture, rstest};
use std::sync::Arc;

const PROJECT: &str = "proj-1";
const SECTION: &str = "sec-progress";

struct Harness {
    store: InMemoryTaskStore,
    ledger: InMemoryExtensionLedger,
    engine: AutomationEngine<InMemoryTaskStore, InMemoryExtensionLedger, FixedClock>,
}

impl Harness {
    fn add_task(&self, record: &TaskRecord) {
        self.store.upsert_task(record.clone());
    }

    fn add_section_task(&self, record: &TaskRecord) {
        self.store.upsert_task(record.clone());
        self.store.place_in_section(&section(SECTION), record.gid());
    }
}

fn harness_at(today: &str) -> Harness {
    let store = InMemoryTaskStore::new();
    let ledger = InMemoryExtensionLedger::new();
    let config = EngineConfig::new(project(PROJECT), section(SECTION));
    let engine = AutomationEngine::new(
        Arc::new(store.clone()),
        Arc::new(ledger.clone()),
        Arc::new(FixedClock::at(date(today))),
        config,
    );
    Harness {
        store,
        ledger,
        engine,
    }
}

/// Default harness pinned to Saturday 2024-06-01.
#[fixture]
fn harness() -> Harness {
    harness_at("2024-06-01")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn high_priority_entry_extends_sibling_and_exit_restores(mut harness: Harness) {
    // T2 sits in the tracked section, due Monday 2024-06-03, no priority
    // field so the default pass leaves it alone.
    harness.add_section_task(
        &TaskRecord::new(gid("1202"), "Implement export").with_due_on(date("2024-06-03")),
    );
    harness.engine.run_cycle().await.expect("cycle succeeds");
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-03"))
    );

    // T1 is high priority with no due date of its own.
    harness
        .add_section_task(&TaskRecord::new(gid("1201"), "Hotfix login").with_priority(Priority::High));
    let entry_report = harness.engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(entry_report.extended, 1);
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-05"))
    );
    let records = harness
        .ledger
        .extensions_for(&gid("1201"))
        .await
        .expect("listing succeeds");
    assert_eq!(
        records,
        vec![ExtensionRecord::new(
            gid("1201"),
            gid("1202"),
            date("2024-06-03")
        )]
    );

    harness
        .store
        .remove_from_section(&section(SECTION), &gid("1201"));
    let exit_report = harness.engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(exit_report.restored, 1);
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-03"))
    );
    assert!(
        harness
            .ledger
            .extensions_for(&gid("1201"))
            .await
            .expect("listing succeeds")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extension_landing_on_rest_day_advances(mut harness: Harness) {
    // Friday + 2 would be Sunday 2024-06-09; the write lands on Monday.
    harness.add_section_task(
        &TaskRecord::new(gid("1202"), "Weekly report").with_due_on(date("2024-06-07")),
    );
    harness.engine.run_cycle().await.expect("cycle succeeds");

    harness
        .add_section_task(&TaskRecord::new(gid("1201"), "Incident").with_priority(Priority::High));
    harness.engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-10"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn non_high_entry_leaves_siblings_alone(mut harness: Harness) {
    harness.add_section_task(
        &TaskRecord::new(gid("1202"), "Implement export").with_due_on(date("2024-06-03")),
    );
    harness.add_section_task(
        &TaskRecord::new(gid("1203"), "Tidy backlog").with_priority(Priority::Medium),
    );
    let report = harness.engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(report.extended, 0);
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-03"))
    );
    assert!(harness.ledger.is_empty().expect("is_empty succeeds"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sibling_without_due_date_is_skipped(mut harness: Harness) {
    harness.add_section_task(&TaskRecord::new(gid("1202"), "Unscheduled chore"));
    harness
        .add_section_task(&TaskRecord::new(gid("1201"), "Incident").with_priority(Priority::High));
    let report = harness.engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(report.extended, 0);
    assert_eq!(report.skipped_without_due_date, 1);
    assert_eq!(harness.store.due_on_of(&gid("1202")), None);
    assert!(harness.ledger.is_empty().expect("is_empty succeeds"));
}

#[tokio::test(flavor = "multi_thread")]
async fn default_pass_applies_priority_offsets() {
    // Tuesday 2024-06-04; none of the offsets land on a Sunday.
    let mut harness = harness_at("2024-06-04");
    harness.add_task(&TaskRecord::new(gid("1301"), "Low task").with_priority(Priority::Low));
    harness.add_task(&TaskRecord::new(gid("1302"), "Medium task").with_priority(Priority::Medium));
    harness.add_task(&TaskRecord::new(gid("1303"), "High task").with_priority(Priority::High));
    harness.add_task(&TaskRecord::new(gid("1304"), "No priority"));

    let report = harness.engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(report.defaults_applied, 3);
    assert_eq!(
        harness.store.due_on_of(&gid("1301")),
        Some(date("2024-06-18"))
    );
    assert_eq!(
        harness.store.due_on_of(&gid("1302")),
        Some(date("2024-06-11"))
    );
    assert_eq!(
        harness.store.due_on_of(&gid("1303")),
        Some(date("2024-06-06"))
    );
    assert_eq!(harness.store.due_on_of(&gid("1304")), None);

    // The cache makes the default pass write-once until a restart.
    let second_report = harness.engine.run_cycle().await.expect("cycle succeeds");
    assert_eq!(second_report.defaults_applied, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn default_pass_skips_the_rest_day() {
    // Friday 2024-06-07 + 2 lands on Sunday; the write lands on Monday.
    let mut harness = harness_at("2024-06-07");
    harness.add_task(&TaskRecord::new(gid("1303"), "High task").with_priority(Priority::High));

    harness.engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(
        harness.store.due_on_of(&gid("1303")),
        Some(date("2024-06-10"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_pass_does_not_overwrite_a_triggered_write(mut harness: Harness) {
    // T2 carries a priority, so without the cache the default pass would
    // rewrite the freshly-extended date in the same cycle.
    harness.add_section_task(
        &TaskRecord::new(gid("1202"), "Implement export")
            .with_due_on(date("2024-06-03"))
            .with_priority(Priority::Medium),
    );
    harness
        .add_section_task(&TaskRecord::new(gid("1201"), "Incident").with_priority(Priority::High));

    let report = harness.engine.run_cycle().await.expect("cycle succeeds");

    assert_eq!(report.extended, 1);
    assert_eq!(report.defaults_applied, 1);
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-05"))
    );
    // The entering task itself still gets its high-priority default.
    assert_eq!(
        harness.store.due_on_of(&gid("1201")),
        Some(date("2024-06-03"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn entry_fetch_failure_is_per_item_not_an_abort(mut harness: Harness) {
    harness.add_section_task(
        &TaskRecord::new(gid("1202"), "Implement export").with_due_on(date("2024-06-03")),
    );
    harness
        .add_section_task(&TaskRecord::new(gid("1201"), "Incident").with_priority(Priority::High));
    harness.store.fail_fetching(&gid("1201"));

    let report = harness.engine.run_cycle().await.expect("cycle succeeds");

    let failure = report.failures.first().expect("one failure recorded");
    assert_eq!(failure.task, gid("1201"));
    assert_eq!(failure.operation, ItemOperation::FetchDetails);
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-03"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn section_listing_failure_aborts_and_preserves_the_snapshot(mut harness: Harness) {
    harness.add_section_task(
        &TaskRecord::new(gid("1202"), "Implement export").with_due_on(date("2024-06-03")),
    );
    harness
        .add_section_task(&TaskRecord::new(gid("1201"), "Incident").with_priority(Priority::High));
    harness.engine.run_cycle().await.expect("cycle succeeds");
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-05"))
    );

    // The trigger leaves while the listing is down: the cycle aborts and
    // the snapshot still names it a member.
    harness
        .store
        .remove_from_section(&section(SECTION), &gid("1201"));
    harness.store.fail_section_listing(true);
    let aborted = harness.engine.run_cycle().await;
    assert!(matches!(aborted, Err(CycleError::SectionListUnavailable(_))));
    assert!(harness.engine.tracked_members().contains(&gid("1201")));

    // The next successful poll re-detects the exit and restores.
    harness.store.fail_section_listing(false);
    let report = harness.engine.run_cycle().await.expect("cycle succeeds");
    assert_eq!(report.restored, 1);
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-03"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_listing_failure_aborts_the_default_pass(mut harness: Harness) {
    harness.add_task(&TaskRecord::new(gid("1301"), "Low task").with_priority(Priority::Low));
    harness.store.fail_project_listing(true);

    let aborted = harness.engine.run_cycle().await;

    assert!(matches!(aborted, Err(CycleError::ProjectListUnavailable(_))));
    assert_eq!(harness.store.due_on_of(&gid("1301")), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restore_failure_still_clears_the_ledger(mut harness: Harness) {
    harness.add_section_task(
        &TaskRecord::new(gid("1202"), "Implement export").with_due_on(date("2024-06-03")),
    );
    harness
        .add_section_task(&TaskRecord::new(gid("1201"), "Incident").with_priority(Priority::High));
    harness.engine.run_cycle().await.expect("cycle succeeds");

    harness.store.fail_updating(&gid("1202"));
    harness
        .store
        .remove_from_section(&section(SECTION), &gid("1201"));
    let report = harness.engine.run_cycle().await.expect("cycle succeeds");

    let failure = report.failures.first().expect("one failure recorded");
    assert_eq!(failure.operation, ItemOperation::RestoreDueDate);
    // Best-effort clearing: the stale record must not linger.
    assert!(harness.ledger.is_empty().expect("is_empty succeeds"));
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-05"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stacked_triggers_unwind_to_their_own_baselines(mut harness: Harness) {
    harness.add_section_task(
        &TaskRecord::new(gid("1202"), "Implement export").with_due_on(date("2024-06-03")),
    );
    harness
        .add_section_task(&TaskRecord::new(gid("1201"), "Incident").with_priority(Priority::High));
    harness.engine.run_cycle().await.expect("cycle succeeds");
    // First trigger: T2 pushed to 06-05; T1 got its high default 06-03.
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-05"))
    );

    harness
        .add_section_task(&TaskRecord::new(gid("1203"), "Outage").with_priority(Priority::High));
    harness.engine.run_cycle().await.expect("cycle succeeds");
    // Second trigger extends both existing members.
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-07"))
    );
    assert_eq!(
        harness.store.due_on_of(&gid("1201")),
        Some(date("2024-06-05"))
    );

    harness
        .store
        .remove_from_section(&section(SECTION), &gid("1203"));
    harness.engine.run_cycle().await.expect("cycle succeeds");
    // Unwinding the second trigger lands back on the first trigger's state.
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-05"))
    );
    assert_eq!(
        harness.store.due_on_of(&gid("1201")),
        Some(date("2024-06-03"))
    );

    harness
        .store
        .remove_from_section(&section(SECTION), &gid("1201"));
    harness.engine.run_cycle().await.expect("cycle succeeds");
    // Unwinding the first trigger restores the true baseline.
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-03"))
    );
    assert!(harness.ledger.is_empty().expect("is_empty succeeds"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn priority_change_assigns_a_due_date_only_once(mut harness: Harness) {
    harness.add_task(&TaskRecord::new(gid("1401"), "New request").with_priority(Priority::Low));

    let report = harness
        .engine
        .handle_event(&SectionEvent::PriorityChanged(gid("1401")))
        .await
        .expect("event succeeds");

    assert_eq!(report.initial_assignments, 1);
    // Saturday 2024-06-01 + 14 is Saturday 2024-06-15.
    assert_eq!(
        harness.store.due_on_of(&gid("1401")),
        Some(date("2024-06-15"))
    );

    let second_report = harness
        .engine
        .handle_event(&SectionEvent::PriorityChanged(gid("1401")))
        .await
        .expect("event succeeds");
    assert_eq!(second_report.initial_assignments, 0);
    assert_eq!(
        harness.store.due_on_of(&gid("1401")),
        Some(date("2024-06-15"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn webhook_events_drive_the_same_transitions(mut harness: Harness) {
    harness.add_section_task(
        &TaskRecord::new(gid("1202"), "Implement export").with_due_on(date("2024-06-03")),
    );
    harness
        .add_section_task(&TaskRecord::new(gid("1201"), "Incident").with_priority(Priority::High));

    let entry_report = harness
        .engine
        .handle_event(&SectionEvent::Entered(gid("1201")))
        .await
        .expect("event succeeds");
    assert_eq!(entry_report.extended, 1);
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-05"))
    );
    assert!(harness.engine.tracked_members().contains(&gid("1201")));

    // A duplicate delivery is ignored outright.
    let duplicate_report = harness
        .engine
        .handle_event(&SectionEvent::Entered(gid("1201")))
        .await
        .expect("event succeeds");
    assert_eq!(duplicate_report.extended, 0);
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-05"))
    );

    harness
        .store
        .remove_from_section(&section(SECTION), &gid("1201"));
    let exit_report = harness
        .engine
        .handle_event(&SectionEvent::Left(gid("1201")))
        .await
        .expect("event succeeds");
    assert_eq!(exit_report.restored, 1);
    assert_eq!(
        harness.store.due_on_of(&gid("1202")),
        Some(date("2024-06-03"))
    );
    assert!(!harness.engine.tracked_members().contains(&gid("1201")));
}
