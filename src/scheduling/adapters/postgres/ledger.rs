//! `PostgreSQL` ledger implementation for extension-record storage.

use super::{
    models::{ExtensionRow, NewExtensionRow},
    schema::task_extensions,
};
use crate::scheduling::{
    domain::{ExtensionRecord, TaskGid},
    ports::{ExtensionLedger, LedgerError, LedgerResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by the ledger adapter.
pub type LedgerPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed extension ledger.
#[derive(Debug, Clone)]
pub struct PostgresExtensionLedger {
    pool: LedgerPgPool,
}

impl PostgresExtensionLedger {
    /// Creates a new ledger from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LedgerPgPool) -> Self {
        Self { pool }
    }

    /// Creates the `task_extensions` table when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] when the statement fails.
    pub async fn ensure_schema(&self) -> LedgerResult<()> {
        self.run_blocking(|connection| {
            diesel::sql_query(concat!(
                "CREATE TABLE IF NOT EXISTS task_extensions (",
                "trigger_task_gid VARCHAR(255) NOT NULL, ",
                "affected_task_gid VARCHAR(255) NOT NULL, ",
                "original_due_on DATE NOT NULL, ",
                "PRIMARY KEY (trigger_task_gid, affected_task_gid))",
            ))
            .execute(connection)
            .map_err(LedgerError::storage)?;
            Ok(())
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut PgConnection) -> LedgerResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(LedgerError::storage)?;
            f(&mut connection)
        })
        .await
        .map_err(LedgerError::storage)?
    }
}

#[async_trait]
impl ExtensionLedger for PostgresExtensionLedger {
    async fn record(&self, record: &ExtensionRecord) -> LedgerResult<()> {
        let new_row = to_new_row(record);
        self.run_blocking(move |connection| {
            // DO NOTHING keeps the first-stored original for the pair.
            diesel::insert_into(task_extensions::table)
                .values(&new_row)
                .on_conflict((
                    task_extensions::trigger_task_gid,
                    task_extensions::affected_task_gid,
                ))
                .do_nothing()
                .execute(connection)
                .map_err(LedgerError::storage)?;
            Ok(())
        })
        .await
    }

    async fn extensions_for(&self, trigger: &TaskGid) -> LedgerResult<Vec<ExtensionRecord>> {
        let trigger_gid = trigger.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = task_extensions::table
                .filter(task_extensions::trigger_task_gid.eq(&trigger_gid))
                .order(task_extensions::affected_task_gid.asc())
                .select(ExtensionRow::as_select())
                .load::<ExtensionRow>(connection)
                .map_err(LedgerError::storage)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn clear(&self, trigger: &TaskGid) -> LedgerResult<usize> {
        let trigger_gid = trigger.as_str().to_owned();
        self.run_blocking(move |connection| {
            diesel::delete(
                task_extensions::table
                    .filter(task_extensions::trigger_task_gid.eq(&trigger_gid)),
            )
            .execute(connection)
            .map_err(LedgerError::storage)
        })
        .await
    }
}

fn to_new_row(record: &ExtensionRecord) -> NewExtensionRow {
    NewExtensionRow {
        trigger_task_gid: record.trigger().as_str().to_owned(),
        affected_task_gid: record.affected().as_str().to_owned(),
        original_due_on: record.original_due_on(),
    }
}

fn row_to_record(row: ExtensionRow) -> LedgerResult<ExtensionRecord> {
    let ExtensionRow {
        trigger_task_gid,
        affected_task_gid,
        original_due_on,
    } = row;

    let trigger = TaskGid::new(trigger_task_gid).map_err(LedgerError::storage)?;
    let affected = TaskGid::new(affected_task_gid).map_err(LedgerError::storage)?;
    Ok(ExtensionRecord::new(trigger, affected, original_due_on))
}

#[cfg(test)]
mod tests {
    use super::{row_to_record, to_new_row, ExtensionRow};
    use crate::scheduling::domain::{ExtensionRecord, TaskGid};
    use chrono::NaiveDate;

    fn gid(value: &str) -> TaskGid {
        TaskGid::new(value).expect("valid gid")
    }

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn record_round_trips_through_rows() {
        let record = ExtensionRecord::new(gid("1201"), gid("1202"), date("2024-06-03"));
        let row = to_new_row(&record);
        let restored = row_to_record(ExtensionRow {
            trigger_task_gid: row.trigger_task_gid,
            affected_task_gid: row.affected_task_gid,
            original_due_on: row.original_due_on,
        })
        .expect("row should convert back");
        assert_eq!(restored, record);
    }

    #[test]
    fn blank_gids_from_storage_are_rejected() {
        let result = row_to_record(ExtensionRow {
            trigger_task_gid: String::new(),
            affected_task_gid: "1202".to_owned(),
            original_due_on: date("2024-06-03"),
        });
        assert!(result.is_err());
    }
}
