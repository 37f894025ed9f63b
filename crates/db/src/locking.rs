//! Transaction setup and lock-error classification.
//!
//! Confirm, annul and update run in one transaction each and take row
//! locks with `SELECT ... FOR UPDATE`. When a lock timeout is configured it
//! is applied with `SET LOCAL`, which scopes it to that transaction only.

use std::time::Duration;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, RuntimeErr, TransactionTrait,
};

use almacen_core::order::OrderError;

/// `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// Begins a transaction, bounding row-lock waits if a timeout is given.
///
/// # Errors
///
/// Returns an error if the transaction cannot be started or the timeout
/// cannot be set.
pub async fn begin_with_lock_timeout(
    db: &DatabaseConnection,
    lock_timeout: Option<Duration>,
) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;

    if let Some(timeout) = lock_timeout {
        txn.execute_unprepared(&lock_timeout_sql(timeout)).await?;
    }

    Ok(txn)
}

fn lock_timeout_sql(timeout: Duration) -> String {
    format!("SET LOCAL lock_timeout = '{}ms'", timeout.as_millis())
}

/// Returns the `PostgreSQL` SQLSTATE carried by a database error, if any.
#[must_use]
pub fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => sqlx_code(e),
        _ => None,
    }
}

fn sqlx_code(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}

/// Maps a database error to an order error.
///
/// Lock timeouts and deadlocks become `LockConflict`, which callers may
/// retry; everything else is `Database`.
#[must_use]
pub fn db_err(err: DbErr) -> OrderError {
    match sqlstate(&err).as_deref() {
        Some(LOCK_NOT_AVAILABLE | DEADLOCK_DETECTED) => OrderError::LockConflict(err.to_string()),
        _ => OrderError::Database(err.to_string()),
    }
}
