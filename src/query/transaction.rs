use tracing::warn;

use crate::driver::DbConnection;
use crate::{Result, RowkitError};

/// Run `block` inside a transaction.
///
/// Auto-commit is disabled for the duration of the block and its previous
/// state restored afterwards, whatever the outcome. The block's result is
/// committed on success; on failure the transaction is rolled back and the
/// original error re-raised. If the rollback itself fails, that failure is
/// attached to the original instead of replacing it.
pub fn with_transaction<C, R, F>(conn: &C, block: F) -> Result<R>
where
    C: DbConnection + ?Sized,
    F: FnOnce(&C) -> Result<R>,
{
    let prior = conn.auto_commit()?;
    conn.set_auto_commit(false)?;

    let outcome = match block(conn) {
        Ok(value) => conn.commit().map(|()| value),
        Err(source) => match conn.rollback() {
            Ok(()) => Err(source),
            Err(rollback) => Err(RowkitError::RollbackFailed {
                source: Box::new(source),
                rollback: Box::new(rollback),
            }),
        },
    };

    if let Err(restore) = conn.set_auto_commit(prior) {
        match outcome {
            // The transaction itself succeeded; failing to restore the
            // connection state is the caller's problem now.
            Ok(_) => return Err(restore),
            Err(original) => {
                warn!(error = %restore, "failed to restore auto-commit state");
                return Err(original);
            }
        }
    }
    outcome
}
