use std::future::Future;
use std::pin::Pin;

use sqlx::{PgPool, Postgres, Transaction};

use crate::utils::errors::AppError;

/// Run `op` inside a transaction checked out from the pool.
///
/// Commits on `Ok`, rolls back on `Err`; the connection is returned to the
/// pool on every exit path.
pub async fn with_transaction<T, F>(pool: &PgPool, op: F) -> Result<T, AppError>
where
    F: for<'t> FnOnce(
        &'t mut Transaction<'static, Postgres>,
    ) -> Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 't>>,
{
    let mut tx = pool.begin().await?;

    match op(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            // Rollback failure is secondary to the original error.
            let _ = tx.rollback().await;
            Err(err)
        }
    }
}
