//! Transaction helpers for check-then-act state changes.

use futures::future::BoxFuture;
use plebiscite_common::{AppError, AppResult};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::warn;

/// Re-read, check and mutate inside one transaction.
///
/// `reread` loads the rows the gate depends on after the transaction began,
/// `check` rejects the change from that fresh state and `mutate` writes. Any
/// error from the three steps rolls the transaction back, so a rejected
/// change never leaves a partial write behind.
pub async fn transition<S, T, R, C, M>(
    db: &DatabaseConnection,
    reread: R,
    check: C,
    mutate: M,
) -> AppResult<T>
where
    S: Send,
    R: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, AppResult<S>>,
    C: FnOnce(&S) -> AppResult<()>,
    M: for<'c> FnOnce(&'c DatabaseTransaction, S) -> BoxFuture<'c, AppResult<T>>,
{
    let txn = db
        .begin()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let result = async {
        let state = reread(&txn).await?;
        check(&state)?;
        mutate(&txn, state).await
    }
    .await;

    finish(txn, result).await
}

/// Run `mutate` inside one transaction without a gate.
pub async fn atomically<T, M>(db: &DatabaseConnection, mutate: M) -> AppResult<T>
where
    M: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, AppResult<T>>,
{
    let txn = db
        .begin()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let result = mutate(&txn).await;

    finish(txn, result).await
}

async fn finish<T>(txn: DatabaseTransaction, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = txn.rollback().await {
                warn!(error = %rollback, "Failed to roll back transaction");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{proposal, Proposal};
    use crate::test_utils::TestDatabase;
    use sea_orm::EntityTrait;

    #[tokio::test]
    async fn test_rejected_check_writes_nothing() {
        let test_db = TestDatabase::new().await.unwrap();
        let ids = test_db.seed_proposal().await.unwrap();

        let result: AppResult<()> = transition(
            test_db.connection(),
            |_txn| Box::pin(async { Ok(()) }),
            |_: &()| Err(AppError::permission_denied("closed")),
            |_txn, ()| Box::pin(async { Ok(()) }),
        )
        .await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
        let stored = Proposal::find_by_id(ids.proposal_id.clone())
            .one(test_db.connection())
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_failed_mutation_rolls_back() {
        let test_db = TestDatabase::new().await.unwrap();
        let ids = test_db.seed_proposal().await.unwrap();
        let proposal_id = ids.proposal_id.clone();

        let result: AppResult<()> = atomically(test_db.connection(), move |txn| {
            Box::pin(async move {
                Proposal::delete_by_id(proposal_id)
                    .exec(txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Err(AppError::Internal("abort".to_string()))
            })
        })
        .await;

        assert!(result.is_err());
        let stored: Option<proposal::Model> = Proposal::find_by_id(ids.proposal_id)
            .one(test_db.connection())
            .await
            .unwrap();
        assert!(stored.is_some());
    }
}
