use std::{future::Future, time::Duration};

use common::error::AppError;

/// Awaits `future`, failing with `on_timeout` once `limit` has passed.
///
/// Dropping the future on expiry drops any child process it owns, so callers
/// spawn tools with `kill_on_drop(true)`. `None` waits without a limit.
pub async fn with_deadline<T, F>(
    limit: Option<Duration>,
    future: F,
    on_timeout: impl FnOnce(Duration) -> AppError,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| on_timeout(limit))?,
        None => future.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_deadline_uses_stage_error() {
        let result: Result<(), AppError> = with_deadline(
            Some(Duration::from_millis(10)),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            |limit| AppError::Convert(format!("timed out after {limit:?}")),
        )
        .await;

        assert!(matches!(result, Err(AppError::Convert(_))));
    }

    #[tokio::test]
    async fn no_limit_passes_result_through() {
        let result = with_deadline(None, async { Ok(7) }, |_| {
            AppError::InternalError("unreachable".into())
        })
        .await;
        assert_eq!(result.expect("value"), 7);
    }
}
