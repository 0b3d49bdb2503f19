//! Explicit background task enqueue.

use std::future::Future;

use tokio::task::JoinHandle;

/// Spawn `task` detached from the caller, logging failures under
/// `task_name`.
///
/// Request paths must not hide fire-and-forget work inside unawaited calls;
/// this is the one place such work is enqueued, so its error handling is in
/// one place too.
pub fn spawn<F>(task_name: &'static str, task: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = task.await {
            tracing::error!(task = task_name, error = %error, "Background task failed");
        }
    })
}
