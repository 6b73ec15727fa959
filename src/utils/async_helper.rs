use std::future::Future;
use std::pin::Pin;
use std::thread::JoinHandle;

/// Type alias for async task results
pub type AsyncTaskResult<T> = Result<T, String>;

/// Type alias for boxed async tasks
pub type AsyncTask<T> = Pin<Box<dyn Future<Output = AsyncTaskResult<T>> + Send + 'static>>;

/// Spawns a background thread that runs an async task and sends the result
/// via a channel. The thread exits after sending.
///
/// # Example
/// ```ignore
/// let (tx, rx) = std::sync::mpsc::channel();
/// spawn_and_send(
///     move || Box::pin(async move {
///         api::tracks::fetch_liked_songs(&token).await.map_err(|e| e.to_string())
///     }),
///     tx,
/// );
/// // Later, from the UI loop: rx.try_recv()
/// ```
pub fn spawn_and_send<F, T>(
    task_factory: F,
    tx: std::sync::mpsc::Sender<AsyncTaskResult<T>>,
) -> JoinHandle<()>
where
    F: FnOnce() -> AsyncTask<T> + Send + 'static,
    T: Send + 'static,
{
    std::thread::spawn(move || {
        let rt = match crate::utils::error_handling::create_runtime() {
            Ok(r) => r,
            Err(e) => {
                log::error!("[AsyncHelper] Failed to create runtime: {}", e);
                let _ = tx.send(Err(e));
                return;
            }
        };

        let result = rt.block_on(task_factory());
        let _ = tx.send(result);
    })
}

/// Fire-and-forget spawn for tasks whose result nobody waits on, such as
/// the classifier preload loop. Errors are the task's own business.
pub fn spawn_fire_and_forget<F, T>(task_factory: F)
where
    F: FnOnce() -> AsyncTask<T> + Send + 'static,
    T: Send + 'static,
{
    std::thread::spawn(move || {
        let rt = match crate::utils::error_handling::create_runtime() {
            Ok(r) => r,
            Err(e) => {
                log::error!("[AsyncHelper] Failed to create runtime: {}", e);
                return;
            }
        };

        let _ = rt.block_on(task_factory());
    });
}
