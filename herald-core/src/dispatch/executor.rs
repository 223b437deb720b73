//! Execution isolation for matched invocations.
//!
//! Every dispatch becomes one task on the shared tokio runtime, so the
//! event-delivery task returns to its stream immediately and two dispatches
//! may complete in either order. The invocation runs inside a *nested*
//! spawn: a panicking handler surfaces as a `JoinError` here instead of
//! taking anything else down with it.

use futures_util::future::BoxFuture;
use herald_common::err;

use crate::command::CommandCtxt;

/// Notified with the raw message text and the captured error whenever a
/// handler fails.
pub type ExceptionListener = std::sync::Arc<dyn Fn(&str, &anyhow::Error) + Send + Sync>;

/// Submits a bound invocation. Returns immediately; any failure is logged,
/// acknowledged to the user generically, and forwarded to every exception
/// listener exactly once.
pub(crate) fn submit(
    ctxt: CommandCtxt,
    invocation: BoxFuture<'static, anyhow::Result<()>>,
    failure_message: String,
    listeners: Vec<ExceptionListener>,
) {
    let raw = ctxt.data.event.content.clone();

    tokio::spawn(async move {
        let error = match tokio::spawn(invocation).await {
            Ok(Ok(())) => return,
            Ok(Err(error)) => error,
            Err(join_error) => anyhow::anyhow!("command handler panicked: {join_error}"),
        };

        let worker = std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_owned();
        err!("unhandled error in command worker '{worker}' while executing request '{raw}': {error:?}");

        let _ = ctxt.react_failure().await;
        let _ = ctxt.reply(&failure_message).await;

        for listener in &listeners {
            listener(&raw, &error);
        }
    });
}
