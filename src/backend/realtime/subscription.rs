/**
 * Live-Update Subscription Handler
 *
 * Server-Sent Events transport for the `/events` endpoint. Each connection
 * registers with the Broadcast Hub and receives the same messages a
 * WebSocket client would, one SSE event per message.
 *
 * # Event Names
 *
 * The SSE `event:` field carries the message `type` (`connected`,
 * `taskCreated`, `taskUpdated`, `taskDeleted`, `tasksReordered`); `data:`
 * is the full `{ "type", "data" }` JSON envelope.
 *
 * # Connection Management
 *
 * - Keep-alive comments are injected by axum
 * - The stream ends once the hub closes the session (overflow under the
 *   `disconnect` policy, or unregister)
 * - Dropping the stream drops the `Subscription`, which unregisters it
 */

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use std::convert::Infallible;

use crate::backend::realtime::hub::BroadcastHub;

/// Handle live-update subscription (GET /events)
///
/// # Example Response
///
/// ```http
/// HTTP/1.1 200 OK
/// Content-Type: text/event-stream
///
/// event: connected
/// data: {"type":"connected","data":{"subscriberId":"...","message":"..."}}
///
/// event: taskCreated
/// data: {"type":"taskCreated","data":{"_id":"...","title":"T1",...}}
/// ```
pub async fn handle_live_events(
    State(hub): State<BroadcastHub>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let subscription = hub.register();
    tracing::info!("[Realtime] SSE subscriber {} active", subscription.id());

    let stream = stream::unfold(subscription, |mut subscription| async move {
        loop {
            let message = subscription.recv().await?;
            let data = match serde_json::to_string(&message) {
                Ok(data) => data,
                Err(e) => {
                    tracing::error!("[Realtime] Failed to serialize event: {:?}", e);
                    continue;
                }
            };
            let event = Event::default().event(message.type_name()).data(data);
            return Some((Ok::<_, Infallible>(event), subscription));
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
