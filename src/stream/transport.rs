//! WebSocket I/O task for the streaming channel.
//!
//! One task per connect attempt. It reports open, text frames, and close
//! through a caller-supplied wrapper so the event loop sees them as its own
//! messages. Reconnect decisions stay with the connection manager.

use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Lifecycle events of one socket, tagged with its connect generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Opened { generation: u64 },
    Frame { generation: u64, text: String },
    Closed { generation: u64, reason: String },
}

/// Spawn the socket task for `url`.
///
/// Construction failure is reported as `Closed`, exactly like a drop after
/// open. Aborting the returned handle silently discards the socket.
pub fn spawn_stream<M, F>(
    url: String,
    generation: u64,
    tx: UnboundedSender<M>,
    wrap: F,
) -> JoinHandle<()>
where
    M: Send + 'static,
    F: Fn(StreamEvent) -> M + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let reason = run_stream(&url, generation, &tx, &wrap).await;
        let _ = tx.send(wrap(StreamEvent::Closed { generation, reason }));
    })
}

async fn run_stream<M, F>(url: &str, generation: u64, tx: &UnboundedSender<M>, wrap: &F) -> String
where
    F: Fn(StreamEvent) -> M,
{
    tracing::info!(%url, generation, "connecting stream");
    let mut socket = match connect_async(url).await {
        Ok((socket, _response)) => socket,
        Err(error) => {
            tracing::warn!(%url, generation, %error, "stream connect failed");
            return error.to_string();
        }
    };

    tracing::info!(generation, "stream open");
    if tx.send(wrap(StreamEvent::Opened { generation })).is_err() {
        return "event loop gone".to_string();
    }

    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => {
                if tx.send(wrap(StreamEvent::Frame { generation, text })).is_err() {
                    return "event loop gone".to_string();
                }
            }
            Some(Ok(Message::Close(frame))) => {
                let reason = frame.map_or_else(|| "closed".to_string(), |f| f.reason.to_string());
                tracing::info!(generation, %reason, "stream closed by server");
                return reason;
            }
            // Binary, ping and pong frames carry nothing for the client.
            Some(Ok(_)) => {}
            Some(Err(error)) => {
                tracing::warn!(generation, %error, "stream read failed");
                return error.to_string();
            }
            None => {
                tracing::info!(generation, "stream ended");
                return "stream ended".to_string();
            }
        }
    }
}
