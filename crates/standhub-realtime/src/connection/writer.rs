//! Outbound writer task.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::handle::ConnectionHandle;

/// Drain a connection's outbound queue into its socket sink.
///
/// Runs until the connection is released, the queue closes, or a write
/// fails. On release every frame already queued is flushed before the close
/// frame goes out.
pub async fn run_writer<S>(
    mut sink: S,
    mut outbound: mpsc::Receiver<String>,
    handle: Arc<ConnectionHandle>,
    ping_interval: Option<Duration>,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut ping = ping_interval.map(|period| {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        tokio::select! {
            biased;

            _ = handle.released() => {
                outbound.close();
                while let Some(frame) = outbound.recv().await {
                    if let Err(e) = sink.send(Message::Text(frame.into())).await {
                        debug!(conn_id = %handle.id, error = %e, "Flush on release failed");
                        break;
                    }
                }
                let _ = sink.send(Message::Close(None)).await;
                break;
            }

            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                if let Err(e) = sink.send(Message::Text(frame.into())).await {
                    warn!(conn_id = %handle.id, error = %e, "WebSocket write failed");
                    handle.mark_dead();
                    break;
                }
            }

            _ = async {
                match ping.as_mut() {
                    Some(interval) => {
                        interval.tick().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            } => {
                if let Err(e) = sink.send(Message::Ping(Default::default())).await {
                    debug!(conn_id = %handle.id, error = %e, "Ping failed");
                    handle.mark_dead();
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;
    debug!(conn_id = %handle.id, "Writer finished");
}
