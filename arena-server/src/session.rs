//! Session endpoint (C11, §4.11): one task per WebSocket connection.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use arena_proto::{decode_frame, decode_select_mode, MessageType};

use crate::lobby::LobbyEvent;

/// Runs for the lifetime of one connection: accepts the WebSocket
/// handshake, spawns its own send loop, and drives the receive loop
/// until the socket closes.
pub async fn handle_connection(
    stream: TcpStream,
    session_id: u64,
    lobby_tx: mpsc::UnboundedSender<LobbyEvent>,
) -> anyhow::Result<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    lobby_tx.send(LobbyEvent::Connected { session_id, outbox: outbox_tx })?;

    let send_task = tokio::spawn(async move {
        while let Some(frame) = outbox_rx.recv().await {
            if ws_tx.send(Message::Binary(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = ws_rx.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(_) => break,
        };
        let bytes = match msg {
            Message::Binary(b) => b,
            Message::Close(_) => break,
            _ => continue,
        };
        match decode_frame(&bytes) {
            Ok((MessageType::ClientReady, _)) => {
                let _ = lobby_tx.send(LobbyEvent::ClientReady(session_id));
            }
            Ok((MessageType::SelectMode, payload)) => {
                if let Ok(mode) = decode_select_mode(payload) {
                    let _ = lobby_tx.send(LobbyEvent::SelectMode(session_id, mode));
                }
            }
            Ok((other, _)) => {
                debug!(session_id, ?other, "ignoring client-to-server message of unexpected type");
            }
            Err(e) => {
                debug!(session_id, error = %e, "dropping malformed frame");
            }
        }
    }

    send_task.abort();
    let _ = lobby_tx.send(LobbyEvent::Disconnected(session_id));
    Ok(())
}
