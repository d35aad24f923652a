pub mod handlers;
mod moderator;
mod player;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitStream, Stream, StreamExt},
};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::ProtocolError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::SessionHandle;
use crate::state::AppState;
use crate::types::Identity;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one connection from registration to cleanup
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (session, mut outbound_rx) = SessionHandle::channel();

    // Writer task drains frames pushed by broadcasts and replies
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    let Some(identity) = await_registration(&mut receiver, &session, &state).await else {
        finalize(writer_task, session).await;
        return;
    };

    // Run the receive loop as its own task so cleanup happens even if it panics
    let receive_task = tokio::spawn(receive_loop(
        receiver,
        Arc::clone(&state),
        identity.clone(),
        session.clone(),
    ));
    if let Err(e) = receive_task.await {
        tracing::error!("Session task for {} ended abnormally: {}", identity.name, e);
    }

    state.disconnect(&identity).await;
    finalize(writer_task, session).await;
    tracing::info!("WebSocket connection closed for {}", identity.name);
}

/// Wait for the `register` envelope. Anything else closes the connection.
async fn await_registration<S>(
    receiver: &mut S,
    session: &SessionHandle,
    state: &AppState,
) -> Option<Identity>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let text = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => break text,
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Binary(_))) => {
                tracing::warn!("Binary frame received before registration");
                return None;
            }
            Some(Ok(Message::Close(frame))) => {
                log_close("unregistered client", frame.as_ref());
                return None;
            }
            Some(Err(e)) => {
                log_receive_error("unregistered client", &e);
                return None;
            }
            None => return None,
        }
    };

    let registration = match ClientMessage::parse(text.as_str()) {
        Ok(ClientMessage::Register(registration)) => registration,
        Ok(other) => {
            tracing::warn!("First message must be registration, got {}", other.kind());
            return None;
        }
        Err(e) => {
            tracing::warn!("Registration parse error: {}", e);
            return None;
        }
    };

    match state.register(&registration, session.clone()).await {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::warn!("Refused registration for {}: {}", registration.name, e);
            if let Err(e) = session.send(&ServerMessage::error(e.to_string())) {
                tracing::warn!("Failed to send registration error: {}", e);
            }
            None
        }
    }
}

/// Process envelopes from a registered client until the socket closes
async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    identity: Identity,
    session: SessionHandle,
) {
    while let Some(incoming) = receiver.next().await {
        match incoming {
            Ok(Message::Text(text)) => {
                tracing::debug!("Received from {}: {}", identity.name, text.as_str());

                let msg = match ClientMessage::parse(text.as_str()) {
                    Ok(msg) => msg,
                    Err(ProtocolError::Json(e)) => {
                        tracing::warn!("Malformed envelope from {}: {}", identity.name, e);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring message from {}: {}", identity.name, e);
                        continue;
                    }
                };

                if let Some(reply) = handlers::handle_message(msg, &identity, &state).await {
                    if let Err(e) = session.send(&reply) {
                        tracing::warn!("Failed to reply to {}: {}", identity.name, e);
                        break;
                    }
                }
            }
            Ok(Message::Close(frame)) => {
                log_close(&identity.name, frame.as_ref());
                break;
            }
            Ok(_) => {}
            Err(e) => {
                log_receive_error(&identity.name, &e);
                break;
            }
        }
    }
}

async fn finalize(writer_task: JoinHandle<()>, session: SessionHandle) {
    drop(session);
    let _ = writer_task.await;
}

/// Close codes that mean the peer simply went away
pub fn is_normal_close_code(code: u16) -> bool {
    matches!(
        code,
        close_code::NORMAL | close_code::AWAY | close_code::STATUS | close_code::ABNORMAL
    )
}

/// Whether a receive error is just the peer vanishing without a close handshake
pub fn is_abrupt_disconnect(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        if e.to_string().contains("without closing handshake") {
            return true;
        }
        source = e.source();
    }
    false
}

fn log_close(who: &str, frame: Option<&CloseFrame>) {
    match frame {
        Some(frame) if !is_normal_close_code(frame.code) => {
            tracing::warn!(
                "{} closed with code {}: {}",
                who,
                frame.code,
                frame.reason.as_str()
            );
        }
        _ => tracing::info!("{} closed the connection", who),
    }
}

fn log_receive_error(who: &str, err: &axum::Error) {
    if is_abrupt_disconnect(err) {
        tracing::info!("{} dropped the connection", who);
    } else {
        tracing::warn!("Read error from {}: {}", who, err);
    }
}
