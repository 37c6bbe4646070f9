use crate::auth::AuthenticatedPrincipal;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use event_broker::{ObserverId, Topic};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client membership command: join or leave topics.
#[derive(Debug, Clone, Deserialize)]
struct TopicCommand {
    /// "subscribe" or "unsubscribe"
    action: String,
    topics: Vec<String>,
}

/// Acknowledgement for a membership command.
#[derive(Debug, Clone, Serialize)]
struct TopicAck {
    action: String,
    topics: Vec<String>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Response, AppError> {
    state
        .rate_limiter
        .check_rate_limit(&format!("{}:ws_connections", principal.id), 10, 1.0)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

/// Relay loop for one observer connection.
///
/// Inbound frames carry membership commands; outbound frames are the
/// broker envelopes for every topic the observer has joined. When the
/// broker evicts the observer (lagging queue) the event channel closes
/// and the socket is shut down; the client re-fetches authoritative
/// state on reconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (observer_id, mut events) = state.broker.register();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            envelope = events.recv() => {
                let Some(envelope) = envelope else {
                    debug!(observer_id, "event channel closed, dropping socket");
                    break;
                };
                let Ok(frame) = serde_json::to_string(&envelope) else {
                    continue;
                };
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let ack = apply_command(&state, observer_id, &text);
                        let Ok(frame) = serde_json::to_string(&ack) else {
                            continue;
                        };
                        if sink.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    state.broker.disconnect(observer_id);
}

/// Parse and apply one join/leave command, reporting per-batch success.
fn apply_command(state: &AppState, observer_id: ObserverId, text: &str) -> TopicAck {
    let command: TopicCommand = match serde_json::from_str(text) {
        Ok(command) => command,
        Err(err) => {
            return TopicAck {
                action: "error".to_string(),
                topics: Vec::new(),
                success: false,
                error: Some(format!("malformed command: {}", err)),
            };
        }
    };

    let mut parsed = Vec::with_capacity(command.topics.len());
    for raw in &command.topics {
        match Topic::parse(raw) {
            Some(topic) => parsed.push(topic),
            None => {
                return TopicAck {
                    action: command.action,
                    topics: command.topics.clone(),
                    success: false,
                    error: Some(format!("unknown topic: {}", raw)),
                };
            }
        }
    }

    let result = match command.action.as_str() {
        "subscribe" => parsed
            .iter()
            .try_for_each(|topic| state.broker.subscribe(observer_id, topic))
            .map_err(|e| e.to_string()),
        "unsubscribe" => {
            for topic in &parsed {
                state.broker.unsubscribe(observer_id, topic);
            }
            Ok(())
        }
        other => Err(format!("unknown action: {}", other)),
    };

    match result {
        Ok(()) => TopicAck {
            action: command.action,
            topics: command.topics,
            success: true,
            error: None,
        },
        Err(error) => TopicAck {
            action: command.action,
            topics: command.topics,
            success: false,
            error: Some(error),
        },
    }
}
