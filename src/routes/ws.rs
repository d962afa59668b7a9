//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. Requests get one JSON reply each; `topic_input`
//! replies arrive later, debounced, through the outbound channel.

use std::sync::Arc;
use std::time::Duration;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use base64::Engine as _;
use tokio::sync::mpsc;
use tracing::{info, error, instrument, debug};

use crate::logic;
use crate::protocol::{to_out, ClientWsMessage, ServerWsMessage};
use crate::render::RenderOptions;
use crate::state::AppState;
use crate::suggest::{debounced, SuggestionSequencer};

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "testsmith", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "testsmith", "WebSocket connected");
  let sequencer = Arc::new(SuggestionSequencer::new());
  let (tx, mut rx) = mpsc::channel::<ServerWsMessage>(16);

  loop {
    let reply = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(ClientWsMessage::TopicInput { topic, context }) => {
            spawn_suggestions(&state, &sequencer, tx.clone(), topic, context);
            None
          }
          Ok(incoming) => {
            debug!(target: "testsmith", "WS received: {:?}", &incoming);
            Some(handle_client_ws(incoming, &state).await)
          }
          Err(e) => Some(ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }),
        },
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          None
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Ok(_)) => None,
        Some(Err(e)) => {
          error!(target: "testsmith", error = %e, "WS receive error");
          break;
        }
      },
      Some(out) = rx.recv() => Some(out),
    };

    let Some(reply) = reply else { continue };
    let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "testsmith", error = %e, "WS send error");
      break;
    }
  }
  info!(target: "testsmith", "WebSocket disconnected");
}

/// Issue a new generation and fetch after the quiet window, unless superseded.
fn spawn_suggestions(
  state: &Arc<AppState>,
  sequencer: &Arc<SuggestionSequencer>,
  tx: mpsc::Sender<ServerWsMessage>,
  topic: String,
  context: Option<String>,
) {
  let ticket = sequencer.issue();
  let window = Duration::from_millis(state.settings.suggest_debounce_ms);
  let state = state.clone();
  let sequencer = sequencer.clone();
  tokio::spawn(async move {
    let fetched = debounced(&sequencer, ticket, window, || {
      logic::suggestions_for_input(&state, &topic, context.as_deref())
    })
    .await;
    if let Some(items) = fetched {
      let _ = tx.send(ServerWsMessage::Suggestions { topic, items }).await;
    }
  });
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Generate(req) => match logic::generate(state, &req).await {
      Ok((section, updated)) => {
        info!(target: "generation", category = %req.category, %updated, "WS generate served");
        ServerWsMessage::Section { section: to_out(section, RenderOptions::default()), updated }
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::Refine { category, instruction } => match logic::refine(state, category, &instruction).await {
      Ok((section, updated)) => ServerWsMessage::Section { section: to_out(section, RenderOptions::default()), updated },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::Export { topic } => match logic::export(state, &topic).await {
      Ok(doc) => ServerWsMessage::Export {
        file_name: doc.file_name,
        data_base64: base64::engine::general_purpose::STANDARD.encode(doc.bytes),
      },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::Reset => {
      logic::reset(state).await;
      ServerWsMessage::Reset
    }

    // Handled in the loop; kept for exhaustiveness.
    ClientWsMessage::TopicInput { .. } => ServerWsMessage::Error { message: "unexpected topic_input".into() },
  }
}
