use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use env_logger::Env;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde_json::{json, Value};
use tactic_playbook_server::constants::{
    clamp_animation_speed_ms, DEFAULT_ANIMATION_SPEED_MS, TICK_MS,
};
use tactic_playbook_server::editor::{reduce, EditorState};
use tactic_playbook_server::engine::{now_ms, PlaybackEngine};
use tactic_playbook_server::geometry::screen_to_canvas;
use tactic_playbook_server::library::TacticLibrary;
use tactic_playbook_server::server_protocol::{parse_client_message, ParsedClientMessage};
use tactic_playbook_server::server_utils::{
    animation_speed_to_percent, percent_to_animation_speed, sanitize_name,
};
use tactic_playbook_server::tactic_file::{
    export_file_name, export_tactic_json, import_tactic_json,
};
use tactic_playbook_server::types::{MetadataPatch, Tactic};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

struct ServerConfig {
    port: u16,
    tactics_dir: Option<PathBuf>,
    animation_speed_ms: u64,
}

impl ServerConfig {
    fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);
        let tactics_dir = std::env::var("TACTICS_DIR").ok().map(PathBuf::from);
        let animation_speed_ms = std::env::var("ANIMATION_SPEED_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(clamp_animation_speed_ms)
            .unwrap_or(DEFAULT_ANIMATION_SPEED_MS);
        Self {
            port,
            tactics_dir,
            animation_speed_ms,
        }
    }
}

/// Per-connection state: what the client watches and what it edits.
struct Session {
    engine: Option<PlaybackEngine>,
    editor: EditorState,
}

struct ClientContext {
    tx: mpsc::Sender<String>,
    session: Session,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct ServerState {
    clients: HashMap<String, ClientContext>,
    library: TacticLibrary,
    animation_speed_ms: u64,
}

impl ServerState {
    fn new(library: TacticLibrary, animation_speed_ms: u64) -> Self {
        Self {
            clients: HashMap::new(),
            library,
            animation_speed_ms,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    let library = TacticLibrary::with_dir(config.tactics_dir.as_deref());
    info!(
        "[server] library loaded with {} tactics",
        library.tactics().len()
    );

    let state = Arc::new(Mutex::new(ServerState::new(
        library,
        config.animation_speed_ms,
    )));
    start_tick_loop(state.clone());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/library", get(library_handler))
        .route("/api/tactics/{id}/export", get(export_handler))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        info!("[server] static file root: {}", static_dir.display());
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        warn!("[server] static file root not found; serving the API only");
        app
    };

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("[server] failed to bind {bind_addr}: {err}");
            std::process::exit(1);
        }
    };

    info!("[server] listening on :{}", config.port);
    if let Err(err) = axum::serve(listener, app).await {
        error!("[server] runtime failed: {err}");
        std::process::exit(1);
    }
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    [PathBuf::from("dist"), PathBuf::from("public")]
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn library_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let guard = state.lock().await;
    Json(guard.library.build_response())
}

async fn export_handler(
    State(state): State<SharedState>,
    Path(tactic_id): Path<String>,
) -> impl IntoResponse {
    let guard = state.lock().await;
    let Some(tactic) = guard.library.find(&tactic_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "tactic not found" })),
        )
            .into_response();
    };
    match export_tactic_json(tactic) {
        Ok(text) => (
            [
                (header::CONTENT_TYPE, "application/json".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export_file_name(tactic)),
                ),
            ],
            text,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<String>(256);

    {
        let mut guard = state.lock().await;
        guard.clients.insert(
            client_id.clone(),
            ClientContext {
                tx: tx.clone(),
                session: Session {
                    engine: None,
                    editor: EditorState::default(),
                },
            },
        );
        let library = guard.library.build_response();
        send_to_client(
            &mut guard,
            &client_id,
            &json!({
                "type": "welcome",
                "clientId": client_id,
                "library": library,
            }),
            QueuePolicy::DisconnectOnFull,
        );
    }
    debug!("[server] {client_id} connected");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(&state, &client_id, raw.to_string()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = String::from_utf8(raw.to_vec()) {
                    handle_client_message(&state, &client_id, text).await;
                } else {
                    send_error_to_client(&state, &client_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    {
        let mut guard = state.lock().await;
        disconnect_client(&mut guard, &client_id);
    }
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: &SharedState, client_id: &str, raw: String) {
    let Some(message) = parse_client_message(&raw) else {
        send_error_to_client(state, client_id, "invalid message").await;
        return;
    };

    let now = now_ms();
    let mut guard = state.lock().await;
    let server = &mut *guard;
    let Some(client) = server.clients.get_mut(client_id) else {
        return;
    };
    let session = &mut client.session;

    let reply = match message {
        ParsedClientMessage::Ping { t } => Some(json!({ "type": "pong", "t": t })),
        ParsedClientMessage::Open { tactic_id } => match server.library.find(&tactic_id) {
            Some(tactic) => {
                let engine =
                    PlaybackEngine::new(tactic.clone(), server.animation_speed_ms, now);
                let view = engine.view();
                session.engine = Some(engine);
                session.editor = EditorState::with_tactic(tactic.clone());
                Some(json!({ "type": "view", "view": view }))
            }
            None => Some(error_message(&format!("unknown tactic {tactic_id}"))),
        },
        ParsedClientMessage::Duplicate { tactic_id } => match server.library.duplicate(&tactic_id)
        {
            Some(copy) => {
                session.editor = EditorState::with_tactic(copy);
                Some(editor_message(&session.editor))
            }
            None => Some(error_message(&format!("unknown tactic {tactic_id}"))),
        },
        ParsedClientMessage::Edit { action } => {
            session.editor = reduce(&session.editor, action);
            Some(editor_message(&session.editor))
        }
        ParsedClientMessage::Import { text } => match import_tactic_json(&text) {
            Ok(tactic) => {
                session.editor = EditorState::with_tactic(tactic);
                Some(editor_message(&session.editor))
            }
            Err(err) => {
                warn!("[server] {client_id} import rejected: {err}");
                Some(error_message(&err.to_string()))
            }
        },
        ParsedClientMessage::Export => match current_tactic(session) {
            Some(tactic) => match export_tactic_json(tactic) {
                Ok(text) => Some(json!({
                    "type": "exported",
                    "fileName": export_file_name(tactic),
                    "text": text,
                })),
                Err(err) => Some(error_message(&err.to_string())),
            },
            None => Some(error_message("nothing to export")),
        },
        ParsedClientMessage::Preview => match session.editor.tactic.clone() {
            Some(tactic) => {
                let tactic = tactic.update_metadata(&MetadataPatch {
                    name: Some(sanitize_name(&tactic.name)),
                    description: None,
                });
                if !server.library.publish(tactic.clone()) {
                    debug!(
                        "[server] {client_id} previews {} locally; library copy is pinned",
                        tactic.id
                    );
                }
                let view = match session.engine.as_mut() {
                    Some(engine) => {
                        engine.replace_tactic(tactic, now);
                        engine.view()
                    }
                    None => {
                        let engine = PlaybackEngine::new(tactic, server.animation_speed_ms, now);
                        let view = engine.view();
                        session.engine = Some(engine);
                        view
                    }
                };
                Some(json!({ "type": "view", "view": view }))
            }
            None => Some(error_message("nothing to preview")),
        },
        playback => match session.engine.as_mut() {
            Some(engine) => {
                apply_playback(engine, playback, now);
                Some(json!({
                    "type": "view",
                    "view": engine.view(),
                    "speedPercent": animation_speed_to_percent(engine.animation_speed_ms()),
                }))
            }
            None => Some(error_message("open a tactic first")),
        },
    };

    if let Some(reply) = reply {
        send_to_client(server, client_id, &reply, QueuePolicy::DisconnectOnFull);
    }
}

fn apply_playback(engine: &mut PlaybackEngine, message: ParsedClientMessage, now: u64) {
    match message {
        ParsedClientMessage::Next => {
            engine.next(now);
        }
        ParsedClientMessage::Prev => engine.back(now),
        ParsedClientMessage::Restart => engine.restart(now),
        ParsedClientMessage::TogglePlay => engine.toggle_play(now),
        ParsedClientMessage::SetZones { value } => engine.set_zones(value, now),
        ParsedClientMessage::SetArrows { value } => engine.set_arrows(value, now),
        ParsedClientMessage::SetSpeed { percent } => {
            engine.set_speed(percent_to_animation_speed(percent), now)
        }
        ParsedClientMessage::Tap {
            client_x,
            client_y,
            bounds,
        } => {
            let click = screen_to_canvas(client_x, client_y, bounds);
            let result = engine.interact(click, now);
            debug!(
                "[server] tap at ({}, {}) valid={}",
                click.x, click.y, result.is_valid
            );
        }
        _ => {}
    }
}

fn current_tactic(session: &Session) -> Option<&Tactic> {
    session
        .editor
        .tactic
        .as_ref()
        .or_else(|| session.engine.as_ref().map(PlaybackEngine::tactic))
}

fn editor_message(editor: &EditorState) -> Value {
    json!({ "type": "editor", "editor": editor })
}

fn error_message(message: &str) -> Value {
    json!({ "type": "error", "message": message })
}

fn start_tick_loop(state: SharedState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_sessions(&mut guard, now_ms());
        }
    });
}

fn tick_sessions(state: &mut ServerState, now: u64) {
    let mut updates = Vec::new();
    for (client_id, client) in state.clients.iter_mut() {
        let Some(engine) = client.session.engine.as_mut() else {
            continue;
        };
        if engine.tick(now) {
            updates.push((client_id.clone(), json!({ "type": "view", "view": engine.view() })));
        }
    }
    for (client_id, message) in updates {
        send_to_client(state, &client_id, &message, QueuePolicy::DropOnFull);
    }
}

fn disconnect_client(state: &mut ServerState, client_id: &str) {
    let Some(mut context) = state.clients.remove(client_id) else {
        return;
    };
    if let Some(engine) = context.session.engine.as_mut() {
        engine.shutdown();
    }
    debug!("[server] {client_id} disconnected");
}

fn send_to_client(state: &mut ServerState, client_id: &str, message: &Value, policy: QueuePolicy) {
    let send_failed = if let Some(client) = state.clients.get(client_id) {
        client.tx.try_send(message.to_string()).is_err()
    } else {
        false
    };
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        warn!("[server] outbound queue full for {client_id}; disconnecting");
        disconnect_client(state, client_id);
    }
}

async fn send_error_to_client(state: &SharedState, client_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_to_client(
        &mut guard,
        client_id,
        &error_message(message),
        QueuePolicy::DisconnectOnFull,
    );
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let salt: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{prefix}_{seq}_{salt}")
}
