use crate::error::{AppError, AppResult};
use crate::routes::messages::validate_send;
use crate::services::notification::Channel;
use crate::services::ChatService;
use crate::state::AppState;
use crate::websocket::message_types::WsInboundEvent;
use crate::websocket::SubscriberId;
use actix::{Actor, ActorContext, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub user_id: String,
}

// Serialized outbound frame forwarded from the registry
#[derive(ActixMessage)]
#[rtype(result = "()")]
struct Frame(String);

// A registry subscription finished registering
#[derive(ActixMessage)]
#[rtype(result = "()")]
struct Subscribed {
    channel: Channel,
    subscriber_id: SubscriberId,
}

struct WsSession {
    user_id: String,
    state: AppState,
    subscriptions: HashMap<Channel, SubscriberId>,
    hb: Instant,
}

/// Apply a ledger event received over the socket.
///
/// Subscription frames are handled by the session itself and are a no-op here.
async fn handle_ledger_event(chat: &ChatService, evt: WsInboundEvent) -> AppResult<()> {
    match evt {
        WsInboundEvent::SendMessage(request) => {
            validate_send(&request)?;
            chat.send_message(request).await;
        }
        WsInboundEvent::ReadReceipt(update) => {
            chat.apply_status_update(&update).await;
        }
        WsInboundEvent::Subscribe { .. } | WsInboundEvent::Unsubscribe { .. } => {}
    }
    Ok(())
}

impl WsSession {
    fn new(user_id: String, state: AppState) -> Self {
        Self {
            user_id,
            state,
            subscriptions: HashMap::new(),
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!(user_id = %act.user_id, "WebSocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    /// Register with the registry and forward its frames to this actor until
    /// either side goes away.
    fn subscribe(&self, channel: Channel, ctx: &mut ws::WebsocketContext<Self>) {
        if self.subscriptions.contains_key(&channel) {
            return;
        }

        let registry = self.state.registry.clone();
        let addr = ctx.address();
        actix::spawn(async move {
            let (subscriber_id, mut rx) = registry.add_subscriber(channel.clone()).await;
            addr.do_send(Subscribed {
                channel,
                subscriber_id,
            });

            while let Some(frame) = rx.recv().await {
                if !addr.connected() {
                    break;
                }
                addr.do_send(Frame(frame));
            }
        });
    }

    fn unsubscribe(&mut self, channel: &Channel) {
        if let Some(subscriber_id) = self.subscriptions.remove(channel) {
            let registry = self.state.registry.clone();
            let channel = channel.clone();
            actix::spawn(async move {
                registry.remove_subscriber(&channel, subscriber_id).await;
            });
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(user_id = %self.user_id, "WebSocket session started");
        self.hb(ctx);
        self.subscribe(Channel::UserQueue(self.user_id.clone()), ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            user_id = %self.user_id,
            subscriptions = self.subscriptions.len(),
            "WebSocket session stopped"
        );

        let channels: Vec<Channel> = self.subscriptions.keys().cloned().collect();
        for channel in channels {
            self.unsubscribe(&channel);
        }
    }
}

impl Handler<Frame> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Frame, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl Handler<Subscribed> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Subscribed, _ctx: &mut Self::Context) {
        if self.subscriptions.contains_key(&msg.channel) {
            // Lost a race against an earlier subscribe for the same channel.
            let registry = self.state.registry.clone();
            actix::spawn(async move {
                registry
                    .remove_subscriber(&msg.channel, msg.subscriber_id)
                    .await;
            });
            return;
        }
        tracing::debug!(user_id = %self.user_id, channel = %msg.channel, "subscribed");
        self.subscriptions.insert(msg.channel, msg.subscriber_id);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<WsInboundEvent>(&text) {
                Ok(WsInboundEvent::Subscribe { chat_key }) => {
                    self.subscribe(Channel::Topic(chat_key), ctx);
                }
                Ok(WsInboundEvent::Unsubscribe { chat_key }) => {
                    self.unsubscribe(&Channel::Topic(chat_key));
                }
                Ok(evt) => {
                    let chat = Arc::clone(&self.state.chat);
                    let user_id = self.user_id.clone();
                    actix::spawn(async move {
                        if let Err(e) = handle_ledger_event(&chat, evt).await {
                            tracing::warn!(%user_id, error = %e, "rejected WS frame");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(user_id = %self.user_id, error = %e, "failed to parse WS frame");
                }
            },
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("Binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!(?reason, "WebSocket close message received");
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                tracing::warn!(error = %e, "WebSocket protocol error");
                ctx.stop();
            }
            _ => {}
        }
    }
}

/// GET /ws?user_id=...
#[get("/ws")]
pub async fn ws_handler(
    state: web::Data<AppState>,
    query: web::Query<WsParams>,
    req: HttpRequest,
    stream: web::Payload,
) -> Result<HttpResponse, Error> {
    let user_id = query.into_inner().user_id;
    if user_id.trim().is_empty() {
        return Err(AppError::BadRequest("user_id must not be empty".into()).into());
    }

    ws::start(WsSession::new(user_id, state.get_ref().clone()), &req, stream)
}
