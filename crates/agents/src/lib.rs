use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Duration as TtlDuration, Utc};
use orchid_core::{
    build_stay_quote, classify_intent, compose_reply, filter_rooms, find_room, normalize_text,
    viewing_room_nudge, CatalogError, ChatInput, ChatMessage, ChatReply, ChatSession, HotelInfo,
    Intent, MessageRole, Room, SearchParams, StayQuote, GREETING,
};
use orchid_observability::AppMetrics;
use orchid_storage::SessionRepository;
use tracing::{info, instrument};
use uuid::Uuid;

const SESSION_TTL_HOURS: i64 = 24;
const MAX_SESSION_MESSAGES: usize = 80;

/// Fixed simulated-latency delay before the assistant reply is appended.
/// The delay must stay constant: back-to-back sends in one session append
/// their replies in send order only while every reply waits the same amount.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct ConciergeAgent<S>
where
    S: SessionRepository,
{
    rooms: Vec<Room>,
    info: HotelInfo,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
    reply_delay: Duration,
}

impl<S> ConciergeAgent<S>
where
    S: SessionRepository,
{
    pub fn new(rooms: Vec<Room>, info: HotelInfo, store: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            rooms,
            info,
            store,
            metrics,
            reply_delay: DEFAULT_REPLY_DELAY,
        }
    }

    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn hotel_info(&self) -> &HotelInfo {
        &self.info
    }

    #[instrument(skip(self, input))]
    pub async fn handle_chat(&self, input: ChatInput) -> Result<ChatReply> {
        let started = Instant::now();
        self.metrics.inc_request();

        let normalized = normalize_text(&input.text);
        let intent = classify_intent(&normalized);
        let room = input.room_id.and_then(|id| find_room(&self.rooms, id));

        let quote = match (intent, room) {
            (Intent::Booking, Some(room)) => {
                self.metrics.inc_quote();
                Some(build_stay_quote(
                    room,
                    &input.search,
                    Utc::now().date_naive(),
                    &mut rand::rng(),
                ))
            }
            _ => None,
        };
        if intent == Intent::Unknown {
            self.metrics.inc_fallback();
        }

        let reply_text = compose_reply(intent, room, &input.search, &self.info, quote.as_ref());

        let session_id = input
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.append_message(&session_id, room, MessageRole::User, &input.text)
            .await?;

        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }

        self.append_message(&session_id, room, MessageRole::Assistant, &reply_text)
            .await?;

        self.metrics.observe_latency(started.elapsed());
        info!(
            session_id = %session_id,
            intent = ?intent,
            quoted = quote.is_some(),
            "chat handled"
        );

        Ok(ChatReply {
            session_id,
            reply_text,
            intent,
            quote,
        })
    }

    pub fn list_rooms(&self, params: &SearchParams) -> Vec<Room> {
        filter_rooms(&self.rooms, params)
    }

    pub fn room(&self, id: u32) -> Option<Room> {
        find_room(&self.rooms, id).cloned()
    }

    pub fn quote(&self, room_id: u32, params: &SearchParams) -> Result<StayQuote, CatalogError> {
        let room = find_room(&self.rooms, room_id).ok_or(CatalogError::UnknownRoom(room_id))?;
        self.metrics.inc_quote();
        Ok(build_stay_quote(
            room,
            params,
            Utc::now().date_naive(),
            &mut rand::rng(),
        ))
    }

    pub async fn history(&self, session_id: &str) -> Result<Option<ChatSession>> {
        self.store.load_session(session_id).await
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.store.purge_expired(Utc::now()).await
    }

    async fn append_message(
        &self,
        session_id: &str,
        viewing: Option<&Room>,
        role: MessageRole,
        text: &str,
    ) -> Result<()> {
        let mut session = self
            .store
            .load_session(session_id)
            .await?
            .unwrap_or_else(|| self.seed_session(session_id, viewing));

        session.expires_at = Utc::now() + TtlDuration::hours(SESSION_TTL_HOURS);
        session.messages.push(ChatMessage {
            at: Utc::now(),
            role,
            text: text.to_string(),
        });

        if session.messages.len() > MAX_SESSION_MESSAGES {
            let keep_from = session.messages.len() - MAX_SESSION_MESSAGES;
            session.messages = session.messages.split_off(keep_from);
        }

        self.store.upsert_session(&session).await
    }

    fn seed_session(&self, session_id: &str, viewing: Option<&Room>) -> ChatSession {
        let now = Utc::now();
        let mut messages = vec![ChatMessage {
            at: now,
            role: MessageRole::Assistant,
            text: GREETING.to_string(),
        }];
        if let Some(room) = viewing {
            messages.push(ChatMessage {
                at: now,
                role: MessageRole::Assistant,
                text: viewing_room_nudge(room),
            });
        }

        ChatSession {
            session_id: session_id.to_string(),
            expires_at: now + TtlDuration::hours(SESSION_TTL_HOURS),
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchid_core::responder::SELECT_ROOM_PROMPT;
    use orchid_core::room_catalog;
    use orchid_storage::MemoryStore;

    fn agent() -> ConciergeAgent<MemoryStore> {
        ConciergeAgent::new(
            room_catalog(),
            HotelInfo::default(),
            Arc::new(MemoryStore::new()),
            AppMetrics::shared(),
        )
        .with_reply_delay(Duration::ZERO)
    }

    fn booking_input(room_id: Option<u32>) -> ChatInput {
        ChatInput {
            session_id: None,
            text: "ยืนยัน".to_string(),
            room_id,
            search: SearchParams::default(),
        }
    }

    #[tokio::test]
    async fn booking_with_selected_room_returns_a_quote() {
        let agent = agent();
        let reply = agent.handle_chat(booking_input(Some(2))).await.unwrap();

        assert_eq!(reply.intent, Intent::Booking);
        let quote = reply.quote.expect("booking with a room draws a quote");
        assert_eq!(quote.nights, 1);
        assert_eq!(quote.subtotal, 8000);
        assert!(reply.reply_text.contains(&quote.bill_code));
    }

    #[tokio::test]
    async fn booking_without_room_never_draws_a_quote() {
        let agent = agent();
        let reply = agent.handle_chat(booking_input(None)).await.unwrap();

        assert_eq!(reply.intent, Intent::Booking);
        assert!(reply.quote.is_none());
        assert_eq!(reply.reply_text, SELECT_ROOM_PROMPT);
    }

    #[tokio::test]
    async fn fresh_session_is_seeded_with_greeting_and_nudge() {
        let agent = agent();
        let reply = agent.handle_chat(booking_input(Some(1))).await.unwrap();

        let session = agent
            .history(&reply.session_id)
            .await
            .unwrap()
            .expect("session persisted");

        // greeting, nudge, user message, assistant reply
        assert_eq!(session.messages.len(), 4);
        assert_eq!(session.messages[0].text, GREETING);
        assert_eq!(session.messages[2].role, MessageRole::User);
        assert_eq!(session.messages[3].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn messages_append_in_send_order_within_a_session() {
        let agent = agent();
        let first = agent.handle_chat(booking_input(None)).await.unwrap();

        let followup = ChatInput {
            session_id: Some(first.session_id.clone()),
            text: "breakfast".to_string(),
            room_id: None,
            search: SearchParams::default(),
        };
        let second = agent.handle_chat(followup).await.unwrap();
        assert_eq!(second.intent, Intent::Breakfast);

        let session = agent.history(&first.session_id).await.unwrap().unwrap();
        let texts: Vec<&str> = session
            .messages
            .iter()
            .filter(|message| message.role == MessageRole::User)
            .map(|message| message.text.as_str())
            .collect();
        assert_eq!(texts, vec!["ยืนยัน", "breakfast"]);
    }

    #[tokio::test]
    async fn quote_for_unknown_room_is_an_error() {
        let agent = agent();
        let result = agent.quote(99, &SearchParams::default());
        assert!(matches!(result, Err(CatalogError::UnknownRoom(99))));
    }
}
