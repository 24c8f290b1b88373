pub mod chat;
pub mod sessions;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use safari_core::{
    compute_total, quote, BookingError, BookingRequest, BookingWizard, Catalog, ChatMessage,
    DestinationListing, Post, PriceTables, PricingError, Quote, ResponseTable, TripDraft,
};
use safari_observability::AppMetrics;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub use chat::{BotReply, ChatError, ChatSession, PendingReply, DEFAULT_REPLY_DELAY};
pub use sessions::SessionRegistry;

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub reply_delay: Duration,
    pub session_ttl: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            reply_delay: DEFAULT_REPLY_DELAY,
            session_ttl: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub session_id: Option<Uuid>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatExchange {
    pub session_id: Uuid,
    pub user_message: Option<ChatMessage>,
    pub reply: Option<ChatMessage>,
    pub matched_keyword: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSearch {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<T> {
    pub total: usize,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptView {
    pub session_id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub quick_replies: Vec<String>,
}

/// Entry point for the booking and chat surfaces.
#[derive(Clone)]
pub struct SafariAgent {
    tables: Arc<PriceTables>,
    catalog: Arc<Catalog>,
    sessions: Arc<SessionRegistry>,
    metrics: Arc<AppMetrics>,
}

impl SafariAgent {
    pub fn new(
        tables: PriceTables,
        responses: ResponseTable,
        settings: AgentSettings,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        let sessions = SessionRegistry::new(
            Arc::new(responses),
            settings.reply_delay,
            settings.session_ttl,
        );

        Self {
            tables: Arc::new(tables),
            catalog: Arc::new(Catalog::default()),
            sessions: Arc::new(sessions),
            metrics,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn price_tables(&self) -> &PriceTables {
        &self.tables
    }

    #[instrument(skip(self, search))]
    pub fn search_destinations(
        &self,
        search: &CatalogSearch,
    ) -> SearchResults<DestinationListing> {
        let started = Instant::now();
        self.metrics.inc_request();
        let results = self
            .catalog
            .filter_destinations(&search.q, search.category.as_deref())
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        self.metrics.observe_latency(started.elapsed());
        info!(
            category = ?search.category,
            total = results.len(),
            "destinations searched"
        );
        SearchResults {
            total: results.len(),
            results,
        }
    }

    #[instrument(skip(self, search))]
    pub fn search_posts(&self, search: &CatalogSearch) -> SearchResults<Post> {
        let started = Instant::now();
        self.metrics.inc_request();
        let results = self
            .catalog
            .filter_posts(&search.q, search.category.as_deref())
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        self.metrics.observe_latency(started.elapsed());
        info!(category = ?search.category, total = results.len(), "posts searched");
        SearchResults {
            total: results.len(),
            results,
        }
    }

    pub fn estimate(&self, draft: &TripDraft) -> u64 {
        compute_total(draft, &self.tables)
    }

    #[instrument(skip(self, draft))]
    pub fn quote(&self, draft: &TripDraft) -> Result<Quote, PricingError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let result = quote(draft, &self.tables);
        self.metrics.observe_latency(started.elapsed());

        match result {
            Ok(quote) => {
                self.metrics.inc_quote();
                info!(
                    destination = %quote.destination_id,
                    days = quote.duration_days,
                    party_size = quote.party_size,
                    total = quote.total,
                    "quote computed"
                );
                Ok(quote)
            }
            Err(error) => {
                self.metrics.inc_quote_rejected();
                warn!(code = error.code(), %error, "quote rejected");
                Err(error)
            }
        }
    }

    #[instrument(skip(self, wizard))]
    pub fn submit_booking(&self, wizard: &BookingWizard) -> Result<BookingRequest, BookingError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let result = wizard.submit(&self.tables);
        self.metrics.observe_latency(started.elapsed());

        let request = result.inspect_err(|error| {
            self.metrics.inc_booking_rejected();
            warn!(code = error.code(), %error, "booking rejected");
        })?;

        self.metrics.inc_booking();
        info!(
            reference = %request.reference,
            total = request.quote.total,
            "booking request accepted"
        );
        Ok(request)
    }

    /// Sends one visitor message and waits for the delayed bot reply.
    ///
    /// Blank input only opens (or refreshes) the session. Over-long input is
    /// refused with [`ChatError::InputTooLong`].
    #[instrument(skip(self, input))]
    pub async fn chat(&self, input: ChatInput) -> Result<ChatExchange, ChatError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let (session_id, session) = self.sessions.resume_or_start(input.session_id);
        let empty_exchange = ChatExchange {
            session_id,
            user_message: None,
            reply: None,
            matched_keyword: None,
        };

        let sent = session.send(&input.text);
        let pending = match sent {
            Ok(pending) => pending,
            Err(ChatError::BlankInput) => {
                self.metrics.observe_latency(started.elapsed());
                return Ok(empty_exchange);
            }
            Err(ChatError::SessionClosed) => {
                // closed between lookup and send
                warn!(session_id = %session_id, "chat session closed before send");
                self.metrics.observe_latency(started.elapsed());
                return Ok(empty_exchange);
            }
            Err(error) => {
                warn!(
                    session_id = %session_id,
                    code = error.code(),
                    %error,
                    "chat input refused"
                );
                self.metrics.observe_latency(started.elapsed());
                return Err(error);
            }
        };
        self.metrics.inc_chat_message();

        let user_message = pending.user_message.clone();
        let waited = pending.wait().await;
        self.metrics.observe_latency(started.elapsed());

        let reply = match waited {
            Ok(reply) => reply,
            Err(ChatError::ReplyCancelled) => {
                self.metrics.add_cancelled_replies(1);
                warn!(session_id = %session_id, "chat reply cancelled");
                return Ok(ChatExchange {
                    user_message: Some(user_message),
                    ..empty_exchange
                });
            }
            Err(error) => return Err(error),
        };

        if reply.is_fallback() {
            self.metrics.inc_fallback();
        }

        info!(
            session_id = %session_id,
            keyword = ?reply.matched_keyword,
            message_id = reply.message.id,
            "chat handled"
        );

        Ok(ChatExchange {
            session_id,
            user_message: Some(user_message),
            matched_keyword: reply.matched_keyword,
            reply: Some(reply.message),
        })
    }

    pub fn transcript(&self, session_id: &Uuid) -> Option<TranscriptView> {
        let session = self.sessions.get(session_id)?;
        Some(TranscriptView {
            session_id: *session_id,
            messages: session.transcript(),
            quick_replies: session.quick_replies(),
        })
    }

    pub fn close_session(&self, session_id: &Uuid) -> Option<usize> {
        let cancelled = self.sessions.close(session_id)?;
        self.metrics.add_cancelled_replies(cancelled);
        Some(cancelled)
    }

    pub fn purge_expired_sessions(&self) -> u64 {
        let (removed, cancelled) = self.sessions.purge_expired(Utc::now());
        self.metrics.add_cancelled_replies(cancelled);
        if removed > 0 {
            info!(removed, cancelled, "expired chat sessions purged");
        }
        removed
    }
}
