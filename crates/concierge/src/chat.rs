use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use safari_core::{
    exceeds_input_limit, match_intent, Author, ChatMessage, ResponseTable, MAX_CHAT_INPUT_GRAPHEMES,
};
use serde::Serialize;
use thiserror::Error;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    BlankInput,
    #[error("message is longer than {max} characters")]
    InputTooLong { max: usize },
    #[error("chat session is closed")]
    SessionClosed,
    #[error("reply was cancelled before it was delivered")]
    ReplyCancelled,
    #[error("reply task failed: {0}")]
    ReplyFailed(String),
}

impl ChatError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlankInput => "blank_input",
            Self::InputTooLong { .. } => "input_too_long",
            Self::SessionClosed => "session_closed",
            Self::ReplyCancelled => "reply_cancelled",
            Self::ReplyFailed(_) => "reply_failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BotReply {
    pub message: ChatMessage,
    pub matched_keyword: Option<String>,
}

impl BotReply {
    pub fn is_fallback(&self) -> bool {
        self.matched_keyword.is_none()
    }
}

#[derive(Debug)]
struct Transcript {
    next_id: u64,
    messages: Vec<ChatMessage>,
    closed: bool,
}

impl Transcript {
    fn append(&mut self, text: String, author: Author) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id,
            text,
            author,
            timestamp: Utc::now(),
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }
}

/// A bot reply scheduled by [`ChatSession::send`].
#[derive(Debug)]
pub struct PendingReply {
    pub user_message: ChatMessage,
    handle: JoinHandle<Option<BotReply>>,
}

impl PendingReply {
    pub async fn wait(self) -> Result<BotReply, ChatError> {
        match self.handle.await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(ChatError::ReplyCancelled),
            Err(error) if error.is_cancelled() => Err(ChatError::ReplyCancelled),
            Err(error) => Err(ChatError::ReplyFailed(error.to_string())),
        }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}

/// One visitor's conversation with the chat widget.
///
/// Replies are appended after `delay` by background tasks. Closing or
/// dropping the session aborts every reply still waiting, so nothing is
/// appended to a session that is gone.
#[derive(Debug)]
pub struct ChatSession {
    table: Arc<ResponseTable>,
    delay: Duration,
    transcript: Arc<Mutex<Transcript>>,
    pending: Mutex<Vec<AbortHandle>>,
}

impl ChatSession {
    pub fn new(table: Arc<ResponseTable>, delay: Duration) -> Self {
        let mut transcript = Transcript {
            next_id: 1,
            messages: Vec::new(),
            closed: false,
        };
        transcript.append(table.greeting.clone(), Author::Bot);

        Self {
            table,
            delay,
            transcript: Arc::new(Mutex::new(transcript)),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Appends the visitor's message exactly as typed and schedules the bot
    /// reply, matched against that same text.
    ///
    /// Blank input is refused and so is input past the grapheme limit; neither
    /// touches the transcript. Must be called from within a tokio runtime.
    pub fn send(&self, text: &str) -> Result<PendingReply, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::BlankInput);
        }
        if exceeds_input_limit(text) {
            return Err(ChatError::InputTooLong {
                max: MAX_CHAT_INPUT_GRAPHEMES,
            });
        }

        let user_message = {
            let mut transcript = self.transcript.lock();
            if transcript.closed {
                return Err(ChatError::SessionClosed);
            }
            transcript.append(text.to_string(), Author::User)
        };

        let text = text.to_string();
        let table = self.table.clone();
        let transcript = self.transcript.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let matched = match_intent(&table, &text);
            debug!(keyword = ?matched.keyword, "chat keyword matched");

            let mut transcript = transcript.lock();
            if transcript.closed {
                return None;
            }
            let message = transcript.append(matched.response.to_string(), Author::Bot);
            Some(BotReply {
                message,
                matched_keyword: matched.keyword.map(ToString::to_string),
            })
        });

        let mut pending = self.pending.lock();
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle.abort_handle());

        Ok(PendingReply {
            user_message,
            handle,
        })
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.lock().messages.clone()
    }

    /// Suggestions offered while only the greeting has been shown.
    pub fn quick_replies(&self) -> Vec<String> {
        if self.transcript.lock().messages.len() == 1 {
            self.table.quick_replies.clone()
        } else {
            Vec::new()
        }
    }

    pub fn is_closed(&self) -> bool {
        self.transcript.lock().closed
    }

    /// Stops the session and aborts pending replies. Returns how many were
    /// still waiting.
    pub fn close(&self) -> usize {
        self.transcript.lock().closed = true;

        let mut aborted = 0;
        for handle in self.pending.lock().drain(..) {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        aborted
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}
