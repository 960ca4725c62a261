//! The conversation controller.
//!
//! Owns the ordered message history and the pending-request bookkeeping.
//! Submission is split into a synchronous `begin` step (guard, user-message
//! append, waiting flag) and a `resolve` step, with the suspending network
//! call between them. The split keeps the ordering guarantee — the question
//! is in history before the call suspends — and lets a result that arrives
//! after logout be discarded by epoch instead of mutating a stale history.

use std::sync::Arc;

use atomchat_client::{
    Answer, ApiError, ChatBackend, ELEMENT_NOT_FOUND_HINT, ElementLookup, Navigation,
    SessionStore, UserRecord,
};

use crate::lookup::LookupPanel;
use crate::message::{Message, WELCOME_MESSAGE};

/// Shown when a question fails and the backend provided no detail text.
pub const ANSWER_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session probe has run yet.
    Uninitialized,
    /// The `/me` probe is in flight.
    Authenticating,
    /// Accepting submissions.
    Ready,
    /// Exactly one question request is in flight; submissions are rejected.
    AwaitingAnswer,
}

/// Identity of one in-flight question, handed out by
/// [`Conversation::begin_submit`] and redeemed by
/// [`Conversation::resolve_turn`].
#[derive(Debug, Clone)]
pub struct QuestionTurn {
    question: String,
    epoch: u64,
}

impl QuestionTurn {
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }
}

pub struct Conversation {
    backend: Arc<dyn ChatBackend>,
    session: Arc<dyn SessionStore>,
    phase: Phase,
    user: Option<UserRecord>,
    messages: Vec<Message>,
    pending_input: String,
    epoch: u64,
}

impl Conversation {
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            backend,
            session,
            phase: Phase::Uninitialized,
            user: None,
            messages: Vec::new(),
            pending_input: String::new(),
            epoch: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.phase == Phase::AwaitingAnswer
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn set_pending_input(&mut self, input: impl Into<String>) {
        self.pending_input = input.into();
    }

    /// Runs the session probe. Success seeds the fixed welcome message;
    /// failure returns the login navigation intent and this instance is
    /// done. Calling it again after a successful start is a no-op.
    pub async fn start(&mut self) -> Result<(), Navigation> {
        if self.phase != Phase::Uninitialized {
            return Ok(());
        }
        self.phase = Phase::Authenticating;
        let backend = Arc::clone(&self.backend);
        match backend.current_user().await {
            Ok(user) => {
                tracing::debug!(email = %user.email, "session probe succeeded");
                self.user = Some(user);
                self.messages.push(Message::assistant_text(WELCOME_MESSAGE));
                self.phase = Phase::Ready;
                Ok(())
            }
            Err(error) => {
                tracing::debug!(%error, "session probe failed");
                self.phase = Phase::Uninitialized;
                Err(Navigation::Login)
            }
        }
    }

    /// Starts a question turn from the pending input. Returns `None` (a
    /// strict no-op: nothing appended, nothing cleared) when the input is
    /// blank or a question is already in flight; otherwise appends the user
    /// message, clears the pending input, and marks the conversation
    /// waiting.
    pub fn begin_submit(&mut self) -> Option<QuestionTurn> {
        let question = self.pending_input.trim().to_string();
        if question.is_empty() || self.phase != Phase::Ready {
            return None;
        }
        self.messages.push(Message::user(question.clone()));
        self.pending_input.clear();
        self.phase = Phase::AwaitingAnswer;
        Some(QuestionTurn {
            question,
            epoch: self.epoch,
        })
    }

    /// Starts a media-analysis turn. Same bookkeeping as a question turn;
    /// the user-visible entry names the uploaded file.
    pub fn begin_media(&mut self, file_name: &str) -> Option<QuestionTurn> {
        let file_name = file_name.trim();
        if file_name.is_empty() || self.phase != Phase::Ready {
            return None;
        }
        self.messages
            .push(Message::user(format!("Analyze this file: {file_name}")));
        self.phase = Phase::AwaitingAnswer;
        Some(QuestionTurn {
            question: file_name.to_string(),
            epoch: self.epoch,
        })
    }

    /// Completes a turn. Appends exactly one assistant message — the answer
    /// on success, an error entry on failure — and clears the waiting flag
    /// on both outcomes. A session-expiry failure appends nothing (the user
    /// leaves the view) and yields the navigation intent instead. A turn
    /// from a superseded epoch is discarded entirely.
    pub fn resolve_turn(
        &mut self,
        turn: &QuestionTurn,
        outcome: Result<Answer, ApiError>,
    ) -> Option<Navigation> {
        if turn.epoch != self.epoch {
            tracing::debug!("discarding result from a superseded session");
            return None;
        }
        self.phase = Phase::Ready;
        match outcome {
            Ok(answer) => {
                self.messages.push(Message::assistant(answer));
                None
            }
            Err(ApiError::SessionExpired { redirect }) => {
                self.invalidate();
                self.phase = Phase::Uninitialized;
                Some(redirect)
            }
            Err(error) => {
                let detail = error
                    .detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| ANSWER_FALLBACK.to_string());
                self.messages.push(Message::error(detail));
                None
            }
        }
    }

    /// Convenience driver: begin, ask, resolve.
    pub async fn submit(&mut self, input: &str) -> Option<Navigation> {
        self.set_pending_input(input);
        let turn = self.begin_submit()?;
        let backend = Arc::clone(&self.backend);
        let outcome = backend.ask(turn.question()).await;
        self.resolve_turn(&turn, outcome)
    }

    /// Convenience driver for media analysis.
    pub async fn analyze_media(&mut self, file_name: &str, bytes: Vec<u8>) -> Option<Navigation> {
        let turn = self.begin_media(file_name)?;
        let backend = Arc::clone(&self.backend);
        let outcome = backend.analyze_media(turn.question(), bytes).await;
        self.resolve_turn(&turn, outcome)
    }

    /// Drives one element lookup into the panel. Independent of the
    /// question flow: not gated by the waiting flag and never touching
    /// message history. Any failure short of expiry becomes a not-found
    /// panel entry.
    pub async fn lookup(
        &self,
        panel: &mut LookupPanel,
        identifier: &str,
    ) -> Option<Navigation> {
        let ticket = panel.begin();
        match self.backend.element(identifier).await {
            Ok(result) => {
                panel.apply(ticket, result);
                None
            }
            Err(ApiError::SessionExpired { redirect }) => Some(redirect),
            Err(error) => {
                tracing::debug!(%error, "element lookup failed");
                panel.apply(
                    ticket,
                    ElementLookup::NotFound {
                        message: ELEMENT_NOT_FOUND_HINT.to_string(),
                    },
                );
                None
            }
        }
    }

    /// Clears the session and resets the conversation. Any in-flight turn
    /// keeps running in the background but its result no longer applies.
    pub fn logout(&mut self) -> Navigation {
        self.session.clear();
        self.invalidate();
        self.messages.clear();
        self.pending_input.clear();
        self.user = None;
        self.phase = Phase::Uninitialized;
        tracing::debug!("logged out, conversation reset");
        Navigation::Login
    }

    fn invalidate(&mut self) {
        self.epoch += 1;
    }
}
