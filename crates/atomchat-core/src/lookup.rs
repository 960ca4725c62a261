//! Element lookup side panel.
//!
//! Lookups run independently of the conversational flow and are not bounded
//! to one in flight. Results are keyed by request identity: a ticket issued
//! at submit time only applies while it is still the newest one, so the
//! panel always shows the last-submitted lookup regardless of arrival
//! order.

use atomchat_client::ElementLookup;

/// Identity of one lookup request, issued by [`LookupPanel::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LookupTicket(u64);

/// Panel state: the outcome of the most recent lookup, replaced wholesale.
#[derive(Debug, Default)]
pub struct LookupPanel {
    latest: u64,
    content: Option<ElementLookup>,
}

impl LookupPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new lookup and returns its ticket. Issuing a ticket
    /// supersedes every earlier one immediately.
    pub fn begin(&mut self) -> LookupTicket {
        self.latest += 1;
        LookupTicket(self.latest)
    }

    /// Applies a resolved lookup. Returns false (and leaves the panel
    /// untouched) when a newer lookup was submitted after this ticket.
    pub fn apply(&mut self, ticket: LookupTicket, result: ElementLookup) -> bool {
        if ticket.0 != self.latest {
            tracing::debug!(ticket = ticket.0, latest = self.latest, "stale lookup discarded");
            return false;
        }
        self.content = Some(result);
        true
    }

    #[must_use]
    pub fn content(&self) -> Option<&ElementLookup> {
        self.content.as_ref()
    }

    pub fn clear(&mut self) {
        self.content = None;
    }
}
