//! The editing session: owner of all mutable coding state for one clinician session.
//!
//! The session owns the selection set, the suggestion renderer and the search sequence
//! counter. It is created at session start and cleared by [`EditingSession::reset`].
//!
//! Mutation happens only through [`EditingSession::dispatch`]; the renderer produces
//! [`SelectionToggled`] events and the session is their sole subscriber. Network calls never
//! hold the session: a caller takes a [`SearchTicket`], awaits the collaborator, and hands the
//! result back with the ticket. Toggles in between are applied immediately.

use crate::assembly::assemble;
use crate::renderer::{Presentation, SearchTicket, SelectionToggled, Suggestion, SuggestionRenderer};
use crate::selection::{SelectionEntry, SelectionSet, ToggleOutcome};
use crate::CodingResult;
use fhir::{Document, PatientContext};

/// Events the session reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SelectionToggled(SelectionToggled),
    SelectionCleared,
}

impl From<SelectionToggled> for SessionEvent {
    fn from(event: SelectionToggled) -> Self {
        SessionEvent::SelectionToggled(event)
    }
}

#[derive(Debug)]
pub struct EditingSession {
    patient: PatientContext,
    selections: SelectionSet,
    renderer: SuggestionRenderer,
    last_seq: u64,
}

impl EditingSession {
    pub fn new(patient: PatientContext) -> Self {
        Self {
            patient,
            selections: SelectionSet::new(),
            renderer: SuggestionRenderer::new(),
            last_seq: 0,
        }
    }

    pub fn patient(&self) -> &PatientContext {
        &self.patient
    }

    pub fn selections(&self) -> &[SelectionEntry] {
        self.selections.list()
    }

    pub fn is_selected(&self, code: &str) -> bool {
        self.selections.contains(code)
    }

    pub fn presentation(&self) -> &Presentation {
        self.renderer.current()
    }

    /// Issue a ticket for a new autocoding request.
    pub fn begin_search(&mut self, text: &str) -> SearchTicket {
        self.last_seq += 1;
        let ticket = SearchTicket::new(self.last_seq);
        tracing::debug!(seq = ticket.seq(), chars = text.chars().count(), "autocoding request issued");
        ticket
    }

    /// Hand an autocoding response back to the session.
    ///
    /// Returns the new presentation, or `None` if a newer response was already shown.
    pub fn receive_suggestions(
        &mut self,
        ticket: SearchTicket,
        suggestions: &[Suggestion],
    ) -> Option<&Presentation> {
        self.renderer.accept(ticket, suggestions)
    }

    /// Hand a failed autocoding request back to the session.
    ///
    /// Returns `false` if a newer response or failure was already received, in which case the
    /// failure is stale and need not be reported.
    pub fn search_failed(&mut self, ticket: SearchTicket) -> bool {
        self.renderer.reject(ticket)
    }

    /// Apply an event. Returns the toggle outcome for toggle events.
    pub fn dispatch(&mut self, event: SessionEvent) -> Option<ToggleOutcome> {
        match event {
            SessionEvent::SelectionToggled(SelectionToggled { code, display }) => {
                Some(self.selections.toggle(code, display))
            }
            SessionEvent::SelectionCleared => {
                self.selections.clear();
                None
            }
        }
    }

    /// Toggle the row at `index` of the current presentation.
    ///
    /// Returns `None` if there is no such row.
    pub fn toggle_row(&mut self, index: usize) -> Option<ToggleOutcome> {
        let event = self.renderer.current().row(index)?.toggle_event();
        self.dispatch(event.into())
    }

    /// Assemble a document from a snapshot of the current selections.
    pub fn assemble(&self) -> CodingResult<Document> {
        assemble(&self.patient, self.selections.list())
    }

    /// Discard the displayed suggestions. Selections are kept.
    pub fn clear_view(&mut self) {
        self.renderer.clear();
    }

    /// End-of-session reset: clears selections and the displayed suggestions.
    ///
    /// The sequence counter keeps counting so responses to requests issued before the reset
    /// remain distinguishable.
    pub fn reset(&mut self) {
        self.selections.clear();
        self.renderer.clear();
    }
}
