//! Suggestion rendering: turns an autocoding response into a selectable presentation.
//!
//! The renderer does not rank, filter or deduplicate. Each row hands out a
//! [`SelectionToggled`] event; the editing session is the only consumer of those events.
//!
//! Responses are tagged with a [`SearchTicket`]. The renderer keeps the highest sequence it
//! has accepted and drops any response that is not newer, so an older search that completes
//! late never replaces the results of a newer one.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A candidate terminology entry returned by the autocoding collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub code: String,
    pub display: String,

    /// Relevance score, conventionally 0–1. Missing scores are treated as `0.0`.
    #[serde(default)]
    pub score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linearization: Option<String>,
}

impl Suggestion {
    pub fn new(code: impl Into<String>, display: impl Into<String>, score: f64) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
            score,
            system: None,
            linearization: None,
        }
    }
}

/// Event emitted when the clinician toggles a suggestion row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionToggled {
    pub code: String,
    pub display: String,
}

/// Identifies one autocoding request. Later requests carry higher sequence numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket {
    seq: u64,
}

impl SearchTicket {
    pub(crate) fn new(seq: u64) -> Self {
        Self { seq }
    }

    pub fn seq(self) -> u64 {
        self.seq
    }
}

/// One selectable row of the presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct SuggestionRow {
    pub code: String,
    pub display: String,
    pub score: f64,
}

impl SuggestionRow {
    /// The toggle affordance of this row.
    pub fn toggle_event(&self) -> SelectionToggled {
        SelectionToggled {
            code: self.code.clone(),
            display: self.display.clone(),
        }
    }
}

/// What the clinician sees for the latest accepted autocoding response.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Presentation {
    /// A valid empty result. Not an error.
    #[default]
    NoSuggestions,
    Rows(Vec<SuggestionRow>),
}

impl Presentation {
    pub fn rows(&self) -> &[SuggestionRow] {
        match self {
            Presentation::NoSuggestions => &[],
            Presentation::Rows(rows) => rows,
        }
    }

    pub fn row(&self, index: usize) -> Option<&SuggestionRow> {
        self.rows().get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    /// Text table for console display.
    ///
    /// `is_selected` marks rows whose code is already in the selection set.
    pub fn to_table(&self, is_selected: impl Fn(&str) -> bool) -> String {
        let rows = match self {
            Presentation::NoSuggestions => return "No suggestions.\n".to_string(),
            Presentation::Rows(rows) => rows,
        };

        let mut out = String::new();
        let _ = writeln!(out, "{:>3}  {:<3}  {:<12}  {:<48}  {:>5}", "#", "Sel", "Code", "Title", "Score");
        for (index, row) in rows.iter().enumerate() {
            let mark = if is_selected(&row.code) { "[x]" } else { "[ ]" };
            let _ = writeln!(
                out,
                "{:>3}  {}  {:<12}  {:<48}  {:.3}",
                index, mark, row.code, row.display, row.score
            );
        }
        out
    }
}

/// Build a presentation from suggestions, in the order given.
pub fn render(suggestions: &[Suggestion]) -> Presentation {
    if suggestions.is_empty() {
        return Presentation::NoSuggestions;
    }

    Presentation::Rows(
        suggestions
            .iter()
            .map(|s| SuggestionRow {
                code: s.code.clone(),
                display: s.display.clone(),
                score: s.score,
            })
            .collect(),
    )
}

/// Holds the current presentation and the sequence guard.
#[derive(Debug, Default)]
pub struct SuggestionRenderer {
    accepted: Option<SearchTicket>,
    current: Presentation,
}

impl SuggestionRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `suggestions` if `ticket` is newer than every ticket accepted so far.
    ///
    /// Returns the new presentation, or `None` when the response is stale and was discarded.
    pub fn accept(
        &mut self,
        ticket: SearchTicket,
        suggestions: &[Suggestion],
    ) -> Option<&Presentation> {
        if self.accepted.is_some_and(|accepted| ticket <= accepted) {
            tracing::debug!(
                seq = ticket.seq(),
                accepted = self.accepted.map(SearchTicket::seq),
                "discarding stale autocoding response"
            );
            return None;
        }

        self.accepted = Some(ticket);
        self.current = render(suggestions);
        Some(&self.current)
    }

    /// Record that the request behind `ticket` failed.
    ///
    /// A failed reply still counts as the latest reply for the sequence guard, so responses to
    /// older requests are discarded afterwards. The current presentation is kept. Returns
    /// `false` when the failure is itself stale.
    pub fn reject(&mut self, ticket: SearchTicket) -> bool {
        if self.accepted.is_some_and(|accepted| ticket <= accepted) {
            tracing::debug!(seq = ticket.seq(), "discarding stale autocoding failure");
            return false;
        }

        self.accepted = Some(ticket);
        true
    }

    pub fn current(&self) -> &Presentation {
        &self.current
    }

    /// Discard the current presentation. The sequence guard is kept.
    pub fn clear(&mut self) {
        self.current = Presentation::NoSuggestions;
    }
}
