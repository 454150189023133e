//! The selection set: codes the clinician has chosen in the current editing session.
//!
//! The set is keyed by code. `toggle` is the only mutation: it deselects a present code and
//! selects an absent one, so two identical toggles in a row always restore the prior state.
//!
//! Ordering policy: entries are listed in insertion order. A code that is deselected and then
//! selected again is appended at the end; it does not regain its earlier position.

use crate::constants::ICD_SYSTEM_URI;

/// A chosen terminology code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionEntry {
    pub code: String,
    pub display: String,

    /// Terminology namespace URI. Always [`ICD_SYSTEM_URI`] for entries created by `toggle`.
    pub system: String,
}

/// Effect of a single toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
}

/// Insertion-ordered set of [`SelectionEntry`] values, unique by code.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    entries: Vec<SelectionEntry>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `code` if it is absent, deselect it if it is present.
    ///
    /// The display label is only used when selecting; deselection matches on code alone.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `code` is empty or whitespace. Callers obtain codes from
    /// suggestions, so an empty code is a programming error.
    pub fn toggle(&mut self, code: impl Into<String>, display: impl Into<String>) -> ToggleOutcome {
        let code = code.into();
        debug_assert!(
            !code.trim().is_empty(),
            "selection toggled with an empty code"
        );

        match self.entries.iter().position(|entry| entry.code == code) {
            Some(index) => {
                // `remove`, not `swap_remove`: the remaining entries keep their order.
                self.entries.remove(index);
                tracing::debug!(%code, "deselected code");
                ToggleOutcome::Deselected
            }
            None => {
                tracing::debug!(%code, "selected code");
                self.entries.push(SelectionEntry {
                    code,
                    display: display.into(),
                    system: ICD_SYSTEM_URI.to_string(),
                });
                ToggleOutcome::Selected
            }
        }
    }

    /// Entries in insertion order.
    pub fn list(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|entry| entry.code == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(set: &SelectionSet) -> Vec<&str> {
        set.list().iter().map(|entry| entry.code.as_str()).collect()
    }

    #[test]
    fn toggle_selects_absent_code_with_fixed_system() {
        let mut set = SelectionSet::new();
        let outcome = set.toggle("1A00", "Cholera");

        assert_eq!(outcome, ToggleOutcome::Selected);
        assert_eq!(
            set.list(),
            &[SelectionEntry {
                code: "1A00".into(),
                display: "Cholera".into(),
                system: ICD_SYSTEM_URI.into(),
            }]
        );
    }

    #[test]
    fn toggle_pair_restores_prior_state() {
        let mut set = SelectionSet::new();
        set.toggle("2C10", "Malignant neoplasm");

        for (code, display) in [("1A00", "Cholera"), ("2C10", "Malignant neoplasm")] {
            let before = set.clone();
            set.toggle(code, display);
            set.toggle(code, display);
            assert_eq!(set, before, "double toggle of {code} changed the set");
        }
    }

    #[test]
    fn never_holds_two_entries_for_one_code() {
        let mut set = SelectionSet::new();
        for _ in 0..5 {
            set.toggle("1A00", "Cholera");
            set.toggle("2C10", "Malignant neoplasm");
            assert!(set.len() <= 2);
            let unique: std::collections::HashSet<&str> = codes(&set).into_iter().collect();
            assert_eq!(unique.len(), set.len());
        }
    }

    #[test]
    fn deselect_matches_on_code_not_display() {
        let mut set = SelectionSet::new();
        set.toggle("1A00", "Cholera");
        let outcome = set.toggle("1A00", "A different label");

        assert_eq!(outcome, ToggleOutcome::Deselected);
        assert!(set.is_empty());
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut set = SelectionSet::new();
        set.toggle("1A00", "Cholera");
        set.toggle("2C10", "Malignant neoplasm");
        set.toggle("BA00", "Essential hypertension");

        assert_eq!(codes(&set), vec!["1A00", "2C10", "BA00"]);
    }

    #[test]
    fn removing_middle_entry_keeps_others_in_order() {
        let mut set = SelectionSet::new();
        set.toggle("1A00", "Cholera");
        set.toggle("2C10", "Malignant neoplasm");
        set.toggle("BA00", "Essential hypertension");
        set.toggle("2C10", "Malignant neoplasm");

        assert_eq!(codes(&set), vec!["1A00", "BA00"]);
    }

    #[test]
    fn reselected_code_moves_to_the_end() {
        let mut set = SelectionSet::new();
        set.toggle("1A00", "Cholera");
        set.toggle("2C10", "Malignant neoplasm");
        set.toggle("1A00", "Cholera");
        set.toggle("1A00", "Cholera");

        assert_eq!(codes(&set), vec!["2C10", "1A00"]);
    }

    #[test]
    fn same_display_different_codes_are_distinct() {
        let mut set = SelectionSet::new();
        set.toggle("1A00", "Cholera");
        set.toggle("1A00.0", "Cholera");

        assert_eq!(set.len(), 2);
        assert!(set.contains("1A00"));
        assert!(set.contains("1A00.0"));
    }

    #[test]
    fn clear_empties_the_set() {
        let mut set = SelectionSet::new();
        set.toggle("1A00", "Cholera");
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "empty code")]
    fn empty_code_fails_loudly_in_debug_builds() {
        let mut set = SelectionSet::new();
        set.toggle("  ", "Nothing");
    }
}
