//! Search pipeline state: query, results, suggestions and history

use lmap_core::{AutocompleteSuggestion, SearchResult};
use serde::Serialize;

/// Capped, most-recent-first search history, unique by place id
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHistory {
    entries: Vec<SearchResult>,
    limit: usize,
}

impl SearchHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Restore persisted entries, re-applying the cap and uniqueness
    pub fn from_entries(entries: Vec<SearchResult>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for entry in entries.into_iter().rev() {
            history.push(entry);
        }
        history
    }

    /// Move `result` to the front, replacing any entry with the same place id
    pub fn push(&mut self, result: SearchResult) {
        self.entries.retain(|e| e.place_id != result.place_id);
        self.entries.insert(0, result);
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> &[SearchResult] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&SearchResult> {
        self.entries.get(index)
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

/// Which collection the search screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum SearchView {
    Results(Vec<SearchResult>),
    Suggestions(Vec<AutocompleteSuggestion>),
    History(Vec<SearchResult>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub suggestions: Vec<AutocompleteSuggestion>,
    pub history: SearchHistory,
    /// Failure message from the last request
    pub error: Option<String>,
    /// Last full-text search found nothing
    pub no_results: bool,
    pub searching: bool,

    /// Tag of the newest search, autocomplete or resolve request.
    /// Responses carrying an older tag are stale.
    pub request_seq: u64,

    /// Bumped on every keystroke and submit; only the newest debounce fires
    pub debounce_generation: u64,

    min_autocomplete_chars: usize,
}

impl SearchState {
    pub fn new(history_limit: usize, min_autocomplete_chars: usize) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            suggestions: Vec::new(),
            history: SearchHistory::new(history_limit),
            error: None,
            no_results: false,
            searching: false,
            request_seq: 0,
            debounce_generation: 0,
            min_autocomplete_chars,
        }
    }

    /// Whether the current query is long enough for autocomplete
    pub fn wants_autocomplete(&self) -> bool {
        self.query.trim().chars().count() >= self.min_autocomplete_chars
    }

    pub fn next_request(&mut self) -> u64 {
        self.request_seq += 1;
        self.request_seq
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.request_seq
    }

    /// Results, then suggestions, then history, then nothing
    pub fn view(&self) -> SearchView {
        if !self.results.is_empty() {
            SearchView::Results(self.results.clone())
        } else if self.wants_autocomplete() && !self.suggestions.is_empty() {
            SearchView::Suggestions(self.suggestions.clone())
        } else if !self.wants_autocomplete() && !self.history.is_empty() {
            SearchView::History(self.history.entries().to_vec())
        } else {
            SearchView::Empty
        }
    }

    /// Reset query, results, suggestions and messages
    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.suggestions.clear();
        self.error = None;
        self.no_results = false;
        self.searching = false;
        self.debounce_generation += 1;
        self.request_seq += 1;
    }
}
