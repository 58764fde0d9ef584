//! Explicit state machine for the claim screen's autocomplete boxes.
//!
//! Network calls happen outside the machine. Callers take a ticket from
//! [`SearchBox::begin`], run the lookup, and hand the results back through
//! [`SearchBox::resolve`]. A response bearing anything but the latest
//! ticket was superseded by a newer keystroke and is ignored on arrival;
//! there is no cancellation.

/// Ticket tying an in-flight lookup to the keystroke that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// The four states a search box moves through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState<T> {
    Idle,
    Searching { query: String, ticket: SearchTicket },
    ShowingResults { query: String, results: Vec<T> },
    Selected { item: T },
}

impl<T> Default for SearchState<T> {
    fn default() -> Self {
        SearchState::Idle
    }
}

/// One autocomplete input: customer lookup or reward lookup.
#[derive(Debug, Clone)]
pub struct SearchBox<T> {
    state: SearchState<T>,
    issued: u64,
}

impl<T> Default for SearchBox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchBox<T> {
    pub fn new() -> Self {
        Self {
            state: SearchState::Idle,
            issued: 0,
        }
    }

    pub fn state(&self) -> &SearchState<T> {
        &self.state
    }

    /// Register a keystroke. Whatever was on screen is superseded and the
    /// returned ticket becomes the only one `resolve` will accept.
    pub fn begin(&mut self, query: impl Into<String>) -> SearchTicket {
        self.issued += 1;
        let ticket = SearchTicket(self.issued);
        self.state = SearchState::Searching {
            query: query.into(),
            ticket,
        };
        ticket
    }

    /// Apply a lookup response. Returns whether it landed: stale tickets
    /// and responses arriving after a selection report `false` and change
    /// nothing.
    pub fn resolve(&mut self, ticket: SearchTicket, results: Vec<T>) -> bool {
        match &self.state {
            SearchState::Searching {
                ticket: live,
                query,
            } if *live == ticket => {
                let query = query.clone();
                self.state = SearchState::ShowingResults { query, results };
                true
            }
            _ => false,
        }
    }

    /// Pin the result at `index`. Out-of-range picks report `false` and
    /// leave the results on screen.
    pub fn select(&mut self, index: usize) -> bool {
        if let SearchState::ShowingResults { results, .. } = &mut self.state {
            if index < results.len() {
                let item = results.remove(index);
                self.state = SearchState::Selected { item };
                return true;
            }
        }
        false
    }

    pub fn selected(&self) -> Option<&T> {
        match &self.state {
            SearchState::Selected { item } => Some(item),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = SearchState::Idle;
    }
}
