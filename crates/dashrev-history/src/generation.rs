//! Per-slot generation tokens for discarding stale responses

/// Monotonic generation of one request slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Generation before any request was issued
    pub const ZERO: Self = Self(0);

    /// The following generation
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Request slot (log fetch, diff fetch, restore)
///
/// `issue` hands out a ticket for a new request; a response is only applied
/// when `complete` accepts its ticket.
#[derive(Debug, Clone, Default)]
pub struct GenerationSlot {
    current: Generation,
    pending: bool,
}

impl GenerationSlot {
    /// Create an idle slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any outstanding one
    pub fn issue(&mut self) -> Generation {
        self.current = self.current.next();
        self.pending = true;
        self.current
    }

    /// Accept a response; false when the ticket is stale
    pub fn complete(&mut self, ticket: Generation) -> bool {
        if ticket != self.current {
            return false;
        }
        self.pending = false;
        true
    }

    /// Make every outstanding ticket stale
    pub fn invalidate(&mut self) {
        self.current = self.current.next();
        self.pending = false;
    }

    /// Whether a request is outstanding
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Current generation
    pub fn current(&self) -> Generation {
        self.current
    }
}
