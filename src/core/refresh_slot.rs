//! Single-slot job runner state.
//!
//! A [`RefreshSlot`] hands out at most one [`SlotTicket`] at a time. Starting a refresh
//! worker requires a ticket and the worker gives it back when it is done, so a second
//! worker cannot exist while the first one runs. The slot lives inside the cache's
//! mutation lock, which makes claiming it a single check-and-set.

/// Proof of slot ownership. Not `Clone`; only [`RefreshSlot::try_claim`] creates one.
#[derive(Debug)]
#[must_use = "a claimed slot stays occupied until the ticket is released"]
pub struct SlotTicket {
    _private: (),
}

#[derive(Debug, Default)]
pub struct RefreshSlot {
    occupied: bool,
    runs: u64,
}

impl RefreshSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or `None` while another ticket is outstanding
    pub fn try_claim(&mut self) -> Option<SlotTicket> {
        if self.occupied {
            return None;
        }
        self.occupied = true;
        self.runs += 1;
        Some(SlotTicket { _private: () })
    }

    /// Give the slot back
    pub fn release(&mut self, ticket: SlotTicket) {
        let SlotTicket { _private: () } = ticket;
        self.occupied = false;
    }

    /// Free the slot after its ticket was dropped without being released, e.g. when
    /// the worker thread could not be spawned
    pub fn recover_lost_ticket(&mut self) {
        self.occupied = false;
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Number of tickets handed out so far
    pub fn runs(&self) -> u64 {
        self.runs
    }
}
