//! The transient "good job skipping that purchase" notice.
//!
//! It lives beside the flow state, not inside it: showing it never blocks a
//! transition. Every show issues a fresh [`EncouragementTicket`]; an expiry
//! only hides the notice when it carries the current ticket, so a timer
//! armed for an earlier notice cannot hide a later one.

use std::time::Duration;

/// How long the notice stays visible.
pub const ENCOURAGEMENT_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncouragementTicket(u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encouragement {
    active: Option<EncouragementTicket>,
    issued: u64,
}

impl Encouragement {
    pub fn is_shown(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<EncouragementTicket> {
        self.active
    }

    /// Shows the notice, superseding any earlier ticket.
    pub fn show(&mut self) -> EncouragementTicket {
        self.issued += 1;
        let ticket = EncouragementTicket(self.issued);
        self.active = Some(ticket);
        ticket
    }

    /// Hides the notice if `ticket` is still current. Returns whether it did.
    pub fn expire(&mut self, ticket: EncouragementTicket) -> bool {
        if self.active == Some(ticket) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Hides the notice whatever ticket is current. Returns the cancelled
    /// ticket, if any.
    pub fn cancel(&mut self) -> Option<EncouragementTicket> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expire_clears_current_ticket() {
        let mut encouragement = Encouragement::default();
        let ticket = encouragement.show();
        assert!(encouragement.is_shown());
        assert!(encouragement.expire(ticket));
        assert!(!encouragement.is_shown());
        assert!(!encouragement.expire(ticket));
    }

    #[test]
    fn stale_ticket_does_not_clear_newer_notice() {
        let mut encouragement = Encouragement::default();
        let first = encouragement.show();
        let second = encouragement.show();
        assert_ne!(first, second);

        assert!(!encouragement.expire(first));
        assert!(encouragement.is_shown());
        assert!(encouragement.expire(second));
    }

    #[test]
    fn cancel_invalidates_pending_expiry() {
        let mut encouragement = Encouragement::default();
        let ticket = encouragement.show();
        assert_eq!(encouragement.cancel(), Some(ticket));
        assert_eq!(encouragement.cancel(), None);
        assert!(!encouragement.expire(ticket));
    }
}
