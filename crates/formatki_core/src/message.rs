//! Single transient status message with auto-expiry.
//!
//! At most one message is live. Showing a new one replaces the previous one and
//! cancels its pending clear; the clear is modelled as a deadline plus a
//! ticket so a timer armed for an older message can never clear a newer one.

use crate::constants::MESSAGE_TTL;
use std::time::{Duration, Instant};

/// A status or error line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub is_error: bool,
    pub expires_at: Instant,
}

/// Identifies the scheduled clear of one shown message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTicket(u64);

#[derive(Debug)]
pub struct MessageCenter {
    current: Option<(MessageTicket, Message)>,
    ttl: Duration,
    next_ticket: u64,
}

impl Default for MessageCenter {
    fn default() -> Self {
        Self::with_ttl(MESSAGE_TTL)
    }
}

impl MessageCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            current: None,
            ttl,
            next_ticket: 0,
        }
    }

    /// Show `text`, replacing any live message, and arm its auto-clear.
    ///
    /// # Returns
    /// The ticket of the newly scheduled clear.
    pub fn show(&mut self, text: impl Into<String>, is_error: bool, now: Instant) -> MessageTicket {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = MessageTicket(self.next_ticket);
        self.current = Some((
            ticket,
            Message {
                text: text.into(),
                is_error,
                expires_at: now + self.ttl,
            },
        ));
        ticket
    }

    /// Cancel the pending auto-clear and empty the display.
    ///
    /// # Returns
    /// `true` when a message was visible.
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Run the scheduled clear identified by `ticket`.
    ///
    /// Does nothing when the message it was armed for has since been replaced
    /// or cleared.
    pub fn expire(&mut self, ticket: MessageTicket) -> bool {
        match &self.current {
            Some((live, _)) if *live == ticket => self.clear(),
            _ => false,
        }
    }

    /// Clear the live message if its deadline has passed at `now`.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.current {
            Some((ticket, message)) if now >= message.expires_at => {
                let ticket = *ticket;
                self.expire(ticket)
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Message> {
        self.current.as_ref().map(|(_, message)| message)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::MessageCenter;
    use crate::constants::MESSAGE_TTL;
    use std::time::{Duration, Instant};

    #[test]
    fn default_ttl_is_three_minutes() {
        assert_eq!(MessageCenter::new().ttl(), Duration::from_secs(180));
        assert_eq!(MESSAGE_TTL, Duration::from_secs(180));
    }

    #[test]
    fn show_replaces_previous_message() {
        let now = Instant::now();
        let mut center = MessageCenter::new();
        center.show("first", true, now);
        center.show("second", false, now);
        let message = center.current().expect("message");
        assert_eq!(message.text, "second");
        assert!(!message.is_error);
    }

    #[test]
    fn stale_ticket_cannot_clear_newer_message() {
        let now = Instant::now();
        let mut center = MessageCenter::new();
        let old = center.show("old", false, now);
        let new = center.show("new", false, now);
        assert!(!center.expire(old));
        assert_eq!(center.current().map(|m| m.text.as_str()), Some("new"));
        assert!(center.expire(new));
        assert!(center.current().is_none());
    }

    #[test]
    fn tick_clears_only_after_deadline() {
        let start = Instant::now();
        let mut center = MessageCenter::with_ttl(Duration::from_secs(10));
        center.show("hello", false, start);
        assert!(!center.tick(start + Duration::from_secs(9)));
        assert!(center.current().is_some());
        assert!(center.tick(start + Duration::from_secs(10)));
        assert!(center.current().is_none());
    }

    #[test]
    fn newer_message_gets_a_fresh_deadline() {
        let start = Instant::now();
        let mut center = MessageCenter::with_ttl(Duration::from_secs(10));
        center.show("first", false, start);
        center.show("second", false, start + Duration::from_secs(8));
        assert!(!center.tick(start + Duration::from_secs(12)));
        assert_eq!(center.current().map(|m| m.text.as_str()), Some("second"));
    }

    #[test]
    fn clear_cancels_pending_message() {
        let now = Instant::now();
        let mut center = MessageCenter::new();
        let ticket = center.show("bye", true, now);
        assert!(center.clear());
        assert!(!center.clear());
        assert!(!center.expire(ticket));
    }
}
