//! Single-flight guards for network actions.
//!
//! Every request the core issues carries a [`FlightToken`]. The completion event
//! hands the token back, and only the token currently held by the slot is
//! accepted; anything else is a late answer to a request the user has already
//! moved on from.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightToken(Uuid);

impl FlightToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FlightToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FlightToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FlightError {
    #[error("a request is already in flight ({0})")]
    AlreadyInFlight(FlightToken),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InFlight {
    current: Option<FlightToken>,
}

impl InFlight {
    pub fn begin(&mut self) -> Result<FlightToken, FlightError> {
        if let Some(token) = self.current {
            return Err(FlightError::AlreadyInFlight(token));
        }
        let token = FlightToken::new();
        self.current = Some(token);
        Ok(token)
    }

    /// Clears the slot if `token` is the one in flight. Returns whether it was.
    pub fn finish(&mut self, token: FlightToken) -> bool {
        if self.current == Some(token) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<FlightToken> {
        self.current
    }

    /// Forgets the outstanding request; its completion will be treated as stale.
    pub fn abandon(&mut self) -> Option<FlightToken> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let mut slot = InFlight::default();
        assert!(!slot.is_busy());

        let token = slot.begin().unwrap();
        assert!(slot.is_busy());
        assert!(matches!(slot.begin(), Err(FlightError::AlreadyInFlight(t)) if t == token));

        assert!(slot.finish(token));
        assert!(!slot.is_busy());
    }

    #[test]
    fn test_stale_token_rejected() {
        let mut slot = InFlight::default();
        let first = slot.begin().unwrap();
        slot.abandon();
        let second = slot.begin().unwrap();

        assert!(!slot.finish(first));
        assert!(slot.is_busy());
        assert!(slot.finish(second));
    }

    #[test]
    fn test_finish_on_idle_slot() {
        let mut slot = InFlight::default();
        assert!(!slot.finish(FlightToken::new()));
    }
}
