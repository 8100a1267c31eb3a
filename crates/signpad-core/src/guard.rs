//! Drop-the-request guard against overlapping mutating actions
//!
//! An action acquires the guard before it touches history. After a
//! successful action the guard stays held until the front end reports that
//! it re-rendered (`settle`). A failed action hands its token back right
//! away. Nothing blocks or waits: a second request while held is rejected.

use crate::error::{Result, SignpadError};

/// Proof that the holder acquired the guard. Not `Clone`, so a token can
/// only be handed back once.
#[derive(Debug, PartialEq, Eq)]
pub struct ActionToken(u64);

#[derive(Debug, Default)]
pub struct ActionGuard {
    next: u64,
    held: Option<u64>,
}

impl ActionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&mut self) -> Result<ActionToken> {
        if self.held.is_some() {
            return Err(SignpadError::Busy);
        }
        let token = self.next;
        self.next = self.next.wrapping_add(1);
        self.held = Some(token);
        Ok(ActionToken(token))
    }

    /// Give back a token whose action produced nothing to render.
    ///
    /// A token from an earlier, already settled action is ignored.
    pub fn release(&mut self, token: ActionToken) {
        if self.held == Some(token.0) {
            self.held = None;
        }
    }

    /// Called once the UI has re-rendered. Returns whether anything was held.
    pub fn settle(&mut self) -> bool {
        self.held.take().is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.held.is_some()
    }
}
