//! Busy/idle guard for export and upload actions.

use std::sync::Mutex;

use memeforge_common::error::{MemeforgeError, MemeforgeResult};

/// Admits at most one guarded action at a time.
#[derive(Debug, Default)]
pub struct ActionGate {
    current: Mutex<Option<&'static str>>,
}

/// Held while an action runs; releases the gate on drop.
#[derive(Debug)]
pub struct ActionTicket<'a> {
    gate: &'a ActionGate,
    action: &'static str,
}

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the gate, or fail with [`MemeforgeError::Busy`] naming the
    /// action already in flight.
    pub fn try_begin(&self, action: &'static str) -> MemeforgeResult<ActionTicket<'_>> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(running) = *current {
            tracing::warn!(requested = action, running, "Action rejected while busy");
            return Err(MemeforgeError::busy(running));
        }
        *current = Some(action);
        Ok(ActionTicket { gate: self, action })
    }

    /// The action in flight, if any.
    pub fn current(&self) -> Option<&'static str> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_busy(&self) -> bool {
        self.current().is_some()
    }
}

impl ActionTicket<'_> {
    pub fn action(&self) -> &'static str {
        self.action
    }
}

impl Drop for ActionTicket<'_> {
    fn drop(&mut self) {
        *self.gate.current.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_entry_is_rejected() {
        let gate = ActionGate::new();
        let _ticket = gate.try_begin("upload").unwrap();
        let err = gate.try_begin("export").unwrap_err();
        assert!(matches!(err, MemeforgeError::Busy { ref action } if action == "upload"));
        assert_eq!(err.to_string(), "Another upload is already in progress");
    }

    #[test]
    fn test_drop_releases() {
        let gate = ActionGate::new();
        {
            let ticket = gate.try_begin("export").unwrap();
            assert_eq!(ticket.action(), "export");
            assert!(gate.is_busy());
        }
        assert!(!gate.is_busy());
        assert!(gate.try_begin("upload").is_ok());
    }
}
