//! Per-session interpreter state that outlives a single walk.

use crate::dedup::DedupGuard;

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub dedup: DedupGuard,
    character_interaction_active: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the character-interaction slot for this tick.
    /// Returns `false` if another NPC or monster chain already started.
    pub fn begin_character_interaction(&mut self) -> bool {
        if self.character_interaction_active {
            return false;
        }
        self.character_interaction_active = true;
        true
    }

    pub fn character_interaction_active(&self) -> bool {
        self.character_interaction_active
    }

    /// Called by the host once per update tick.
    pub fn end_tick(&mut self) {
        self.character_interaction_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_character_interaction_per_tick() {
        let mut session = Session::new();
        assert!(session.begin_character_interaction());
        assert!(!session.begin_character_interaction());
        session.end_tick();
        assert!(session.begin_character_interaction());
    }
}
