//! Trigger classification.
//!
//! Every raw player interaction is mapped to exactly one [`EventTrigger`]
//! before a chain is walked. Nodes decide from the trigger whether they run,
//! pass through or reject the interaction.

use std::fmt;

use variantly::Variantly;

/// Raw encoding offset of item triggers: `Item(i)` is stored as `ITEM0 + i`.
pub const ITEM0: u16 = 6;

/// The classified kind of interaction presented to a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Variantly)]
pub enum EventTrigger {
    Move,
    Eye,
    Hand,
    Mouth,
    /// Programmatic re-entry, and every node after a passed condition.
    Always,
    Levitating,
    Item(u16),
}

impl EventTrigger {
    pub fn to_raw(self) -> u16 {
        match self {
            EventTrigger::Move => 0,
            EventTrigger::Eye => 1,
            EventTrigger::Hand => 2,
            EventTrigger::Mouth => 3,
            EventTrigger::Always => 4,
            EventTrigger::Levitating => 5,
            EventTrigger::Item(index) => ITEM0.saturating_add(index),
        }
    }

    pub fn from_raw(raw: u16) -> EventTrigger {
        match raw {
            0 => EventTrigger::Move,
            1 => EventTrigger::Eye,
            2 => EventTrigger::Hand,
            3 => EventTrigger::Mouth,
            4 => EventTrigger::Always,
            5 => EventTrigger::Levitating,
            item => EventTrigger::Item(item - ITEM0),
        }
    }
}

impl fmt::Display for EventTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTrigger::Item(index) => write!(f, "item {index}"),
            other => write!(f, "{}", format!("{other:?}").to_lowercase()),
        }
    }
}

/// What the player physically did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Interaction {
    /// Walked onto (or stood on) the tile.
    Step,
    /// Eye cursor.
    Look,
    /// Hand cursor.
    Touch,
    /// Mouth cursor.
    Talk,
    UseItem(u16),
    /// Re-entry from code rather than the player.
    Scripted,
    /// Moved while under a levitation spell.
    Levitate,
}

/// Map an interaction to its trigger. Total and side-effect free.
pub fn classify(interaction: Interaction) -> EventTrigger {
    match interaction {
        Interaction::Step => EventTrigger::Move,
        Interaction::Look => EventTrigger::Eye,
        Interaction::Touch => EventTrigger::Hand,
        Interaction::Talk => EventTrigger::Mouth,
        Interaction::UseItem(item) => EventTrigger::Item(item),
        Interaction::Scripted => EventTrigger::Always,
        Interaction::Levitate => EventTrigger::Levitating,
    }
}
