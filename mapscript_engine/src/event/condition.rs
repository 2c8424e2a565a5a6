//! Condition nodes: branch on game state, the trigger, or player input.

use crate::event::{EventId, MapId, NodeId};
use crate::state::{Ailment, StateStore};
use crate::trigger::EventTrigger;

/// What a condition node tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConditionType {
    GlobalVariable,
    EventBit,
    DoorLocked,
    ChestLocked,
    CharacterBit,
    PartyMember,
    ItemOwned,
    UseItem,
    KnowWord,
    LastEventResult,
    GameOptionSet,
    Direction,
    HasAilment,
    Hand,
    SayWord,
    EnterNumber,
    Levitating,
    HasGold,
    HasFood,
    Eye,
}

impl ConditionType {
    /// Code 11 is unused in the data format.
    pub fn from_code(code: u8) -> Option<ConditionType> {
        use ConditionType::*;
        let kind = match code {
            0 => GlobalVariable,
            1 => EventBit,
            2 => DoorLocked,
            3 => ChestLocked,
            4 => CharacterBit,
            5 => PartyMember,
            6 => ItemOwned,
            7 => UseItem,
            8 => KnowWord,
            9 => LastEventResult,
            10 => GameOptionSet,
            12 => Direction,
            13 => HasAilment,
            14 => Hand,
            15 => SayWord,
            16 => EnterNumber,
            17 => Levitating,
            18 => HasGold,
            19 => HasFood,
            20 => Eye,
            _ => return None,
        };
        Some(kind)
    }
}

/// Location of a per-map bit addressed by a flat object index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitAddress {
    pub map: MapId,
    pub bit: u16,
}

impl BitAddress {
    /// Event bits: 64 per map, maps start at 1.
    pub fn event_bit(object_index: u16) -> Self {
        Self {
            map: 1 + (object_index >> 6),
            bit: object_index & 0x3f,
        }
    }

    /// Bit that deactivates tile event `event_id` on `map`. It is the same bit
    /// an EventBit condition reaches with object index `64 * (map - 1) + event_id - 1`.
    pub fn tile_event(map: MapId, event_id: EventId) -> Self {
        Self {
            map,
            bit: event_id.saturating_sub(1),
        }
    }

    /// Character bits: 32 per map, maps start at 1.
    pub fn character_bit(object_index: u16) -> Self {
        Self {
            map: 1 + (object_index >> 5),
            bit: object_index & 0x1f,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEvent {
    pub condition_type: ConditionType,
    pub object_index: u16,
    /// Expected result; any nonzero value means "true".
    pub value: u16,
    pub count: u16,
    pub alternate_next: Option<NodeId>,
}

/// Result of evaluating a condition against the current context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConditionCheck {
    /// The predicate was evaluated and compared with the expected value.
    Decided { matched: bool },
    /// Needs a spoken word from the player.
    AwaitWord,
    /// Needs a number from the player.
    AwaitNumber,
    /// Input conditions invoked by the wrong cursor.
    WrongTrigger,
}

impl ConditionEvent {
    pub fn expected(&self) -> bool {
        self.value != 0
    }

    pub fn check(&self, state: &dyn StateStore, trigger: EventTrigger, last_status: bool) -> ConditionCheck {
        let holds = match self.condition_type {
            ConditionType::SayWord => {
                return if trigger == EventTrigger::Mouth {
                    ConditionCheck::AwaitWord
                } else {
                    ConditionCheck::WrongTrigger
                };
            },
            ConditionType::EnterNumber => {
                return if trigger == EventTrigger::Hand {
                    ConditionCheck::AwaitNumber
                } else {
                    ConditionCheck::WrongTrigger
                };
            },
            ConditionType::GlobalVariable => state.global_variable(self.object_index),
            ConditionType::EventBit => {
                let at = BitAddress::event_bit(self.object_index);
                state.event_bit(at.map, at.bit)
            },
            ConditionType::CharacterBit => {
                let at = BitAddress::character_bit(self.object_index);
                state.character_bit(at.map, at.bit)
            },
            ConditionType::DoorLocked => state.is_door_locked(self.object_index),
            ConditionType::ChestLocked => state.is_chest_locked(self.object_index),
            ConditionType::PartyMember => state
                .party()
                .iter()
                .any(|member| member.character_index == self.object_index),
            ConditionType::ItemOwned => {
                let owned: u32 = state
                    .party()
                    .iter()
                    .map(|member| member.item_count(self.object_index))
                    .sum();
                owned >= u32::from(self.count.max(1))
            },
            ConditionType::UseItem => trigger == EventTrigger::Item(self.object_index),
            ConditionType::KnowWord => state.knows_word(self.object_index),
            ConditionType::LastEventResult => last_status,
            ConditionType::GameOptionSet => state.game_option(self.object_index),
            ConditionType::Direction => u16::from(state.direction().code()) == self.object_index,
            ConditionType::HasAilment => {
                let ailment = u8::try_from(self.object_index).ok().and_then(Ailment::from_index);
                match (ailment, state.party().get(state.active_member())) {
                    (Some(ailment), Some(member)) => member.has_ailment(ailment),
                    _ => false,
                }
            },
            ConditionType::Hand => trigger == EventTrigger::Hand,
            ConditionType::Eye => trigger == EventTrigger::Eye,
            ConditionType::Levitating => trigger == EventTrigger::Levitating,
            ConditionType::HasGold => party_total(state, |m| m.gold) >= u32::from(self.count),
            ConditionType::HasFood => party_total(state, |m| m.food) >= u32::from(self.count),
        };
        ConditionCheck::Decided {
            matched: holds == self.expected(),
        }
    }
}

fn party_total(state: &dyn StateStore, field: impl Fn(&crate::state::PartyMember) -> u32) -> u32 {
    state.party().iter().map(field).sum()
}
