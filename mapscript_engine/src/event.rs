//! Event node model.
//!
//! A map's events form a flat, index-addressed table of [`EventNode`]s. Each node
//! carries a declared [`EventType`], an optional link to the next node, and a
//! type-specific [`EventPayload`]. Chains are walked by [`crate::chain`]; the
//! per-kind semantics live in [`crate::dispatch`] and the submodules here.

pub mod action;
pub mod award;
pub mod condition;

pub use action::*;
pub use award::*;
pub use condition::*;

use std::cell::OnceCell;
use std::fmt;

use mapscript_data::{NO_LINK, codes};
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::state::Ailment;

/// Index of a map (1-based; 0 means "the current map" inside event payloads).
pub type MapId = u16;

/// 1-based id of a chain head in a map's event list, as placed on tiles.
pub type EventId = u16;

/// Position of a node in its map's node table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u16);

impl NodeId {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Converts a raw link (`0xFFFF` = none) into an optional node id.
pub fn link_from_raw(raw: u16) -> Option<NodeId> {
    (raw != NO_LINK).then_some(NodeId(raw))
}

/// Declared kind of an event node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Teleport,
    Door,
    Chest,
    PopupText,
    Spinner,
    Trap,
    RemoveBuffs,
    Riddlemouth,
    Award,
    ChangeTile,
    StartBattle,
    EnterPlace,
    Condition,
    Action,
    Dice100Roll,
    Conversation,
    Decision,
    ChangeMusic,
    Spawn,
    Unknown(u8),
}

impl EventType {
    pub fn from_code(code: u8) -> EventType {
        match code {
            codes::TELEPORT => EventType::Teleport,
            codes::DOOR => EventType::Door,
            codes::CHEST => EventType::Chest,
            codes::POPUP_TEXT => EventType::PopupText,
            codes::SPINNER => EventType::Spinner,
            codes::TRAP => EventType::Trap,
            codes::REMOVE_BUFFS => EventType::RemoveBuffs,
            codes::RIDDLEMOUTH => EventType::Riddlemouth,
            codes::AWARD => EventType::Award,
            codes::CHANGE_TILE => EventType::ChangeTile,
            codes::START_BATTLE => EventType::StartBattle,
            codes::ENTER_PLACE => EventType::EnterPlace,
            codes::CONDITION => EventType::Condition,
            codes::ACTION => EventType::Action,
            codes::DICE_100_ROLL => EventType::Dice100Roll,
            codes::CONVERSATION => EventType::Conversation,
            codes::DECISION => EventType::Decision,
            codes::CHANGE_MUSIC => EventType::ChangeMusic,
            codes::SPAWN => EventType::Spawn,
            other => EventType::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            EventType::Teleport => codes::TELEPORT,
            EventType::Door => codes::DOOR,
            EventType::Chest => codes::CHEST,
            EventType::PopupText => codes::POPUP_TEXT,
            EventType::Spinner => codes::SPINNER,
            EventType::Trap => codes::TRAP,
            EventType::RemoveBuffs => codes::REMOVE_BUFFS,
            EventType::Riddlemouth => codes::RIDDLEMOUTH,
            EventType::Award => codes::AWARD,
            EventType::ChangeTile => codes::CHANGE_TILE,
            EventType::StartBattle => codes::START_BATTLE,
            EventType::EnterPlace => codes::ENTER_PLACE,
            EventType::Condition => codes::CONDITION,
            EventType::Action => codes::ACTION,
            EventType::Dice100Roll => codes::DICE_100_ROLL,
            EventType::Conversation => codes::CONVERSATION,
            EventType::Decision => codes::DECISION,
            EventType::ChangeMusic => codes::CHANGE_MUSIC,
            EventType::Spawn => codes::SPAWN,
            EventType::Unknown(code) => code,
        }
    }
}

/// Facing of the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub fn from_code(code: u8) -> Option<Direction> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn code(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}

/// How a teleport is presented.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Transition {
    #[default]
    Teleporter,
    WalkThrough,
    Climbing,
    Falling,
}

impl Transition {
    pub fn from_code(code: u8) -> Option<Transition> {
        match code {
            0 => Some(Transition::Teleporter),
            1 => Some(Transition::WalkThrough),
            2 => Some(Transition::Climbing),
            3 => Some(Transition::Falling),
            _ => None,
        }
    }
}

/// One node of a map's event graph.
#[derive(Debug, Clone)]
pub struct EventNode {
    pub index: NodeId,
    pub event_type: EventType,
    pub next: Option<NodeId>,
    pub payload: EventPayload,
}

impl EventNode {
    pub fn new(index: u16, next: Option<u16>, payload: EventPayload) -> EventNode {
        EventNode {
            index: NodeId(index),
            event_type: payload.event_type().unwrap_or(EventType::Unknown(0)),
            next: next.map(NodeId),
            payload,
        }
    }

    /// Ensure the payload is the kind the declared type promises.
    ///
    /// # Errors
    /// - `CorruptData` when declared type and payload disagree
    pub fn validate(&self) -> Result<(), EventError> {
        let consistent = match (&self.payload, self.event_type) {
            (EventPayload::Unknown(_), EventType::Unknown(_)) => true,
            (payload, declared) => payload.event_type() == Some(declared),
        };
        if consistent {
            Ok(())
        } else {
            Err(EventError::corrupt(
                self.index,
                format!(
                    "declared {:?} but payload is {:?}",
                    self.event_type,
                    self.payload.event_type()
                ),
            ))
        }
    }
}

/// Type-specific fields of a node.
#[derive(Debug, Clone)]
pub enum EventPayload {
    Teleport(TeleportEvent),
    Door(DoorEvent),
    Chest(ChestEvent),
    PopupText(PopupTextEvent),
    Spinner(SpinnerEvent),
    Trap(TrapEvent),
    RemoveBuffs(RemoveBuffsEvent),
    Riddlemouth(RiddlemouthEvent),
    Award(AwardEvent),
    ChangeTile(ChangeTileEvent),
    StartBattle(StartBattleEvent),
    EnterPlace(EnterPlaceEvent),
    Condition(ConditionEvent),
    Action(ActionEvent),
    Dice100Roll(Dice100RollEvent),
    Conversation(ConversationEvent),
    Decision(DecisionEvent),
    ChangeMusic(ChangeMusicEvent),
    Spawn(SpawnEvent),
    Unknown(Vec<u8>),
}

impl EventPayload {
    /// Kind implied by the payload; `None` for unknown payloads.
    pub fn event_type(&self) -> Option<EventType> {
        let kind = match self {
            EventPayload::Teleport(_) => EventType::Teleport,
            EventPayload::Door(_) => EventType::Door,
            EventPayload::Chest(_) => EventType::Chest,
            EventPayload::PopupText(_) => EventType::PopupText,
            EventPayload::Spinner(_) => EventType::Spinner,
            EventPayload::Trap(_) => EventType::Trap,
            EventPayload::RemoveBuffs(_) => EventType::RemoveBuffs,
            EventPayload::Riddlemouth(_) => EventType::Riddlemouth,
            EventPayload::Award(_) => EventType::Award,
            EventPayload::ChangeTile(_) => EventType::ChangeTile,
            EventPayload::StartBattle(_) => EventType::StartBattle,
            EventPayload::EnterPlace(_) => EventType::EnterPlace,
            EventPayload::Condition(_) => EventType::Condition,
            EventPayload::Action(_) => EventType::Action,
            EventPayload::Dice100Roll(_) => EventType::Dice100Roll,
            EventPayload::Conversation(_) => EventType::Conversation,
            EventPayload::Decision(_) => EventType::Decision,
            EventPayload::ChangeMusic(_) => EventType::ChangeMusic,
            EventPayload::Spawn(_) => EventType::Spawn,
            EventPayload::Unknown(_) => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeleportEvent {
    /// Target map; 0 keeps the current map.
    pub map_index: MapId,
    /// 1-based target column.
    pub x: u8,
    /// 1-based target row.
    pub y: u8,
    pub direction: Option<Direction>,
    pub transition: Transition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorEvent {
    pub door_index: u16,
    pub key_index: Option<u16>,
    pub lockpick_reduction: u8,
    pub unlock_text_index: Option<u16>,
    pub unlock_failed_next: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChestEvent {
    pub chest_index: u16,
    pub key_index: Option<u16>,
    pub lockpick_reduction: u8,
    /// Party must pass a searching check before the chest is even found.
    pub search_skill_check: bool,
    pub text_index: Option<u16>,
    pub unlock_failed_next: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupTextEvent {
    pub text_index: u16,
    pub image_index: Option<u8>,
    pub can_trigger_by_moving: bool,
    pub can_trigger_by_cursor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinnerEvent {
    /// Forced facing; `None` spins to a random direction.
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapEvent {
    pub target: AwardTarget,
    pub base_damage: u8,
    pub ailment: Option<Ailment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveBuffsEvent {
    /// Single buff to clear; `None` clears all.
    pub buff: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiddlemouthEvent {
    pub riddle_text_index: u16,
    pub solution_text_index: u16,
    /// Dictionary word indices accepted as the answer.
    pub answers: Vec<u16>,
}

/// Map position a `ChangeTileEvent` rewrites. Coordinates are 1-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTarget {
    pub map_index: MapId,
    pub x: u8,
    pub y: u8,
}

/// Replaces a map tile.
///
/// Zero map/x/y fields mean "the map and tile this chain was triggered from".
/// They are resolved the first time the node executes and the result is kept
/// in the node for every later execution, from whichever tile.
#[derive(Debug, Clone)]
pub struct ChangeTileEvent {
    raw: TileTarget,
    resolved: OnceCell<TileTarget>,
    pub tile_index: u16,
}

impl ChangeTileEvent {
    pub fn new(map_index: MapId, x: u8, y: u8, tile_index: u16) -> ChangeTileEvent {
        ChangeTileEvent {
            raw: TileTarget { map_index, x, y },
            resolved: OnceCell::new(),
            tile_index,
        }
    }

    /// The current target: resolved values once set, raw values before that.
    pub fn target(&self) -> TileTarget {
        self.resolved.get().copied().unwrap_or(self.raw)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Fill zero fields from the invoking map and 0-based position, once.
    pub fn resolve(&self, map_index: MapId, x: u8, y: u8) -> TileTarget {
        let raw = self.raw;
        *self.resolved.get_or_init(|| TileTarget {
            map_index: if raw.map_index == 0 { map_index } else { raw.map_index },
            x: if raw.x == 0 { x.saturating_add(1) } else { raw.x },
            y: if raw.y == 0 { y.saturating_add(1) } else { raw.y },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartBattleEvent {
    pub monster_group_index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnterPlaceEvent {
    pub place_type: u8,
    pub place_index: u16,
    pub opening_hour: u8,
    pub closing_hour: u8,
    pub closed_text_index: u16,
    pub used_map_index: Option<MapId>,
}

impl EnterPlaceEvent {
    /// Whether the place is open at `hour`. Equal hours mean always open;
    /// a closing hour before the opening hour wraps past midnight.
    pub fn is_open_at(&self, hour: u8) -> bool {
        let (open, close) = (self.opening_hour, self.closing_hour);
        match open.cmp(&close) {
            std::cmp::Ordering::Equal => true,
            std::cmp::Ordering::Less => hour >= open && hour < close,
            std::cmp::Ordering::Greater => hour >= open || hour < close,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dice100RollEvent {
    /// Success chance in percent (0-100).
    pub chance: u8,
    pub alternate_next: Option<NodeId>,
}

/// Conversation interaction kinds. Only `Talk` is run from map chains.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InteractionType {
    Keyword,
    ShowItem,
    GiveItem,
    GiveGold,
    GiveFood,
    JoinParty,
    LeaveParty,
    Leave,
    Talk,
}

impl InteractionType {
    pub fn from_code(code: u8) -> Option<InteractionType> {
        use InteractionType::*;
        [Keyword, ShowItem, GiveItem, GiveGold, GiveFood, JoinParty, LeaveParty, Leave, Talk]
            .get(usize::from(code))
            .copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEvent {
    pub interaction: InteractionType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionEvent {
    pub text_index: u16,
    /// Branch for "no"; `next` is the "yes" branch.
    pub no_next: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeMusicEvent {
    pub song_index: u16,
    pub volume: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnEvent {
    pub map_index: MapId,
    pub x: u8,
    pub y: u8,
    pub travel_type: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_sentinel_means_none() {
        assert_eq!(link_from_raw(0xFFFF), None);
        assert_eq!(link_from_raw(12), Some(NodeId(12)));
    }

    #[test]
    fn event_type_codes_round_trip_for_known_and_unknown() {
        assert_eq!(EventType::from_code(13), EventType::Condition);
        assert_eq!(EventType::Condition.code(), 13);
        assert_eq!(EventType::from_code(99), EventType::Unknown(99));
        assert_eq!(EventType::Unknown(99).code(), 99);
    }

    #[test]
    fn change_tile_resolves_zero_fields_once() {
        let event = ChangeTileEvent::new(0, 0, 0, 17);
        assert!(!event.is_resolved());
        let first = event.resolve(5, 3, 4);
        assert_eq!(first, TileTarget { map_index: 5, x: 4, y: 5 });
        let second = event.resolve(8, 10, 10);
        assert_eq!(second, first);
        assert_eq!(event.target(), first);
    }

    #[test]
    fn change_tile_keeps_explicit_fields() {
        let event = ChangeTileEvent::new(2, 0, 9, 1);
        assert_eq!(event.resolve(5, 3, 4), TileTarget { map_index: 2, x: 4, y: 9 });
    }

    #[test]
    fn mismatched_payload_is_corrupt() {
        let mut node = EventNode::new(3, None, EventPayload::Spinner(SpinnerEvent { direction: None }));
        assert!(node.validate().is_ok());
        node.event_type = EventType::Door;
        assert!(matches!(node.validate(), Err(EventError::CorruptData { node: NodeId(3), .. })));
    }

    #[test]
    fn unknown_payload_needs_unknown_type() {
        let mut node = EventNode::new(0, None, EventPayload::Unknown(vec![1]));
        node.event_type = EventType::Unknown(40);
        assert!(node.validate().is_ok());
        node.event_type = EventType::Spinner;
        assert!(node.validate().is_err());
    }

    #[test]
    fn place_hours_wrap_past_midnight() {
        let mut place = EnterPlaceEvent {
            place_type: 0,
            place_index: 1,
            opening_hour: 8,
            closing_hour: 18,
            closed_text_index: 0,
            used_map_index: None,
        };
        assert!(place.is_open_at(8));
        assert!(!place.is_open_at(18));
        place.opening_hour = 20;
        place.closing_hour = 4;
        assert!(place.is_open_at(23));
        assert!(place.is_open_at(2));
        assert!(!place.is_open_at(12));
    }
}
