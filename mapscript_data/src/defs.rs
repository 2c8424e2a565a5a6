use serde::{Deserialize, Serialize};

/// Raw link value meaning "no node".
pub const NO_LINK: u16 = 0xFFFF;

/// Event bits stored per map. Tile event `n` is deactivated through bit `n - 1`,
/// so a map holds at most this many chains.
pub const EVENT_BITS_PER_MAP: usize = 64;

/// Declared event type codes as they appear in `EventDef::event_type`.
pub mod codes {
    pub const TELEPORT: u8 = 1;
    pub const DOOR: u8 = 2;
    pub const CHEST: u8 = 3;
    pub const POPUP_TEXT: u8 = 4;
    pub const SPINNER: u8 = 5;
    pub const TRAP: u8 = 6;
    pub const REMOVE_BUFFS: u8 = 7;
    pub const RIDDLEMOUTH: u8 = 8;
    pub const AWARD: u8 = 9;
    pub const CHANGE_TILE: u8 = 10;
    pub const START_BATTLE: u8 = 11;
    pub const ENTER_PLACE: u8 = 12;
    pub const CONDITION: u8 = 13;
    pub const ACTION: u8 = 14;
    pub const DICE_100_ROLL: u8 = 15;
    pub const CONVERSATION: u8 = 16;
    pub const DECISION: u8 = 19;
    pub const CHANGE_MUSIC: u8 = 20;
    pub const SPAWN: u8 = 22;
}

/// Event table of a single map, as written by the map tooling.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MapEventsDef {
    pub map_index: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_3d: bool,
    pub width: u8,
    pub height: u8,
    #[serde(default)]
    pub battle_background: u8,
    /// Flat node table. Links are indices into this list.
    #[serde(default)]
    pub events: Vec<EventDef>,
    /// Event list: entry `n` is the first node of the chain with event id `n + 1`.
    #[serde(default)]
    pub chain_heads: Vec<u16>,
    #[serde(default)]
    pub tiles: Vec<TileEventDef>,
    #[serde(default)]
    pub texts: Vec<String>,
}

/// Event id placed on a map tile. Coordinates are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEventDef {
    pub x: u8,
    pub y: u8,
    pub event_id: u16,
}

/// One node of the event graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    /// Declared type code; must agree with the payload kind.
    pub event_type: u8,
    #[serde(default = "no_link")]
    pub next: u16,
    pub payload: PayloadDef,
}

fn no_link() -> u16 {
    NO_LINK
}

/// Type-specific node fields in their raw encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayloadDef {
    Teleport {
        map: u16,
        x: u8,
        y: u8,
        #[serde(default)]
        direction: Option<u8>,
        #[serde(default)]
        transition: u8,
    },
    Door {
        door: u16,
        #[serde(default)]
        key: Option<u16>,
        #[serde(default)]
        lockpick_reduction: u8,
        #[serde(default)]
        unlock_text: Option<u16>,
        #[serde(default = "no_link")]
        unlock_failed: u16,
    },
    Chest {
        chest: u16,
        #[serde(default)]
        key: Option<u16>,
        #[serde(default)]
        lockpick_reduction: u8,
        #[serde(default)]
        search_check: bool,
        #[serde(default)]
        text: Option<u16>,
        #[serde(default = "no_link")]
        unlock_failed: u16,
    },
    PopupText {
        text: u16,
        #[serde(default)]
        image: Option<u8>,
        #[serde(default)]
        trigger_by_moving: bool,
        #[serde(default)]
        trigger_by_cursor: bool,
    },
    Spinner {
        #[serde(default)]
        direction: Option<u8>,
    },
    Trap {
        target: u8,
        base_damage: u8,
        #[serde(default)]
        ailment: Option<u8>,
    },
    RemoveBuffs {
        #[serde(default)]
        buff: Option<u8>,
    },
    Riddlemouth {
        riddle_text: u16,
        solution_text: u16,
        #[serde(default)]
        answers: Vec<u16>,
    },
    Award {
        target: u8,
        award_type: u8,
        operation: u8,
        #[serde(default)]
        random: bool,
        #[serde(default)]
        type_value: u16,
        value: u16,
    },
    ChangeTile {
        #[serde(default)]
        map: u16,
        #[serde(default)]
        x: u8,
        #[serde(default)]
        y: u8,
        tile: u16,
    },
    StartBattle {
        monster_group: u16,
    },
    EnterPlace {
        place_type: u8,
        place: u16,
        #[serde(default)]
        opening_hour: u8,
        #[serde(default)]
        closing_hour: u8,
        #[serde(default)]
        closed_text: u16,
        #[serde(default)]
        used_map: Option<u16>,
    },
    Condition {
        condition_type: u8,
        #[serde(default)]
        object_index: u16,
        #[serde(default)]
        value: u16,
        #[serde(default)]
        count: u16,
        #[serde(default = "no_link")]
        alternate: u16,
    },
    Action {
        action_type: u8,
        #[serde(default)]
        object_index: u16,
        #[serde(default)]
        value: u16,
        #[serde(default)]
        count: u16,
    },
    Dice100Roll {
        chance: u8,
        #[serde(default = "no_link")]
        alternate: u16,
    },
    Conversation {
        interaction: u8,
    },
    Decision {
        text: u16,
        #[serde(default = "no_link")]
        no: u16,
    },
    ChangeMusic {
        song: u16,
        #[serde(default = "full_volume")]
        volume: u8,
    },
    Spawn {
        #[serde(default)]
        map: u16,
        x: u8,
        y: u8,
        travel_type: u8,
    },
    /// Payload of an event type this format revision does not know.
    Raw(Vec<u8>),
}

fn full_volume() -> u8 {
    255
}

impl PayloadDef {
    /// Type code implied by the payload kind, or `None` for raw payloads.
    pub fn type_code(&self) -> Option<u8> {
        let code = match self {
            PayloadDef::Teleport { .. } => codes::TELEPORT,
            PayloadDef::Door { .. } => codes::DOOR,
            PayloadDef::Chest { .. } => codes::CHEST,
            PayloadDef::PopupText { .. } => codes::POPUP_TEXT,
            PayloadDef::Spinner { .. } => codes::SPINNER,
            PayloadDef::Trap { .. } => codes::TRAP,
            PayloadDef::RemoveBuffs { .. } => codes::REMOVE_BUFFS,
            PayloadDef::Riddlemouth { .. } => codes::RIDDLEMOUTH,
            PayloadDef::Award { .. } => codes::AWARD,
            PayloadDef::ChangeTile { .. } => codes::CHANGE_TILE,
            PayloadDef::StartBattle { .. } => codes::START_BATTLE,
            PayloadDef::EnterPlace { .. } => codes::ENTER_PLACE,
            PayloadDef::Condition { .. } => codes::CONDITION,
            PayloadDef::Action { .. } => codes::ACTION,
            PayloadDef::Dice100Roll { .. } => codes::DICE_100_ROLL,
            PayloadDef::Conversation { .. } => codes::CONVERSATION,
            PayloadDef::Decision { .. } => codes::DECISION,
            PayloadDef::ChangeMusic { .. } => codes::CHANGE_MUSIC,
            PayloadDef::Spawn { .. } => codes::SPAWN,
            PayloadDef::Raw(_) => return None,
        };
        Some(code)
    }

    /// Secondary links carried by the payload (alternate / "no" / unlock-failed branches).
    pub fn extra_links(&self) -> Vec<u16> {
        let links = match self {
            PayloadDef::Door { unlock_failed, .. } | PayloadDef::Chest { unlock_failed, .. } => vec![*unlock_failed],
            PayloadDef::Condition { alternate, .. } | PayloadDef::Dice100Roll { alternate, .. } => vec![*alternate],
            PayloadDef::Decision { no, .. } => vec![*no],
            _ => Vec::new(),
        };
        links.into_iter().filter(|link| *link != NO_LINK).collect()
    }
}

/// Global dictionary of words the party can learn and say.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DictionaryDef {
    #[serde(default)]
    pub words: Vec<String>,
}
