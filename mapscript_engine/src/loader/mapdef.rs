//! Conversion from the serialized `MapEventsDef` to the runtime `EventMap`.
//!
//! Raw codes that do not decode (unknown condition kinds, directions, ...) are
//! reported as `CorruptData` for the node that carries them. Unknown *event
//! types* are kept as `EventPayload::Unknown` and pass through at run time.

use mapscript_data::{EventDef, MapEventsDef, PayloadDef};

use crate::error::EventError;
use crate::event::{
    ActionEvent, ActionType, AwardEvent, AwardOperation, AwardTarget, AwardType, ChangeMusicEvent, ChangeTileEvent,
    ChestEvent, ConditionEvent, ConditionType, ConversationEvent, DecisionEvent, Dice100RollEvent, Direction,
    DoorEvent, EnterPlaceEvent, EventNode, EventPayload, EventType, InteractionType, NodeId, PopupTextEvent,
    RemoveBuffsEvent, RiddlemouthEvent, SpawnEvent, SpinnerEvent, StartBattleEvent, TeleportEvent, Transition,
    TrapEvent, link_from_raw,
};
use crate::map::EventMap;
use crate::state::Ailment;

/// Build the runtime map. Expects `def` to have passed `validate_map`.
///
/// # Errors
/// - `CorruptData` for the first node whose raw codes do not decode
pub fn build_map_from_def(def: &MapEventsDef) -> Result<EventMap, EventError> {
    let nodes = def
        .events
        .iter()
        .enumerate()
        .map(|(index, event)| node_from_def(index, event))
        .collect::<Result<Vec<_>, _>>()?;
    let chain_heads = def.chain_heads.iter().map(|head| NodeId(*head)).collect();

    let mut map = EventMap::new(def.map_index, nodes, chain_heads);
    map.name.clone_from(&def.name);
    map.is_3d = def.is_3d;
    map.width = def.width;
    map.height = def.height;
    map.battle_background = def.battle_background;
    map.texts.clone_from(&def.texts);
    for tile in &def.tiles {
        map.place_event(tile.x, tile.y, tile.event_id);
    }
    Ok(map)
}

/// Convert one node. `index` is its position in the node table.
///
/// # Errors
/// - `CorruptData` if a raw code is out of range
pub fn node_from_def(index: usize, def: &EventDef) -> Result<EventNode, EventError> {
    let id = NodeId(u16::try_from(index).map_err(|_| EventError::corrupt(NodeId(u16::MAX), "node table too large"))?);
    let bad = |what: &str, code: u16| EventError::corrupt(id, format!("invalid {what} code {code}"));

    let payload = match &def.payload {
        PayloadDef::Teleport {
            map,
            x,
            y,
            direction,
            transition,
        } => EventPayload::Teleport(TeleportEvent {
            map_index: *map,
            x: *x,
            y: *y,
            direction: decode_direction(*direction).map_err(|code| bad("direction", code))?,
            transition: Transition::from_code(*transition).ok_or_else(|| bad("transition", (*transition).into()))?,
        }),
        PayloadDef::Door {
            door,
            key,
            lockpick_reduction,
            unlock_text,
            unlock_failed,
        } => EventPayload::Door(DoorEvent {
            door_index: *door,
            key_index: *key,
            lockpick_reduction: *lockpick_reduction,
            unlock_text_index: *unlock_text,
            unlock_failed_next: link_from_raw(*unlock_failed),
        }),
        PayloadDef::Chest {
            chest,
            key,
            lockpick_reduction,
            search_check,
            text,
            unlock_failed,
        } => EventPayload::Chest(ChestEvent {
            chest_index: *chest,
            key_index: *key,
            lockpick_reduction: *lockpick_reduction,
            search_skill_check: *search_check,
            text_index: *text,
            unlock_failed_next: link_from_raw(*unlock_failed),
        }),
        PayloadDef::PopupText {
            text,
            image,
            trigger_by_moving,
            trigger_by_cursor,
        } => EventPayload::PopupText(PopupTextEvent {
            text_index: *text,
            image_index: *image,
            can_trigger_by_moving: *trigger_by_moving,
            can_trigger_by_cursor: *trigger_by_cursor,
        }),
        PayloadDef::Spinner { direction } => EventPayload::Spinner(SpinnerEvent {
            direction: decode_direction(*direction).map_err(|code| bad("direction", code))?,
        }),
        PayloadDef::Trap {
            target,
            base_damage,
            ailment,
        } => EventPayload::Trap(TrapEvent {
            target: AwardTarget::from_code(*target).ok_or_else(|| bad("trap target", (*target).into()))?,
            base_damage: *base_damage,
            ailment: match ailment {
                Some(code) => Some(Ailment::from_index(*code).ok_or_else(|| bad("ailment", (*code).into()))?),
                None => None,
            },
        }),
        PayloadDef::RemoveBuffs { buff } => EventPayload::RemoveBuffs(RemoveBuffsEvent { buff: *buff }),
        PayloadDef::Riddlemouth {
            riddle_text,
            solution_text,
            answers,
        } => EventPayload::Riddlemouth(RiddlemouthEvent {
            riddle_text_index: *riddle_text,
            solution_text_index: *solution_text,
            answers: answers.clone(),
        }),
        PayloadDef::Award {
            target,
            award_type,
            operation,
            random,
            type_value,
            value,
        } => EventPayload::Award(AwardEvent {
            target: AwardTarget::from_code(*target).ok_or_else(|| bad("award target", (*target).into()))?,
            award_type: AwardType::from_code(*award_type, *type_value)
                .ok_or_else(|| bad("award type", (*award_type).into()))?,
            operation: AwardOperation::from_code(*operation)
                .ok_or_else(|| bad("award operation", (*operation).into()))?,
            random: *random,
            value: *value,
        }),
        PayloadDef::ChangeTile { map, x, y, tile } => {
            EventPayload::ChangeTile(ChangeTileEvent::new(*map, *x, *y, *tile))
        },
        PayloadDef::StartBattle { monster_group } => EventPayload::StartBattle(StartBattleEvent {
            monster_group_index: *monster_group,
        }),
        PayloadDef::EnterPlace {
            place_type,
            place,
            opening_hour,
            closing_hour,
            closed_text,
            used_map,
        } => EventPayload::EnterPlace(EnterPlaceEvent {
            place_type: *place_type,
            place_index: *place,
            opening_hour: *opening_hour,
            closing_hour: *closing_hour,
            closed_text_index: *closed_text,
            used_map_index: *used_map,
        }),
        PayloadDef::Condition {
            condition_type,
            object_index,
            value,
            count,
            alternate,
        } => EventPayload::Condition(ConditionEvent {
            condition_type: ConditionType::from_code(*condition_type)
                .ok_or_else(|| bad("condition", (*condition_type).into()))?,
            object_index: *object_index,
            value: *value,
            count: *count,
            alternate_next: link_from_raw(*alternate),
        }),
        PayloadDef::Action {
            action_type,
            object_index,
            value,
            count,
        } => EventPayload::Action(ActionEvent {
            action_type: ActionType::from_code(*action_type).ok_or_else(|| bad("action", (*action_type).into()))?,
            object_index: *object_index,
            value: *value,
            count: *count,
        }),
        PayloadDef::Dice100Roll { chance, alternate } => EventPayload::Dice100Roll(Dice100RollEvent {
            chance: (*chance).min(100),
            alternate_next: link_from_raw(*alternate),
        }),
        PayloadDef::Conversation { interaction } => EventPayload::Conversation(ConversationEvent {
            interaction: InteractionType::from_code(*interaction)
                .ok_or_else(|| bad("interaction", (*interaction).into()))?,
        }),
        PayloadDef::Decision { text, no } => EventPayload::Decision(DecisionEvent {
            text_index: *text,
            no_next: link_from_raw(*no),
        }),
        PayloadDef::ChangeMusic { song, volume } => EventPayload::ChangeMusic(ChangeMusicEvent {
            song_index: *song,
            volume: *volume,
        }),
        PayloadDef::Spawn {
            map,
            x,
            y,
            travel_type,
        } => EventPayload::Spawn(SpawnEvent {
            map_index: *map,
            x: *x,
            y: *y,
            travel_type: *travel_type,
        }),
        PayloadDef::Raw(bytes) => EventPayload::Unknown(bytes.clone()),
    };

    Ok(EventNode {
        index: id,
        event_type: EventType::from_code(def.event_type),
        next: link_from_raw(def.next),
        payload,
    })
}

fn decode_direction(code: Option<u8>) -> Result<Option<Direction>, u16> {
    match code {
        None => Ok(None),
        Some(code) => Direction::from_code(code).map(Some).ok_or(u16::from(code)),
    }
}
