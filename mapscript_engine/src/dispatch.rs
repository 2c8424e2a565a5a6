//! Per-node execution.
//!
//! [`execute`] runs exactly one node and tells the walker where to go next.
//! Each kind decides from the current trigger whether it runs, passes the
//! walk through untouched, or rejects the whole interaction.

use log::{info, warn};

use crate::chain::{Awaiting, ChainOrigin};
use crate::env::EventEnv;
use crate::error::EventError;
use crate::event::{
    BitAddress, ConditionCheck, ConditionEvent, Direction, EventNode, EventPayload, InteractionType, NodeId,
    spring_trap,
};
use crate::hooks::Message;
use crate::map::EventMap;
use crate::trigger::EventTrigger;

/// What the walker does after a node ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// Continue at the given node; `None` ends the chain normally.
    Next(Option<NodeId>),
    /// Reject the interaction; nothing else runs.
    Abort,
    /// Stop until the host answers.
    Await(Awaiting),
}

/// Mutable walk state threaded through the nodes of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub origin: ChainOrigin,
    pub trigger: EventTrigger,
    /// Result of the last branching node.
    pub status: bool,
}

/// Run one node.
///
/// # Errors
/// - `CorruptData` if the payload does not match the declared type
pub(crate) fn execute(
    map: &EventMap,
    env: &mut EventEnv<'_>,
    node: &EventNode,
    cursor: &mut Cursor,
) -> Result<Step, EventError> {
    node.validate()?;
    let id = node.index;
    let trigger = cursor.trigger;
    info!("└─ node {id}: {:?} ({trigger})", node.event_type);

    let step = match &node.payload {
        EventPayload::Teleport(teleport) => {
            if matches!(trigger, EventTrigger::Move | EventTrigger::Always) {
                let map_index = if teleport.map_index == 0 {
                    cursor.origin.map_index
                } else {
                    teleport.map_index
                };
                env.world
                    .teleport(map_index, teleport.x, teleport.y, teleport.direction, teleport.transition);
                Step::Next(None)
            } else {
                Step::Next(node.next)
            }
        },
        EventPayload::Door(door) => {
            if env.state.is_door_locked(door.door_index) {
                Step::Await(Awaiting::Door {
                    door_index: door.door_index,
                    key_index: door.key_index,
                    lockpick_reduction: door.lockpick_reduction,
                    unlock_text_index: door.unlock_text_index,
                })
            } else {
                cursor.status = true;
                Step::Next(node.next)
            }
        },
        EventPayload::Chest(chest) => {
            if trigger == EventTrigger::Mouth {
                Step::Abort
            } else if chest.search_skill_check && !passes_search_check(env) {
                env.world
                    .show_message(Message::Engine(env.config.messages.search_failed.clone()));
                Step::Abort
            } else {
                Step::Await(Awaiting::Chest {
                    chest_index: chest.chest_index,
                    key_index: chest.key_index,
                    lockpick_reduction: chest.lockpick_reduction,
                    locked: env.state.is_chest_locked(chest.chest_index),
                    text_index: chest.text_index,
                })
            }
        },
        EventPayload::PopupText(popup) => {
            let accepted = match trigger {
                EventTrigger::Always => true,
                EventTrigger::Move => popup.can_trigger_by_moving,
                EventTrigger::Eye => popup.can_trigger_by_cursor,
                _ => false,
            };
            if accepted {
                Step::Await(Awaiting::Popup {
                    text_index: popup.text_index,
                    image_index: popup.image_index,
                })
            } else {
                Step::Abort
            }
        },
        EventPayload::Spinner(spinner) => match trigger {
            EventTrigger::Move | EventTrigger::Always => {
                let direction = spinner.direction.unwrap_or_else(|| random_direction(env));
                env.state.set_direction(direction);
                env.world.spin(direction);
                Step::Next(node.next)
            },
            EventTrigger::Eye => {
                env.world
                    .show_message(Message::Engine(env.config.messages.spinner_seen.clone()));
                Step::Abort
            },
            _ => Step::Next(node.next),
        },
        EventPayload::Trap(trap) => match trigger {
            EventTrigger::Move | EventTrigger::Always => Step::Await(Awaiting::Trap {
                hits: spring_trap(id, trap, env),
            }),
            EventTrigger::Eye => {
                env.world
                    .show_message(Message::Engine(env.config.messages.trap_seen.clone()));
                Step::Abort
            },
            _ => Step::Abort,
        },
        EventPayload::RemoveBuffs(remove) => {
            let cleared = env.state.remove_buffs(remove.buff);
            info!("└─ node {id}: cleared {cleared} buff(s)");
            Step::Next(node.next)
        },
        EventPayload::Riddlemouth(riddle) => match trigger {
            EventTrigger::Always | EventTrigger::Eye | EventTrigger::Hand | EventTrigger::Mouth => {
                Step::Await(Awaiting::Riddle {
                    riddle_text_index: riddle.riddle_text_index,
                    solution_text_index: riddle.solution_text_index,
                })
            },
            _ => Step::Next(node.next),
        },
        EventPayload::Award(award) => {
            award.apply(id, env);
            Step::Next(node.next)
        },
        EventPayload::ChangeTile(change) => {
            let origin = cursor.origin;
            let target = change.resolve(origin.map_index, origin.x, origin.y);
            env.state.record_tile_change(target, change.tile_index);
            env.world.update_map_tile(target, change.tile_index);
            if let Some(event_id) = origin.event_id {
                let at = BitAddress::tile_event(origin.map_index, event_id);
                env.state.set_event_bit(at.map, at.bit, true);
            }
            Step::Next(node.next)
        },
        EventPayload::StartBattle(battle) => Step::Await(Awaiting::Battle {
            monster_group_index: battle.monster_group_index,
            background: map.battle_background,
        }),
        EventPayload::EnterPlace(place) => {
            if !place.is_open_at(env.state.hour()) {
                env.world.show_message(Message::MapText(place.closed_text_index));
                Step::Abort
            } else if env
                .world
                .enter_place(place.place_type, place.place_index, place.used_map_index)
            {
                Step::Next(None)
            } else {
                env.world
                    .show_message(Message::Engine(env.config.messages.place_refused.clone()));
                Step::Abort
            }
        },
        EventPayload::Condition(condition) => branch_on_condition(id, condition, env, cursor, node.next),
        EventPayload::Action(action) => {
            action.apply(id, env)?;
            Step::Next(node.next)
        },
        EventPayload::Dice100Roll(dice) => {
            let roll = env.rng.roll_dice100();
            cursor.status = roll < u32::from(dice.chance);
            info!("└─ node {id}: rolled {roll} against {}%", dice.chance);
            if cursor.status {
                Step::Next(node.next)
            } else {
                dice.alternate_next.map_or(Step::Abort, |alternate| Step::Next(Some(alternate)))
            }
        },
        EventPayload::Conversation(conversation) => {
            if trigger == EventTrigger::Mouth && conversation.interaction == InteractionType::Talk {
                Step::Await(Awaiting::Conversation)
            } else {
                Step::Abort
            }
        },
        EventPayload::Decision(decision) => Step::Await(Awaiting::Decision {
            text_index: decision.text_index,
        }),
        EventPayload::ChangeMusic(music) => {
            env.world.play_music(music.song_index, music.volume);
            Step::Next(node.next)
        },
        EventPayload::Spawn(spawn) => {
            let map_index = if spawn.map_index == 0 {
                cursor.origin.map_index
            } else {
                spawn.map_index
            };
            env.world.spawn(map_index, spawn.x, spawn.y, spawn.travel_type);
            Step::Next(node.next)
        },
        EventPayload::Unknown(bytes) => {
            warn!(
                "└─ node {id}: unknown event type {} ({} payload bytes), passing through",
                node.event_type.code(),
                bytes.len()
            );
            Step::Next(node.next)
        },
    };

    if step == Step::Abort {
        info!("└─ node {id}: interaction rejected");
    }
    Ok(step)
}

fn branch_on_condition(
    id: NodeId,
    condition: &ConditionEvent,
    env: &EventEnv<'_>,
    cursor: &mut Cursor,
    next: Option<NodeId>,
) -> Step {
    match condition.check(&*env.state, cursor.trigger, cursor.status) {
        ConditionCheck::Decided { matched } => {
            info!("└─ node {id}: {:?} matched = {matched}", condition.condition_type);
            follow_condition(matched, condition, cursor, next)
        },
        ConditionCheck::AwaitWord => Step::Await(Awaiting::SayWord),
        ConditionCheck::AwaitNumber => Step::Await(Awaiting::EnterNumber),
        ConditionCheck::WrongTrigger => Step::Abort,
    }
}

/// Route a decided condition: on a match the rest of the chain runs as `Always`.
pub(crate) fn follow_condition(
    matched: bool,
    condition: &ConditionEvent,
    cursor: &mut Cursor,
    next: Option<NodeId>,
) -> Step {
    cursor.status = matched;
    if matched {
        cursor.trigger = EventTrigger::Always;
        Step::Next(next)
    } else {
        condition
            .alternate_next
            .map_or(Step::Abort, |alternate| Step::Next(Some(alternate)))
    }
}

fn passes_search_check(env: &mut EventEnv<'_>) -> bool {
    let skill = env
        .state
        .party()
        .get(env.state.active_member())
        .and_then(|member| member.skills.get(env.config.searching_skill))
        .map_or(0, |stat| stat.current);
    env.rng.roll_dice100() < skill
}

fn random_direction(env: &mut EventEnv<'_>) -> Direction {
    let roll = env.rng.random_int(0, 3);
    u8::try_from(roll)
        .ok()
        .and_then(Direction::from_code)
        .unwrap_or_default()
}
