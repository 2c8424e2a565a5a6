//! Chain walking and the suspend/resume protocol.
//!
//! A walk starts at a chain head and runs nodes until one ends the chain,
//! rejects the interaction, or needs an answer from the player. In the last
//! case the walk returns a [`Suspension`]; nothing of the walk survives except
//! that value. The host shows whatever [`Awaiting`] asks for and later hands
//! the suspension back to [`resume`] together with the player's [`Response`].

use log::{debug, info};
use variantly::Variantly;

use crate::dispatch::{self, Cursor, Step};
use crate::env::EventEnv;
use crate::error::EventError;
use crate::event::{BitAddress, ConditionType, EventId, EventPayload, MapId, NodeId, TrapHit};
use crate::map::EventMap;
use crate::session::Session;
use crate::trigger::EventTrigger;

/// Where a walk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainOrigin {
    pub map_index: MapId,
    /// 0-based position of the triggering tile or character.
    pub x: u8,
    pub y: u8,
    /// Tile event that started the walk; `None` for character chains.
    pub event_id: Option<EventId>,
}

/// Everything needed to pick a suspended walk back up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub origin: ChainOrigin,
    /// The node that suspended.
    pub node: NodeId,
    /// `last_event_status` at the moment of suspension.
    pub status: bool,
}

/// What the host has to present before the walk can continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Awaiting {
    Popup {
        text_index: u16,
        image_index: Option<u8>,
    },
    Decision {
        text_index: u16,
    },
    Riddle {
        riddle_text_index: u16,
        solution_text_index: u16,
    },
    Conversation,
    SayWord,
    EnterNumber,
    Door {
        door_index: u16,
        key_index: Option<u16>,
        lockpick_reduction: u8,
        unlock_text_index: Option<u16>,
    },
    Chest {
        chest_index: u16,
        key_index: Option<u16>,
        lockpick_reduction: u8,
        locked: bool,
        text_index: Option<u16>,
    },
    Battle {
        monster_group_index: u16,
        background: u8,
    },
    /// The trap already fired; the host plays its effect.
    Trap {
        hits: Vec<TrapHit>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suspension {
    pub awaiting: Awaiting,
    pub continuation: Continuation,
}

/// The player's answer to an [`Awaiting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Dismissed, or closed without success.
    Closed,
    Yes,
    No,
    Word(String),
    Number(u32),
    /// The lock of a door or chest was opened.
    Unlocked,
    Won,
    Fled,
}

#[derive(Debug, Clone, PartialEq, Eq, Variantly)]
pub enum ChainOutcome {
    /// Nothing to run: no event on the tile, or its event is deactivated.
    NoEvent,
    /// Swallowed by the dedup or re-entrancy guard.
    Suppressed,
    /// Ran to the end; carries the final `last_event_status`.
    Completed(bool),
    /// A node rejected the interaction.
    Aborted,
    Suspended(Suspension),
}

/// Player interaction with the 0-based tile `(x, y)`.
///
/// # Errors
/// - `UnknownEvent` if the tile refers to a missing chain
/// - `CorruptData` / `ChainLimitExceeded` from the walk
pub fn trigger_tile(
    session: &mut Session,
    map: &EventMap,
    env: &mut EventEnv<'_>,
    x: u8,
    y: u8,
    trigger: EventTrigger,
) -> Result<ChainOutcome, EventError> {
    let active = map
        .tile_event(x, y)
        .filter(|event_id| {
            let at = BitAddress::tile_event(map.index, *event_id);
            !env.state.event_bit(at.map, at.bit)
        });
    let Some(event_id) = active else {
        // stepping off onto a quiet tile lets the previous event fire again
        if trigger == EventTrigger::Move {
            session.dedup.clear_last_event(map.index);
        }
        debug!("no active event at ({x}, {y}) on map {}", map.index);
        return Ok(ChainOutcome::NoEvent);
    };
    let head = map.chain_head(event_id)?;
    if session.dedup.should_suppress(map, event_id, trigger)? {
        return Ok(ChainOutcome::Suppressed);
    }
    let origin = ChainOrigin {
        map_index: map.index,
        x,
        y,
        event_id: Some(event_id),
    };
    run_chain(map, env, origin, head, trigger, false)
}

/// Interaction with an NPC or monster standing at `(x, y)` whose chain is `event_id`.
///
/// Only one character interaction may start per tick.
///
/// # Errors
/// - as [`trigger_tile`]
pub fn trigger_character(
    session: &mut Session,
    map: &EventMap,
    env: &mut EventEnv<'_>,
    event_id: EventId,
    x: u8,
    y: u8,
    trigger: EventTrigger,
) -> Result<ChainOutcome, EventError> {
    let head = map.chain_head(event_id)?;
    if !session.begin_character_interaction() {
        debug!("character interaction already running this tick, ignoring event {event_id}");
        return Ok(ChainOutcome::Suppressed);
    }
    let origin = ChainOrigin {
        map_index: map.index,
        x,
        y,
        event_id: None,
    };
    run_chain(map, env, origin, head, trigger, false)
}

/// Walk from `start` until the chain ends, aborts or suspends.
///
/// # Errors
/// - `CorruptData` on dangling links or mismatched payloads
/// - `ChainLimitExceeded` after `config.max_chain_steps` nodes
pub fn run_chain(
    map: &EventMap,
    env: &mut EventEnv<'_>,
    origin: ChainOrigin,
    start: NodeId,
    trigger: EventTrigger,
    status: bool,
) -> Result<ChainOutcome, EventError> {
    info!("walking chain from node {start} on map {} ({trigger})", map.index);
    let limit = env.config.max_chain_steps;
    let mut cursor = Cursor { origin, trigger, status };
    let mut current = Some(start);
    let mut steps = 0;

    while let Some(id) = current {
        steps += 1;
        if steps > limit {
            return Err(EventError::ChainLimitExceeded { start, limit });
        }
        let node = map.node(id)?;
        match dispatch::execute(map, env, node, &mut cursor)? {
            Step::Next(next) => current = next,
            Step::Abort => return Ok(ChainOutcome::Aborted),
            Step::Await(awaiting) => {
                debug!("chain suspended at node {id}: {awaiting:?}");
                return Ok(ChainOutcome::Suspended(Suspension {
                    awaiting,
                    continuation: Continuation {
                        origin,
                        node: id,
                        status: cursor.status,
                    },
                }));
            },
        }
    }
    Ok(ChainOutcome::Completed(cursor.status))
}

/// How a response continues the walk.
enum Branch {
    Continue { next: Option<NodeId>, status: bool },
    Abort,
    Again,
}

/// Continue a suspended walk with the player's response.
///
/// The walk restarts as a fresh invocation with trigger `Always`.
///
/// # Errors
/// - `NotSuspendable` if the continuation points at a node that never suspends
/// - `UnexpectedResponse` if the response does not fit the node
/// - any error of the continued walk
pub fn resume(
    map: &EventMap,
    env: &mut EventEnv<'_>,
    suspension: Suspension,
    response: Response,
) -> Result<ChainOutcome, EventError> {
    let Continuation { origin, node: id, status } = suspension.continuation.clone();
    let node = map.node(id)?;
    node.validate()?;
    let unexpected = || EventError::UnexpectedResponse {
        node: id,
        response: format!("{response:?}"),
    };
    info!("resuming node {id} with {response:?}");

    let branch = match &node.payload {
        EventPayload::PopupText(_) | EventPayload::Conversation(_) | EventPayload::Trap(_) => match response {
            Response::Closed => Branch::Continue { next: node.next, status },
            _ => return Err(unexpected()),
        },
        EventPayload::Decision(decision) => match response {
            Response::Yes => Branch::Continue {
                next: node.next,
                status: true,
            },
            Response::No => Branch::Continue {
                next: decision.no_next,
                status: false,
            },
            _ => return Err(unexpected()),
        },
        EventPayload::Riddlemouth(riddle) => match &response {
            Response::Word(word) if riddle.answers.iter().any(|answer| env.dictionary.matches(*answer, word)) => {
                Branch::Continue {
                    next: node.next,
                    status: true,
                }
            },
            Response::Word(_) => Branch::Again,
            Response::Closed => Branch::Continue {
                next: None,
                status: false,
            },
            _ => return Err(unexpected()),
        },
        EventPayload::Condition(condition) => {
            let matched = match (condition.condition_type, &response) {
                (ConditionType::SayWord, Response::Word(word)) => {
                    env.dictionary.matches(condition.object_index, word)
                },
                (ConditionType::EnterNumber, Response::Number(number)) => {
                    *number == u32::from(condition.object_index)
                },
                (
                    ConditionType::SayWord | ConditionType::EnterNumber,
                    Response::Closed,
                ) => false,
                (ConditionType::SayWord | ConditionType::EnterNumber, _) => {
                    return Err(unexpected());
                },
                _ => return Err(EventError::NotSuspendable(id)),
            };
            let mut cursor = Cursor {
                origin,
                trigger: EventTrigger::Always,
                status,
            };
            match dispatch::follow_condition(matched, condition, &mut cursor, node.next) {
                Step::Next(next) => Branch::Continue {
                    next,
                    status: cursor.status,
                },
                _ => Branch::Abort,
            }
        },
        EventPayload::Door(door) => match response {
            Response::Unlocked => {
                env.state.set_door_locked(door.door_index, false);
                Branch::Continue {
                    next: node.next,
                    status: true,
                }
            },
            Response::Closed if !env.state.is_door_locked(door.door_index) => Branch::Continue {
                next: node.next,
                status: true,
            },
            Response::Closed => Branch::Continue {
                next: door.unlock_failed_next,
                status: false,
            },
            _ => return Err(unexpected()),
        },
        EventPayload::Chest(chest) => match response {
            Response::Unlocked => {
                env.state.set_chest_locked(chest.chest_index, false);
                Branch::Continue {
                    next: node.next,
                    status: true,
                }
            },
            Response::Closed if !env.state.is_chest_locked(chest.chest_index) => Branch::Continue {
                next: node.next,
                status: true,
            },
            Response::Closed => Branch::Continue {
                next: chest.unlock_failed_next,
                status: false,
            },
            _ => return Err(unexpected()),
        },
        EventPayload::StartBattle(_) => match response {
            Response::Won => Branch::Continue {
                next: node.next,
                status: true,
            },
            Response::Fled => Branch::Continue {
                next: None,
                status: false,
            },
            _ => return Err(unexpected()),
        },
        _ => return Err(EventError::NotSuspendable(id)),
    };

    match branch {
        Branch::Continue { next: Some(next), status } => {
            run_chain(map, env, origin, next, EventTrigger::Always, status)
        },
        Branch::Continue { next: None, status } => Ok(ChainOutcome::Completed(status)),
        Branch::Abort => Ok(ChainOutcome::Aborted),
        Branch::Again => Ok(ChainOutcome::Suspended(suspension)),
    }
}
