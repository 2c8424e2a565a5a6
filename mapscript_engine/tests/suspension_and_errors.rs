mod common;

use common::{Harness, map, suspended};
use mapscript_engine::event::{
    AwardTarget, ChangeMusicEvent, ChestEvent, ConditionEvent, ConditionType, ConversationEvent, DecisionEvent,
    DoorEvent, EnterPlaceEvent, EventNode, EventPayload, EventType, InteractionType, NodeId, RiddlemouthEvent,
    StartBattleEvent, TrapEvent, TrapHit,
};
use mapscript_engine::hooks::{HookCall, Message};
use mapscript_engine::state::{Ailment, PartyMember, StatValue};
use mapscript_engine::{
    Awaiting, ChainOrigin, ChainOutcome, Continuation, EventError, EventMap, EventTrigger, Response, ScriptedRng,
    StateStore, Suspension,
};

fn music(song: u16) -> EventPayload {
    EventPayload::ChangeMusic(ChangeMusicEvent {
        song_index: song,
        volume: 255,
    })
}

fn songs(harness: &Harness) -> Vec<u16> {
    harness
        .hooks
        .calls
        .iter()
        .filter_map(|call| match call {
            HookCall::PlayMusic(song, _) => Some(*song),
            _ => None,
        })
        .collect()
}

fn single_tile(nodes: Vec<(Option<u16>, EventPayload)>) -> EventMap {
    let mut map = map(2, false, nodes, &[0]);
    map.battle_background = 3;
    map.place_event(1, 1, 1);
    map
}

#[test]
fn decision_branches_on_the_answer() {
    let map = single_tile(vec![
        (
            Some(1),
            EventPayload::Decision(DecisionEvent {
                text_index: 0,
                no_next: Some(NodeId(2)),
            }),
        ),
        (None, music(1)),
        (None, music(2)),
    ]);
    let mut harness = Harness::new();

    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Move));
    assert_eq!(pending.awaiting, Awaiting::Decision { text_index: 0 });
    assert_eq!(pending.continuation.node, NodeId(0));
    assert_eq!(harness.resume(&map, pending, Response::Yes), Ok(ChainOutcome::Completed(true)));

    harness.session.dedup.reset();
    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Move));
    assert_eq!(harness.resume(&map, pending, Response::No), Ok(ChainOutcome::Completed(false)));
    assert_eq!(songs(&harness), vec![1, 2]);
}

#[test]
fn wrong_riddle_answer_asks_again() {
    let map = single_tile(vec![
        (
            Some(1),
            EventPayload::Riddlemouth(RiddlemouthEvent {
                riddle_text_index: 0,
                solution_text_index: 1,
                answers: vec![0],
            }),
        ),
        (None, music(5)),
    ]);
    let mut harness = Harness::new();

    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Hand));
    let again = suspended(harness.resume(&map, pending.clone(), Response::Word("sun".into())));
    assert_eq!(again, pending);
    assert!(songs(&harness).is_empty());

    assert_eq!(
        harness.resume(&map, again, Response::Word("Moon".into())),
        Ok(ChainOutcome::Completed(true))
    );
    assert_eq!(songs(&harness), vec![5]);
}

#[test]
fn doors_take_the_failure_branch_until_unlocked() {
    let map = single_tile(vec![
        (
            Some(1),
            EventPayload::Door(DoorEvent {
                door_index: 3,
                key_index: Some(8),
                lockpick_reduction: 20,
                unlock_text_index: None,
                unlock_failed_next: Some(NodeId(2)),
            }),
        ),
        (None, music(1)),
        (None, music(2)),
    ]);
    let mut harness = Harness::new();

    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Move));
    assert!(matches!(pending.awaiting, Awaiting::Door { door_index: 3, key_index: Some(8), .. }));
    assert_eq!(harness.resume(&map, pending, Response::Closed), Ok(ChainOutcome::Completed(false)));

    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Move));
    assert_eq!(harness.resume(&map, pending, Response::Unlocked), Ok(ChainOutcome::Completed(true)));
    assert!(!harness.save.is_door_locked(3));

    // Unlocked doors no longer stop the walk.
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Move), Ok(ChainOutcome::Completed(true)));
    assert_eq!(songs(&harness), vec![2, 1, 1]);
}

fn input_condition(condition_type: ConditionType, object_index: u16) -> EventPayload {
    EventPayload::Condition(ConditionEvent {
        condition_type,
        object_index,
        value: 1,
        count: 0,
        alternate_next: None,
    })
}

#[test]
fn spoken_words_need_the_mouth_cursor() {
    let map = single_tile(vec![(Some(1), input_condition(ConditionType::SayWord, 1)), (None, music(1))]);
    let mut harness = Harness::new();

    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Move), Ok(ChainOutcome::Aborted));

    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Mouth));
    assert_eq!(pending.awaiting, Awaiting::SayWord);
    assert_eq!(
        harness.resume(&map, pending, Response::Word("ember".into())),
        Ok(ChainOutcome::Completed(true))
    );
}

#[test]
fn numbers_need_the_hand_cursor() {
    let map = single_tile(vec![(Some(1), input_condition(ConditionType::EnterNumber, 1234)), (None, music(1))]);
    let mut harness = Harness::new();

    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Hand));
    assert_eq!(pending.awaiting, Awaiting::EnterNumber);
    assert_eq!(harness.resume(&map, pending.clone(), Response::Number(1)), Ok(ChainOutcome::Aborted));
    assert_eq!(harness.resume(&map, pending, Response::Number(1234)), Ok(ChainOutcome::Completed(true)));
    assert_eq!(songs(&harness), vec![1]);
}

#[test]
fn mismatched_responses_are_errors() {
    let map = single_tile(vec![(
        None,
        EventPayload::Decision(DecisionEvent {
            text_index: 0,
            no_next: None,
        }),
    )]);
    let mut harness = Harness::new();
    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Move));

    let err = harness.resume(&map, pending, Response::Number(3)).unwrap_err();
    assert!(matches!(err, EventError::UnexpectedResponse { node: NodeId(0), .. }));
}

#[test]
fn resuming_a_node_that_never_suspends_is_an_error() {
    let map = single_tile(vec![(None, music(1))]);
    let mut harness = Harness::new();
    let forged = Suspension {
        awaiting: Awaiting::Conversation,
        continuation: Continuation {
            origin: ChainOrigin {
                map_index: 2,
                x: 1,
                y: 1,
                event_id: Some(1),
            },
            node: NodeId(0),
            status: false,
        },
    };
    assert_eq!(
        harness.resume(&map, forged, Response::Closed),
        Err(EventError::NotSuspendable(NodeId(0)))
    );
}

fn member(name: &str, hit_points: u32) -> PartyMember {
    PartyMember {
        name: name.into(),
        hit_points: StatValue::new(hit_points, hit_points),
        ..PartyMember::default()
    }
}

#[test]
fn traps_hurt_every_living_member_before_suspending() {
    let map = single_tile(vec![
        (
            Some(1),
            EventPayload::Trap(TrapEvent {
                target: AwardTarget::All,
                base_damage: 6,
                ailment: Some(Ailment::Poisoned),
            }),
        ),
        (None, music(4)),
    ]);
    let mut harness = Harness::new();
    harness.save.party = vec![member("Ash", 10), member("Bex", 3), member("Cy", 0)];
    harness.save.party[2].set_ailment(Ailment::Dead, true);
    harness.rng = ScriptedRng::new(vec![4]);

    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Move));
    let Awaiting::Trap { hits } = &pending.awaiting else {
        panic!("expected a trap, got {:?}", pending.awaiting);
    };
    assert_eq!(hits.len(), 2);
    assert_eq!(
        hits[0],
        TrapHit {
            member: 0,
            damage: 4,
            ailment: Some(Ailment::Poisoned)
        }
    );
    assert_eq!(harness.save.party[0].hit_points.current, 6);
    assert!(harness.save.party[0].has_ailment(Ailment::Poisoned));
    assert!(!harness.save.party[1].is_alive());

    assert_eq!(harness.resume(&map, pending, Response::Closed), Ok(ChainOutcome::Completed(false)));
    assert_eq!(songs(&harness), vec![4]);
}

#[test]
fn trap_seen_by_the_eye_warns_and_aborts() {
    let map = single_tile(vec![(
        None,
        EventPayload::Trap(TrapEvent {
            target: AwardTarget::ActivePlayer,
            base_damage: 6,
            ailment: None,
        }),
    )]);
    let mut harness = Harness::new();
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Eye), Ok(ChainOutcome::Aborted));
    assert_eq!(
        harness.hooks.calls,
        vec![HookCall::Message(Message::Engine(harness.config.messages.trap_seen.clone()))]
    );
}

#[test]
fn battles_continue_only_when_won() {
    let map = single_tile(vec![
        (Some(1), EventPayload::StartBattle(StartBattleEvent { monster_group_index: 12 })),
        (None, music(9)),
    ]);
    let mut harness = Harness::new();

    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Move));
    assert_eq!(
        pending.awaiting,
        Awaiting::Battle {
            monster_group_index: 12,
            background: 3
        }
    );
    assert_eq!(harness.resume(&map, pending.clone(), Response::Fled), Ok(ChainOutcome::Completed(false)));
    assert!(songs(&harness).is_empty());
    assert_eq!(harness.resume(&map, pending, Response::Won), Ok(ChainOutcome::Completed(true)));
    assert_eq!(songs(&harness), vec![9]);
}

#[test]
fn conversations_open_only_when_talking() {
    let map = single_tile(vec![(
        None,
        EventPayload::Conversation(ConversationEvent {
            interaction: InteractionType::Talk,
        }),
    )]);
    let mut harness = Harness::new();
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Move), Ok(ChainOutcome::Aborted));
    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Mouth));
    assert_eq!(pending.awaiting, Awaiting::Conversation);
}

fn inn() -> EventPayload {
    EventPayload::EnterPlace(EnterPlaceEvent {
        place_type: 1,
        place_index: 4,
        opening_hour: 8,
        closing_hour: 22,
        closed_text_index: 6,
        used_map_index: Some(30),
    })
}

#[test]
fn closed_or_refused_places_abort() {
    let map = single_tile(vec![(None, inn())]);
    let mut harness = Harness::new();

    harness.save.hour = 23;
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Move), Ok(ChainOutcome::Aborted));
    assert_eq!(harness.hooks.calls, vec![HookCall::Message(Message::MapText(6))]);

    harness.hooks.calls.clear();
    harness.save.hour = 12;
    harness.hooks.allow_entry = false;
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Move), Ok(ChainOutcome::Aborted));
    assert_eq!(
        harness.hooks.calls,
        vec![
            HookCall::EnterPlace(1, 4),
            HookCall::Message(Message::Engine(harness.config.messages.place_refused.clone()))
        ]
    );

    harness.hooks.calls.clear();
    harness.hooks.allow_entry = true;
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Move), Ok(ChainOutcome::Completed(false)));
    assert_eq!(harness.hooks.calls, vec![HookCall::EnterPlace(1, 4)]);
}

#[test]
fn hidden_chests_need_a_successful_search() {
    let chest = EventPayload::Chest(ChestEvent {
        chest_index: 2,
        key_index: None,
        lockpick_reduction: 0,
        search_skill_check: true,
        text_index: Some(1),
        unlock_failed_next: None,
    });
    let map = single_tile(vec![(None, chest)]);
    let mut harness = Harness::new();
    let mut searcher = member("Ash", 10);
    searcher.skills = vec![StatValue::new(40, 100); 9];
    harness.save.party = vec![searcher];

    harness.rng = ScriptedRng::new(vec![75]);
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Move), Ok(ChainOutcome::Aborted));
    assert_eq!(
        harness.hooks.calls,
        vec![HookCall::Message(Message::Engine(harness.config.messages.search_failed.clone()))]
    );

    harness.rng = ScriptedRng::new(vec![10]);
    let pending = suspended(harness.tile(&map, 1, 1, EventTrigger::Move));
    assert!(matches!(pending.awaiting, Awaiting::Chest { chest_index: 2, locked: true, .. }));
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Mouth), Ok(ChainOutcome::Aborted));
}

#[test]
fn one_character_interaction_per_tick() {
    let map = map(2, false, vec![(None, music(1))], &[0]);
    let mut harness = Harness::new();

    assert_eq!(harness.character(&map, 1, EventTrigger::Mouth), Ok(ChainOutcome::Completed(false)));
    assert_eq!(harness.character(&map, 1, EventTrigger::Mouth), Ok(ChainOutcome::Suppressed));
    harness.session.end_tick();
    assert_eq!(harness.character(&map, 1, EventTrigger::Mouth), Ok(ChainOutcome::Completed(false)));
    assert_eq!(songs(&harness), vec![1, 1]);
    assert_eq!(harness.session.dedup.last(), (None, None));
}

#[test]
fn cycles_hit_the_step_limit() {
    let mut map = map(2, false, vec![(Some(1), music(1)), (Some(0), music(2))], &[0]);
    map.place_event(0, 0, 1);
    let mut harness = Harness::new();
    harness.config.max_chain_steps = 10;

    assert_eq!(
        harness.tile(&map, 0, 0, EventTrigger::Move),
        Err(EventError::ChainLimitExceeded {
            start: NodeId(0),
            limit: 10
        })
    );
    assert_eq!(songs(&harness).len(), 10);
}

#[test]
fn corrupt_nodes_and_links_are_reported() {
    let mut mislabeled = EventNode::new(0, None, music(1));
    mislabeled.event_type = EventType::Door;
    let mut mislabeled_map = EventMap::new(2, vec![mislabeled], vec![NodeId(0)]);
    mislabeled_map.place_event(0, 0, 1);
    let mut harness = Harness::new();
    assert!(matches!(
        harness.tile(&mislabeled_map, 0, 0, EventTrigger::Move),
        Err(EventError::CorruptData { node: NodeId(0), .. })
    ));
    assert!(songs(&harness).is_empty());

    let mut dangling = map(7, false, vec![(Some(7), music(1))], &[0]);
    dangling.place_event(0, 0, 1);
    assert!(matches!(
        harness.tile(&dangling, 0, 0, EventTrigger::Move),
        Err(EventError::CorruptData { .. })
    ));

    let mut unknown = map(8, false, vec![(None, music(1))], &[0]);
    unknown.place_event(5, 5, 4);
    assert_eq!(harness.tile(&unknown, 5, 5, EventTrigger::Move), Err(EventError::UnknownEvent(4)));
}

#[test]
fn unknown_event_types_pass_through() {
    let map = single_tile(vec![(Some(1), EventPayload::Unknown(vec![1, 2, 3])), (None, music(3))]);
    let mut harness = Harness::new();
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Move), Ok(ChainOutcome::Completed(false)));
    assert_eq!(songs(&harness), vec![3]);
}

#[test]
fn empty_and_deactivated_tiles_do_nothing() {
    let map = single_tile(vec![(None, music(1))]);
    let mut harness = Harness::new();
    assert_eq!(harness.tile(&map, 9, 9, EventTrigger::Move), Ok(ChainOutcome::NoEvent));
    harness.save.set_event_bit(2, 0, true);
    assert_eq!(harness.tile(&map, 1, 1, EventTrigger::Move), Ok(ChainOutcome::NoEvent));
    assert!(harness.hooks.calls.is_empty());
}
