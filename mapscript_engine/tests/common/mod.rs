#![allow(dead_code)]

use mapscript_engine::event::{EventNode, EventPayload, NodeId};
use mapscript_engine::hooks::HookCall;
use mapscript_engine::{
    ChainOutcome, Dictionary, EngineConfig, EventEnv, EventError, EventMap, EventTrigger, RecordingHooks,
    Savegame, ScriptedRng, Session, Suspension, chain,
};

/// Map with `nodes` given as `(next, payload)` in table order.
pub fn map(index: u16, is_3d: bool, nodes: Vec<(Option<u16>, EventPayload)>, heads: &[u16]) -> EventMap {
    let nodes = nodes
        .into_iter()
        .zip(0u16..)
        .map(|((next, payload), id)| EventNode::new(id, next, payload))
        .collect();
    let mut map = EventMap::new(index, nodes, heads.iter().copied().map(NodeId).collect());
    map.is_3d = is_3d;
    map.width = 16;
    map.height = 16;
    map
}

/// Interpreter collaborators with recording hooks and scripted dice.
pub struct Harness {
    pub save: Savegame,
    pub hooks: RecordingHooks,
    pub rng: ScriptedRng,
    pub config: EngineConfig,
    pub dictionary: Dictionary,
    pub session: Session,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            save: Savegame::default(),
            hooks: RecordingHooks {
                calls: Vec::new(),
                allow_entry: true,
            },
            rng: ScriptedRng::new(vec![0]),
            config: EngineConfig::default(),
            dictionary: Dictionary::new(vec!["moon".into(), "ember".into()]),
            session: Session::new(),
        }
    }

    pub fn tile(&mut self, map: &EventMap, x: u8, y: u8, trigger: EventTrigger) -> Result<ChainOutcome, EventError> {
        let mut env = EventEnv {
            state: &mut self.save,
            world: &mut self.hooks,
            rng: &mut self.rng,
            config: &self.config,
            dictionary: &self.dictionary,
        };
        chain::trigger_tile(&mut self.session, map, &mut env, x, y, trigger)
    }

    pub fn character(
        &mut self,
        map: &EventMap,
        event_id: u16,
        trigger: EventTrigger,
    ) -> Result<ChainOutcome, EventError> {
        let mut env = EventEnv {
            state: &mut self.save,
            world: &mut self.hooks,
            rng: &mut self.rng,
            config: &self.config,
            dictionary: &self.dictionary,
        };
        chain::trigger_character(&mut self.session, map, &mut env, event_id, 4, 4, trigger)
    }

    pub fn resume(
        &mut self,
        map: &EventMap,
        suspension: Suspension,
        response: chain::Response,
    ) -> Result<ChainOutcome, EventError> {
        let mut env = EventEnv {
            state: &mut self.save,
            world: &mut self.hooks,
            rng: &mut self.rng,
            config: &self.config,
            dictionary: &self.dictionary,
        };
        chain::resume(map, &mut env, suspension, response)
    }

    pub fn count(&self, matches: impl Fn(&HookCall) -> bool) -> usize {
        self.hooks.calls.iter().filter(|call| matches(call)).count()
    }
}

pub fn suspended(outcome: Result<ChainOutcome, EventError>) -> Suspension {
    match outcome {
        Ok(ChainOutcome::Suspended(suspension)) => suspension,
        other => panic!("expected a suspension, got {other:?}"),
    }
}
