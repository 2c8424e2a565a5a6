//! Collaborators borrowed for the duration of one walk.

use crate::{config::EngineConfig, dictionary::Dictionary, hooks::WorldHooks, rng::RandomSource, state::StateStore};

pub struct EventEnv<'a> {
    pub state: &'a mut dyn StateStore,
    pub world: &'a mut dyn WorldHooks,
    pub rng: &'a mut dyn RandomSource,
    pub config: &'a EngineConfig,
    pub dictionary: &'a Dictionary,
}
