#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! Map event interpreter.
//!
//! Walks per-map event chains on tile and character interactions, branches on
//! persistent game state and suspends whenever a node needs an answer from the
//! player.

pub const MAPSCRIPT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod chain;
pub mod command;
pub mod config;
pub mod data_paths;
pub mod dedup;
pub mod dictionary;
mod dispatch;
pub mod env;
pub mod error;
pub mod event;
pub mod hooks;
pub mod loader;
pub mod map;
pub mod repl;
pub mod rng;
pub mod session;
pub mod state;
pub mod style;
pub mod trigger;
pub mod view;

pub use chain::{
    Awaiting, ChainOrigin, ChainOutcome, Continuation, Response, Suspension, resume, run_chain, trigger_character,
    trigger_tile,
};
pub use config::{EngineConfig, load_config};
pub use dictionary::Dictionary;
pub use env::EventEnv;
pub use error::EventError;
pub use hooks::{Message, RecordingHooks, WorldHooks};
pub use map::EventMap;
pub use repl::{Console, run_repl};
pub use rng::{GameRng, RandomSource, ScriptedRng};
pub use session::Session;
pub use state::{Savegame, StateStore};
pub use trigger::{EventTrigger, Interaction, classify};
pub use view::{View, ViewItem};
