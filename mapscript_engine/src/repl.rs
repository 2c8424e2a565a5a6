//! Interactive console driving the interpreter.
//!
//! The console stands in for the game host: it classifies typed interactions,
//! walks chains against the loaded map and savegame, presents suspensions as
//! prompts and feeds the player's answers back through `resume`.

mod input;
pub mod system;

use std::path::PathBuf;

use anyhow::Result;
use log::{error, info};

use crate::chain::{self, Awaiting, ChainOutcome, Response, Suspension};
use crate::command::{Command, parse_command};
use crate::config::EngineConfig;
use crate::dictionary::Dictionary;
use crate::env::EventEnv;
use crate::error::EventError;
use crate::map::EventMap;
use crate::rng::GameRng;
use crate::session::Session;
use crate::state::Savegame;
use crate::style::GameStyle;
use crate::trigger::{Interaction, classify};
use crate::view::{View, ViewItem};

use input::{InputEvent, InputManager};

/// Control flow signal used by handlers to exit the console.
pub enum ReplControl {
    Continue,
    Quit,
}

/// Everything the console owns between commands.
pub struct Console {
    pub map: EventMap,
    pub save: Savegame,
    pub dictionary: Dictionary,
    pub config: EngineConfig,
    pub session: Session,
    pub view: View,
    /// Default target of `save` and `load`.
    pub save_path: PathBuf,
    rng: GameRng,
    pending: Option<Suspension>,
    tick: u64,
}

impl Console {
    pub fn new(map: EventMap, save: Savegame, dictionary: Dictionary, config: EngineConfig, save_path: PathBuf) -> Self {
        let view = View::new(map.texts.clone());
        Self {
            rng: GameRng::new(config.rng_seed),
            map,
            save,
            dictionary,
            config,
            session: Session::new(),
            view,
            save_path,
            pending: None,
            tick: 0,
        }
    }

    /// The suspension waiting for an answer, if any.
    pub fn pending(&self) -> Option<&Suspension> {
        self.pending.as_ref()
    }

    pub(crate) fn discard_pending(&mut self) {
        if let Some(suspension) = self.pending.take() {
            info!("discarding walk suspended at node {}", suspension.continuation.node);
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Run one parsed command, collecting its output in `self.view`.
    ///
    /// # Errors
    /// Only console-level IO failures are returned; interpreter errors are
    /// reported in the view.
    pub fn execute(&mut self, command: Command) -> Result<ReplControl> {
        match command {
            Command::Interact { interaction, x, y } => self.interact(interaction, x, y),
            Command::Character { event_id, x, y } => self.talk_to_character(event_id, x, y),
            Command::Respond(response) => self.respond(response),
            Command::EndTick => {
                self.session.end_tick();
                self.tick += 1;
                self.view.push(ViewItem::Outcome(format!("tick {} begins", self.tick)));
            },
            Command::ResetGuard => {
                self.session.dedup.reset();
                self.view.push(ViewItem::Outcome("event guard reset".into()));
            },
            Command::SetHour(hour) => {
                self.save.hour = hour;
                self.view.push(ViewItem::Outcome(format!("it is now {hour:02}:00")));
            },
            Command::Tiles => system::tiles_handler(self),
            Command::Party => system::party_handler(self),
            Command::Status => system::status_handler(self),
            Command::Save(path) => system::save_handler(self, path.as_deref()),
            Command::Load(path) => system::load_handler(self, path.as_deref()),
            Command::Help => system::help_handler(&mut self.view),
            Command::Quit => return Ok(ReplControl::Quit),
            Command::Unknown => self
                .view
                .push(ViewItem::Error("Unrecognized command. Type 'help' for a list.".into())),
        }
        Ok(ReplControl::Continue)
    }

    fn interact(&mut self, interaction: Interaction, x: u8, y: u8) {
        if self.refuse_while_pending() {
            return;
        }
        let trigger = classify(interaction);
        info!("{interaction:?} at ({x}, {y}) classified as {trigger}");
        let result = self.walk(|session, map, env| chain::trigger_tile(session, map, env, x, y, trigger));
        self.handle_outcome(result);
    }

    fn talk_to_character(&mut self, event_id: u16, x: u8, y: u8) {
        if self.refuse_while_pending() {
            return;
        }
        let trigger = classify(Interaction::Talk);
        let result =
            self.walk(|session, map, env| chain::trigger_character(session, map, env, event_id, x, y, trigger));
        self.handle_outcome(result);
    }

    fn respond(&mut self, response: Response) {
        let Some(suspension) = self.pending.take() else {
            self.view.push(ViewItem::Error("Nothing is waiting for an answer.".into()));
            return;
        };
        let kept = suspension.clone();
        let result = self.walk(|_, map, env| chain::resume(map, env, suspension, response));
        if let Err(err @ EventError::UnexpectedResponse { .. }) = &result {
            self.view.push(ViewItem::Error(err.to_string()));
            self.view.push(ViewItem::Prompt(describe_awaiting(&self.map, &kept.awaiting)));
            self.pending = Some(kept);
            return;
        }
        self.handle_outcome(result);
    }

    fn refuse_while_pending(&mut self) -> bool {
        if let Some(suspension) = &self.pending {
            let prompt = describe_awaiting(&self.map, &suspension.awaiting);
            self.view.push(ViewItem::Error("Answer the pending prompt first.".into()));
            self.view.push(ViewItem::Prompt(prompt));
            return true;
        }
        false
    }

    /// Borrow the collaborators for one walk.
    fn walk<F>(&mut self, run: F) -> Result<ChainOutcome, EventError>
    where
        F: FnOnce(&mut Session, &EventMap, &mut EventEnv<'_>) -> Result<ChainOutcome, EventError>,
    {
        let mut env = EventEnv {
            state: &mut self.save,
            world: &mut self.view,
            rng: &mut self.rng,
            config: &self.config,
            dictionary: &self.dictionary,
        };
        run(&mut self.session, &self.map, &mut env)
    }

    fn handle_outcome(&mut self, result: Result<ChainOutcome, EventError>) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("event chain failed: {err}");
                self.view.push(ViewItem::Error(err.to_string()));
                return;
            },
        };
        let text = match outcome {
            ChainOutcome::NoEvent => "Nothing happens.".to_string(),
            ChainOutcome::Suppressed => "(the same event does not fire twice in a row)".to_string(),
            ChainOutcome::Completed(status) => format!("Event finished (status: {status})."),
            ChainOutcome::Aborted => "Event ended.".to_string(),
            ChainOutcome::Suspended(suspension) => {
                for line in awaiting_details(&self.map, &suspension.awaiting) {
                    self.view.push(ViewItem::MapText(line));
                }
                self.view
                    .push(ViewItem::Prompt(describe_awaiting(&self.map, &suspension.awaiting)));
                self.pending = Some(suspension);
                return;
            },
        };
        self.view.push(ViewItem::Outcome(text));
    }
}

fn map_text(map: &EventMap, index: u16) -> String {
    map.text(index)
        .map_or_else(|| format!("<missing text {index}>"), str::to_string)
}

/// Texts shown when a node suspends.
fn awaiting_details(map: &EventMap, awaiting: &Awaiting) -> Vec<String> {
    match awaiting {
        Awaiting::Popup { text_index, .. } | Awaiting::Decision { text_index } => vec![map_text(map, *text_index)],
        Awaiting::Riddle { riddle_text_index, .. } => vec![map_text(map, *riddle_text_index)],
        Awaiting::Door {
            unlock_text_index: Some(text),
            ..
        } => vec![map_text(map, *text)],
        Awaiting::Chest {
            text_index: Some(text),
            locked: false,
            ..
        } => vec![map_text(map, *text)],
        Awaiting::Trap { hits } => hits
            .iter()
            .map(|hit| {
                let ailment = hit.ailment.map_or_else(String::new, |a| format!(" and is now {a:?}"));
                format!("Member {} takes {} damage{ailment}.", hit.member, hit.damage)
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// One-line prompt naming the answers the console accepts.
fn describe_awaiting(map: &EventMap, awaiting: &Awaiting) -> String {
    match awaiting {
        Awaiting::Popup { image_index, .. } => match image_index {
            Some(image) => format!("[image {image}] close"),
            None => "close".to_string(),
        },
        Awaiting::Decision { .. } => "yes / no".to_string(),
        Awaiting::Riddle { .. } => "say <answer> / close".to_string(),
        Awaiting::Conversation => "A conversation opens. close".to_string(),
        Awaiting::SayWord => "say <word> / close".to_string(),
        Awaiting::EnterNumber => "enter <number> / close".to_string(),
        Awaiting::Door {
            door_index,
            key_index,
            lockpick_reduction,
            ..
        } => format!(
            "Door {door_index} is locked{}{}. unlock / close",
            key_index.map_or_else(String::new, |key| format!(", key item {key}")),
            lockpick_note(*lockpick_reduction)
        ),
        Awaiting::Chest {
            chest_index,
            key_index,
            lockpick_reduction,
            locked: true,
            ..
        } => format!(
            "Chest {chest_index} is locked{}{}. unlock / close",
            key_index.map_or_else(String::new, |key| format!(", key item {key}")),
            lockpick_note(*lockpick_reduction)
        ),
        Awaiting::Chest { chest_index, .. } => format!("Chest {chest_index} is open. close"),
        Awaiting::Battle {
            monster_group_index,
            background,
        } => format!(
            "Battle against monster group {monster_group_index} (background {background}) on map {}. won / fled",
            map.index
        ),
        Awaiting::Trap { .. } => "close".to_string(),
    }
}

fn lockpick_note(reduction: u8) -> String {
    if reduction == 0 {
        String::new()
    } else {
        format!(", lockpicking -{reduction}%")
    }
}

/// Run the read-eval-print loop until the player quits.
///
/// # Errors
/// - Propagates failures from handlers
pub fn run_repl(console: &mut Console) -> Result<()> {
    let mut input_manager = InputManager::new();
    println!("{}", format!("Map {}: {}", console.map.index, console.map.name).map_title_style());
    loop {
        let prompt = if console.pending.is_some() {
            format!("\n[Tick {}|answer]>> ", console.tick)
        } else {
            format!("\n[Tick {}|{:02}:00]>> ", console.tick, console.save.hour)
        }
        .prompt_style()
        .to_string();

        let Ok(input_event) = input_manager.read_line(&prompt) else {
            console
                .view
                .push(ViewItem::Error("Failed to read input. Try again.".into()));
            console.view.flush();
            continue;
        };
        let input = match input_event {
            InputEvent::Line(line) => line,
            InputEvent::Eof => "quit".to_string(),
            InputEvent::Interrupted => {
                console.view.push(ViewItem::EngineMessage("Command canceled.".into()));
                console.view.flush();
                continue;
            },
        };
        if input.trim().is_empty() {
            continue;
        }

        let control = console.execute(parse_command(&input))?;
        console.view.flush();
        if let ReplControl::Quit = control {
            info!("console closed after {} ticks", console.tick);
            break;
        }
    }
    Ok(())
}
