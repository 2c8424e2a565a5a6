//! View module.
//!
//! Event chains never print. World callbacks and console results are collected
//! as [`ViewItem`]s during a command and shown together by [`View::flush`].

use colored::Colorize;
use log::info;
use variantly::Variantly;

use crate::event::{Direction, MapId, TileTarget, Transition};
use crate::hooks::{Message, WorldHooks};
use crate::style::GameStyle;

const ICON_WORLD: &str = "⌘";
const ICON_PROMPT: &str = "?";
const ICON_ERROR: &str = "⚠︎";
const ICON_ENGINE: &str = "⚙";

#[derive(Debug, Clone, PartialEq, Eq, Variantly)]
pub enum ViewItem {
    MapText(String),
    EngineMessage(String),
    Teleported {
        map_index: MapId,
        x: u8,
        y: u8,
        direction: Option<Direction>,
        transition: Transition,
    },
    TileChanged {
        target: TileTarget,
        tile_index: u16,
    },
    Spun(Direction),
    EnteredPlace {
        place_type: u8,
        place_index: u16,
        used_map: Option<MapId>,
    },
    Music {
        song_index: u16,
        volume: u8,
    },
    Spawned {
        map_index: MapId,
        x: u8,
        y: u8,
        travel_type: u8,
    },
    ItemUncursed {
        member: usize,
        item_index: u16,
    },
    /// Something the player has to answer.
    Prompt(String),
    /// How the last walk ended.
    Outcome(String),
    /// Console listings (`tiles`, `party`, `help`, ...).
    Info(String),
    Error(String),
}

/// Collects the output of one console command.
#[derive(Debug, Clone, Default)]
pub struct View {
    /// Text table of the loaded map, for resolving `Message::MapText`.
    texts: Vec<String>,
    /// Answer given to `enter_place`.
    pub allow_entry: bool,
    pub items: Vec<ViewItem>,
}

impl View {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            allow_entry: true,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: ViewItem) {
        self.items.push(item);
    }

    fn map_text(&self, index: u16) -> String {
        self.texts
            .get(usize::from(index))
            .cloned()
            .unwrap_or_else(|| format!("<missing text {index}>"))
    }

    /// Print and clear everything collected so far.
    pub fn flush(&mut self) {
        for item in self.items.drain(..) {
            println!("{}", render(&item));
        }
    }
}

fn render(item: &ViewItem) -> String {
    match item {
        ViewItem::MapText(text) => format!("  {}", text.map_text_style()),
        ViewItem::EngineMessage(text) => format!("{} {}", ICON_ENGINE.dimmed(), text.world_style()),
        ViewItem::Teleported {
            map_index,
            x,
            y,
            direction,
            transition,
        } => {
            let facing = direction.map_or_else(String::new, |d| format!(" facing {d:?}"));
            format!(
                "{} {}",
                ICON_WORLD.dimmed(),
                format!("{transition:?} to map {map_index} at ({x}, {y}){facing}").world_style()
            )
        },
        ViewItem::TileChanged { target, tile_index } => format!(
            "{} {}",
            ICON_WORLD.dimmed(),
            format!(
                "tile ({}, {}) on map {} becomes {tile_index}",
                target.x, target.y, target.map_index
            )
            .world_style()
        ),
        ViewItem::Spun(direction) => {
            format!("{} {}", ICON_WORLD.dimmed(), format!("spun to face {direction:?}").world_style())
        },
        ViewItem::EnteredPlace {
            place_type,
            place_index,
            used_map,
        } => {
            let inside = used_map.map_or_else(String::new, |map| format!(" (map {map})"));
            format!(
                "{} {}",
                ICON_WORLD.dimmed(),
                format!("entered place {place_index} of type {place_type}{inside}").world_style()
            )
        },
        ViewItem::Music { song_index, volume } => format!(
            "{} {}",
            ICON_WORLD.dimmed(),
            format!("music: song {song_index} at volume {volume}").world_style()
        ),
        ViewItem::Spawned {
            map_index,
            x,
            y,
            travel_type,
        } => format!(
            "{} {}",
            ICON_WORLD.dimmed(),
            format!("spawned on map {map_index} at ({x}, {y}) travelling by {travel_type}").world_style()
        ),
        ViewItem::ItemUncursed { member, item_index } => format!(
            "{} {}",
            ICON_WORLD.dimmed(),
            format!("item {item_index} of member {member} is no longer cursed").world_style()
        ),
        ViewItem::Prompt(text) => format!("{} {}", ICON_PROMPT.prompt_style(), text.prompt_style()),
        ViewItem::Outcome(text) => format!("{}", text.outcome_style()),
        ViewItem::Info(text) => text.clone(),
        ViewItem::Error(text) => format!("{} {}", ICON_ERROR.error_style(), text.error_style()),
    }
}

impl WorldHooks for View {
    fn teleport(&mut self, map_index: MapId, x: u8, y: u8, direction: Option<Direction>, transition: Transition) {
        info!("teleport to map {map_index} ({x}, {y})");
        self.push(ViewItem::Teleported {
            map_index,
            x,
            y,
            direction,
            transition,
        });
    }

    fn update_map_tile(&mut self, target: TileTarget, tile_index: u16) {
        self.push(ViewItem::TileChanged { target, tile_index });
    }

    fn spin(&mut self, direction: Direction) {
        self.push(ViewItem::Spun(direction));
    }

    fn enter_place(&mut self, place_type: u8, place_index: u16, used_map: Option<MapId>) -> bool {
        if self.allow_entry {
            self.push(ViewItem::EnteredPlace {
                place_type,
                place_index,
                used_map,
            });
        }
        self.allow_entry
    }

    fn play_music(&mut self, song_index: u16, volume: u8) {
        self.push(ViewItem::Music { song_index, volume });
    }

    fn spawn(&mut self, map_index: MapId, x: u8, y: u8, travel_type: u8) {
        self.push(ViewItem::Spawned {
            map_index,
            x,
            y,
            travel_type,
        });
    }

    fn show_message(&mut self, message: Message) {
        let item = match message {
            Message::MapText(index) => ViewItem::MapText(self.map_text(index)),
            Message::Engine(text) => ViewItem::EngineMessage(text),
        };
        self.push(item);
    }

    fn item_uncursed(&mut self, member: usize, item_index: u16) {
        self.push(ViewItem::ItemUncursed { member, item_index });
    }
}
