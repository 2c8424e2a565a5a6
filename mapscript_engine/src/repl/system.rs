//! Console housekeeping: listings, help and savegame slots.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::event::BitAddress;
use crate::loader::{load_savegame, write_savegame};
use crate::repl::Console;
use crate::state::{Ailment, StateStore};
use crate::style::GameStyle;
use crate::view::{View, ViewItem};

const HELP: &[(&str, &str)] = &[
    ("step|look|touch|talk|levitate <x> <y>", "interact with a tile"),
    ("use <item> <x> <y>", "use an item on a tile"),
    ("run <x> <y>", "run a tile's event as a scripted trigger"),
    ("npc <event> <x> <y>", "talk to a character standing at a tile"),
    ("close | yes | no | unlock | won | fled", "answer the pending prompt"),
    ("say <word> | enter <number>", "answer a word or number prompt"),
    ("tick", "end the current update tick"),
    ("reset", "forget the last triggered event"),
    ("hour <0-23>", "set the time of day"),
    ("tiles | party | status", "show the map and game state"),
    ("save [path] | load [path]", "write or read the savegame"),
    ("quit", "leave the console"),
];

pub fn help_handler(view: &mut View) {
    let mut text = format!("{}\n", "commands".section_style());
    for (usage, what) in HELP {
        text.push_str(&format!("  {:<42} {what}\n", usage.prompt_style()));
    }
    view.push(ViewItem::Info(text));
}

/// List event tiles with their activation state.
pub fn tiles_handler(console: &mut Console) {
    let map = &console.map;
    let mut text = format!("{}\n", format!("map {} tiles", map.index).section_style());
    let tiles = map.event_tiles();
    if tiles.is_empty() {
        text.push_str("  (no event tiles)\n");
    }
    for ((x, y), event_id) in tiles {
        let at = BitAddress::tile_event(map.index, event_id);
        let state = if console.save.event_bit(at.map, at.bit) {
            "deactivated".denied_style()
        } else {
            "active".world_style()
        };
        text.push_str(&format!("  ({x:>3}, {y:>3})  event {event_id:<4} {state}\n"));
    }
    console.view.push(ViewItem::Info(text));
}

pub fn party_handler(console: &mut Console) {
    let save = &console.save;
    let mut text = format!("{}\n", "party".section_style());
    if save.party.is_empty() {
        text.push_str("  (empty)\n");
    }
    for (index, member) in save.party.iter().enumerate() {
        let marker = if index == save.active_member { '*' } else { ' ' };
        let ailments: Vec<String> = Ailment::ALL
            .iter()
            .filter(|ailment| member.has_ailment(**ailment))
            .map(|ailment| format!("{ailment:?}"))
            .collect();
        text.push_str(&format!(
            "{marker} {index}: {:<12} HP {}/{}  gold {}  food {}  weight {}{}\n",
            member.name,
            member.hit_points.current,
            member.hit_points.max,
            member.gold,
            member.food,
            member.total_weight,
            if ailments.is_empty() {
                String::new()
            } else {
                format!("  [{}]", ailments.join(", "))
            }
        ));
    }
    console.view.push(ViewItem::Info(text));
}

pub fn status_handler(console: &mut Console) {
    let save = &console.save;
    let (last_map, last_event) = console.session.dedup.last();
    let mut text = format!("{}\n", "status".section_style());
    text.push_str(&format!(
        "  tick {}  hour {:02}  facing {:?}\n",
        console.tick(),
        save.hour,
        save.direction
    ));
    text.push_str(&format!("  last event: map {last_map:?} event {last_event:?}\n"));
    text.push_str(&format!("  global variables set: {:?}\n", save.global_variables));
    text.push_str(&format!("  deactivated events: {:?}\n", save.event_bits));
    text.push_str(&format!(
        "  unlocked doors: {:?}  unlocked chests: {:?}\n",
        save.unlocked_doors, save.unlocked_chests
    ));
    text.push_str(&format!(
        "  known words: {:?}  tile changes: {}\n",
        save.known_words,
        save.tile_changes.len()
    ));
    if let Some(pending) = console.pending() {
        text.push_str(&format!(
            "  waiting at node {}: {:?}\n",
            pending.continuation.node, pending.awaiting
        ));
    }
    console.view.push(ViewItem::Info(text));
}

fn target_path(console: &Console, path: Option<&str>) -> PathBuf {
    path.map_or_else(|| console.save_path.clone(), |path| Path::new(path).to_path_buf())
}

pub fn save_handler(console: &mut Console, path: Option<&str>) {
    let path = target_path(console, path);
    match write_savegame(&path, &console.save) {
        Ok(()) => console
            .view
            .push(ViewItem::Outcome(format!("Saved to '{}'.", path.display()))),
        Err(err) => {
            warn!("save failed: {err:#}");
            console.view.push(ViewItem::Error(format!("Save failed: {err:#}")));
        },
    }
}

/// Replace the savegame. Any open prompt and the event guard are discarded.
pub fn load_handler(console: &mut Console, path: Option<&str>) {
    let path = target_path(console, path);
    match load_savegame(&path) {
        Ok(save) => {
            console.save = save;
            console.discard_pending();
            console.session.dedup.reset();
            info!("console state replaced from '{}'", path.display());
            console
                .view
                .push(ViewItem::Outcome(format!("Loaded '{}'.", path.display())));
        },
        Err(err) => {
            warn!("load failed: {err:#}");
            console.view.push(ViewItem::Error(format!("Load failed: {err:#}")));
        },
    }
}
