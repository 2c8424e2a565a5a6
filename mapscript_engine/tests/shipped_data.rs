use std::path::{Path, PathBuf};

use mapscript_engine::command::{Command, parse_command};
use mapscript_engine::loader::{load_dictionary, load_map, load_savegame};
use mapscript_engine::{Awaiting, Console, EngineConfig, StateStore, ViewItem, load_config};

fn data(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(relative)
}

fn console() -> Console {
    let map = load_map(&data("maps/village.ron")).expect("village map");
    let save = load_savegame(&data("savegame.ron")).expect("savegame");
    let dictionary = load_dictionary(&data("dictionary.ron")).expect("dictionary");
    Console::new(map, save, dictionary, EngineConfig::default(), PathBuf::from("unused.ron"))
}

fn run(console: &mut Console, line: &str) {
    let command = parse_command(line);
    assert_ne!(command, Command::Unknown, "'{line}' should parse");
    console.execute(command).expect("command");
}

#[test]
fn shipped_files_load() {
    let console = console();
    assert_eq!(console.map.name, "Ashford");
    assert_eq!(console.map.event_count(), 11);
    assert_eq!(console.map.event_tiles().len(), 10);
    assert_eq!(console.save.party.len(), 3);
    assert_eq!(console.dictionary.find("ASHFORD"), Some(1));
    assert_eq!(load_config(&data("engine.toml")), EngineConfig::default());
}

#[test]
fn the_well_pays_out_once() {
    let mut console = console();
    run(&mut console, "step 7 2");
    assert!(matches!(
        console.pending().map(|s| &s.awaiting),
        Some(Awaiting::Popup { text_index: 3, .. })
    ));
    run(&mut console, "close");
    assert!(console.pending().is_none());
    assert!(console.save.global_variable(1));
    let gold: Vec<u32> = console.save.party.iter().map(|m| m.gold).collect();
    assert_eq!(gold, vec![37, 24, 16]);

    run(&mut console, "reset");
    run(&mut console, "step 7 2");
    assert!(matches!(
        console.pending().map(|s| &s.awaiting),
        Some(Awaiting::Popup { text_index: 4, .. })
    ));
}

#[test]
fn the_keypad_unlocks_the_house() {
    let mut console = console();
    assert!(console.save.is_door_locked(1));
    run(&mut console, "touch 6 10");
    assert!(matches!(console.pending().map(|s| &s.awaiting), Some(Awaiting::EnterNumber)));
    run(&mut console, "enter 1234");
    assert!(!console.save.is_door_locked(1));
    run(&mut console, "close");
    assert!(console.pending().is_none());

    console.view.items.clear();
    run(&mut console, "step 5 5");
    assert!(console.view.items.iter().any(ViewItem::is_teleported));
}

#[test]
fn the_riddle_crumbles_once_solved() {
    let mut console = console();
    run(&mut console, "look 10 4");
    run(&mut console, "say river");
    assert!(matches!(console.pending().map(|s| &s.awaiting), Some(Awaiting::Riddle { .. })));
    run(&mut console, "say mountain");
    assert!(console.pending().is_none());
    assert!(console.save.knows_word(1));
    assert_eq!(console.save.tile_changes.len(), 1);
    assert_eq!(console.save.tile_changes[0].target.x, 11);

    console.view.items.clear();
    run(&mut console, "look 10 4");
    assert!(
        console
            .view
            .items
            .contains(&ViewItem::Outcome("Nothing happens.".into()))
    );
}
