#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Mapscript **
//! Console for exploring a map's event chains.

use mapscript_engine::data_paths::data_path;
use mapscript_engine::loader::{load_dictionary, load_map, load_savegame};
use mapscript_engine::style::GameStyle;
use mapscript_engine::{Console, MAPSCRIPT_VERSION, load_config, run_repl};

use anyhow::{Context, Result};
use log::info;

use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();
    info!("Start: loading mapscript data (v{MAPSCRIPT_VERSION})...");

    let config = load_config(&data_path("engine.toml"));
    let map_path = env::args()
        .nth(1)
        .map_or_else(|| data_path("maps/village.ron"), PathBuf::from);
    let map = load_map(&map_path).with_context(|| format!("while loading map '{}'", map_path.display()))?;
    let save_path = data_path("savegame.ron");
    let save = load_savegame(&save_path).context("while loading the starting savegame")?;
    let dictionary = load_dictionary(&data_path("dictionary.ron")).context("while loading the dictionary")?;
    info!("data loaded successfully");

    println!("{}", "MAPSCRIPT EVENT CONSOLE".map_title_style());
    println!("Type 'help' for a list of commands.");

    let mut console = Console::new(map, save, dictionary, config, save_path);
    run_repl(&mut console)
}
