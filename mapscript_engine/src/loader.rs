//! Loading map event tables, savegames and the dictionary from RON files.

pub mod mapdef;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use mapscript_data::{DictionaryDef, MapEventsDef};

use crate::dictionary::Dictionary;
use crate::loader::mapdef::build_map_from_def;
use crate::map::EventMap;
use crate::state::Savegame;

/// Load, validate and build a map's event table.
///
/// # Errors
/// Errors bubble up from file IO, RON parsing, validation and node conversion.
pub fn load_map(path: &Path) -> Result<EventMap> {
    let def = load_map_def(path)?;
    validate_map_def(&def).with_context(|| format!("validating map events in '{}'", path.display()))?;
    let map = build_map_from_def(&def).with_context(|| format!("building map {} from definition", def.map_index))?;
    info!(
        "map {} \"{}\" loaded: {} nodes, {} events, {} event tiles",
        map.index,
        map.name,
        map.nodes().len(),
        map.event_count(),
        map.event_tiles().len()
    );
    Ok(map)
}

/// Read a `MapEventsDef` from a RON file.
pub fn load_map_def(path: &Path) -> Result<MapEventsDef> {
    let text = fs::read_to_string(path).with_context(|| format!("reading map events from '{}'", path.display()))?;
    ron::from_str(&text).with_context(|| format!("parsing map events RON from '{}'", path.display()))
}

/// Validate a map definition and return a single aggregated error.
fn validate_map_def(def: &MapEventsDef) -> Result<()> {
    let errors = mapscript_data::validate_map(def);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("map {} validation failed:\n{details}", def.map_index);
}

pub fn load_savegame(path: &Path) -> Result<Savegame> {
    let text = fs::read_to_string(path).with_context(|| format!("reading savegame from '{}'", path.display()))?;
    let save: Savegame =
        ron::from_str(&text).with_context(|| format!("parsing savegame RON from '{}'", path.display()))?;
    info!("savegame loaded from '{}' ({} party members)", path.display(), save.party.len());
    Ok(save)
}

/// Write a savegame as RON, creating parent directories as needed.
pub fn write_savegame(path: &Path, save: &Savegame) -> Result<()> {
    let text = ron::ser::to_string(save).context("error converting savegame to 'ron' format")?;
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("creating save folder '{}'", dir.display()))?;
    }
    fs::write(path, text).with_context(|| format!("writing savegame to '{}'", path.display()))?;
    info!("savegame written to '{}'", path.display());
    Ok(())
}

pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let text = fs::read_to_string(path).with_context(|| format!("reading dictionary from '{}'", path.display()))?;
    let def: DictionaryDef =
        ron::from_str(&text).with_context(|| format!("parsing dictionary RON from '{}'", path.display()))?;
    info!("{} dictionary words loaded", def.words.len());
    Ok(Dictionary::from(def))
}
