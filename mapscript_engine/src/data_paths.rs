use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Cached path to the directory holding maps, savegames and configuration.
static DATA_ROOT: LazyLock<PathBuf> = LazyLock::new(detect_data_root);

/// Construct a data path relative to the resolved data root.
pub fn data_path(relative: impl AsRef<Path>) -> PathBuf {
    DATA_ROOT.join(relative)
}

/// Resolve the data directory: `MAPSCRIPT_DATA` if set, else the first
/// existing candidate next to the working directory or the executable.
fn detect_data_root() -> PathBuf {
    if let Some(dir) = env::var_os("MAPSCRIPT_DATA") {
        return PathBuf::from(dir);
    }

    let mut candidates = vec![PathBuf::from("mapscript_engine/data"), PathBuf::from("data")];
    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        candidates.push(dir.join("data"));
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("mapscript_engine/data"));
            candidates.push(parent.join("data"));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from("mapscript_engine/data"))
}
