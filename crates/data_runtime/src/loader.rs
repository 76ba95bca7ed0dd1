//! Data loaders resolving files under the workspace `data/` root.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

fn data_root() -> PathBuf {
    // Test override: allow tests to point to a temporary data dir.
    if let Ok(override_root) = std::env::var("DATA_ROOT_FOR_TESTS") {
        let p = PathBuf::from(override_root);
        if p.exists() {
            return p;
        }
    }
    // Prefer top-level workspace `data/` so tests and tools can run from any crate.
    let here = Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() {
        ws
    } else {
        here.join("data")
    }
}

/// Read a raw JSON file under `data/` and return its string.
pub fn read_json(rel: impl AsRef<Path>) -> Result<String> {
    let path = data_root().join(rel);
    let s = fs::read_to_string(&path).with_context(|| format!("read data: {}", path.display()))?;
    Ok(s)
}

/// Load and deserialize a JSON file under `data/`.
pub fn load_json<T: DeserializeOwned>(rel: impl AsRef<Path>) -> Result<T> {
    let rel = rel.as_ref();
    let txt = read_json(rel)?;
    let v: T = serde_json::from_str(&txt).with_context(|| format!("parse {}", rel.display()))?;
    Ok(v)
}

/// Load a config, falling back to `T::default()` when the file is absent.
/// Parse failures on a present file are still errors.
pub fn load_json_or_default<T: DeserializeOwned + Default>(rel: impl AsRef<Path>) -> Result<T> {
    let rel = rel.as_ref();
    match read_json(rel) {
        Ok(txt) => {
            let v: T =
                serde_json::from_str(&txt).with_context(|| format!("parse {}", rel.display()))?;
            Ok(v)
        }
        Err(_) => Ok(T::default()),
    }
}
