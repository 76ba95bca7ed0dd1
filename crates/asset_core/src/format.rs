//! On-disk asset format.
//!
//! Layout (little-endian):
//! - u32 magic `b"CAST"`
//! - u32 version (1)
//! - u8  kind (0 = model, 1 = terrain chunk)
//! - u8  flags (reserved)
//! - u16 reserved
//! - u32 vertex count
//! - u32 index count
//! - u32 physics-collision blob length
//! - vertices (12 bytes each), indices (4 bytes each), physics blob
//!
//! The physics blob is the physics engine's own serialized shape stream;
//! this module only does byte-length bookkeeping on it.

use anyhow::{bail, Result};

pub const MAGIC: u32 = u32::from_le_bytes(*b"CAST");
pub const VERSION: u32 = 1;
pub const HEADER_LEN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Model,
    TerrainChunk,
}

/// Parsed payload of a discovered asset. Geometry is renderer-opaque here;
/// only the counts and the physics blob matter to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAsset {
    pub kind: AssetKind,
    pub vertex_count: u32,
    pub index_count: u32,
    pub physics_blob: Option<Vec<u8>>,
}

impl ParsedAsset {
    #[must_use]
    pub fn has_physics_shape(&self) -> bool {
        self.physics_blob.is_some()
    }
}

/// Parse asset bytes. Corrupt content (short header, bad magic/version,
/// truncated sections, zero-vertex model) is an ordinary error the caller
/// records as `LoadState::Failed` — never a panic.
pub fn parse(bytes: &[u8]) -> Result<ParsedAsset> {
    if bytes.len() < HEADER_LEN {
        bail!("corrupt asset: {} bytes, header needs {HEADER_LEN}", bytes.len());
    }
    let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    if magic != MAGIC {
        bail!("corrupt asset: bad magic {magic:#010x}");
    }
    let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    if version != VERSION {
        bail!("corrupt asset: unsupported version {version}");
    }
    let kind = match bytes[8] {
        0 => AssetKind::Model,
        1 => AssetKind::TerrainChunk,
        k => bail!("corrupt asset: unknown kind {k}"),
    };
    let vertex_count = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
    let index_count = u32::from_le_bytes(bytes[16..20].try_into().unwrap());
    let physics_len = u32::from_le_bytes(bytes[20..24].try_into().unwrap()) as usize;
    if kind == AssetKind::Model && vertex_count == 0 {
        bail!("corrupt asset: zero-vertex model");
    }
    let vert_bytes = vertex_count as usize * 12;
    let idx_bytes = index_count as usize * 4;
    let need = HEADER_LEN + vert_bytes + idx_bytes + physics_len;
    if bytes.len() < need {
        bail!("corrupt asset: sections need {need} bytes, have {}", bytes.len());
    }
    let physics_blob = if physics_len > 0 {
        let start = HEADER_LEN + vert_bytes + idx_bytes;
        Some(bytes[start..start + physics_len].to_vec())
    } else {
        None
    };
    Ok(ParsedAsset {
        kind,
        vertex_count,
        index_count,
        physics_blob,
    })
}

/// Build a well-formed asset byte image. Used by tooling and tests.
#[must_use]
pub fn build(kind: AssetKind, vertex_count: u32, index_count: u32, physics: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        HEADER_LEN + vertex_count as usize * 12 + index_count as usize * 4 + physics.len(),
    );
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.push(match kind {
        AssetKind::Model => 0,
        AssetKind::TerrainChunk => 1,
    });
    out.push(0);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&vertex_count.to_le_bytes());
    out.extend_from_slice(&index_count.to_le_bytes());
    out.extend_from_slice(&u32::try_from(physics.len()).unwrap_or(0).to_le_bytes());
    out.resize(out.len() + vertex_count as usize * 12 + index_count as usize * 4, 0);
    out.extend_from_slice(physics);
    out
}
