//! Stable 32-bit asset identity: FNV-1a over the normalized logical path.

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Normalize a relative asset path: forward slashes, lowercase, no leading
/// `./`. Hashing anything else is a bug — two spellings of one path must
/// never produce two registry entries.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut s = path.replace('\\', "/").to_ascii_lowercase();
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    s
}

/// FNV-1a over raw bytes.
#[must_use]
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    let mut h = FNV_OFFSET;
    for &b in bytes {
        h ^= u32::from(b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Hash a logical path after normalization.
#[must_use]
pub fn hash_path(path: &str) -> u32 {
    fnv1a32(normalize_path(path).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spelling_variants_collapse() {
        let a = hash_path("World\\Maps\\Azeroth\\chunk_0_0.cter");
        let b = hash_path("./world/maps/azeroth/chunk_0_0.cter");
        assert_eq!(a, b);
    }

    #[test]
    fn known_fnv_vector() {
        // FNV-1a("") is the offset basis; "a" is a published test vector.
        assert_eq!(fnv1a32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a32(b"a"), 0xe40c_292c);
    }

    #[test]
    fn distinct_paths_distinct_hashes() {
        assert_ne!(hash_path("a/b.cmdl"), hash_path("a/c.cmdl"));
    }
}
