//! Display-id database: maps a display identifier (plus race/gender/variant)
//! to a model path. This backs appearance changes: the server replicates a
//! display id, the client resolves it here and issues a model load.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayVariant {
    pub race: u8,
    pub gender: u8,
    pub variant: u8,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayRecord {
    pub id: u32,
    /// Fallback model when no variant row matches.
    pub model: String,
    #[serde(default)]
    pub variants: Vec<DisplayVariant>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayTable {
    pub records: Vec<DisplayRecord>,
    #[serde(skip)]
    by_id: HashMap<u32, usize>,
}

impl DisplayTable {
    pub fn load_default() -> Result<Self> {
        let mut t: Self = crate::loader::load_json_or_default("dbc/display_info.json")?;
        t.reindex();
        Ok(t)
    }

    #[must_use]
    pub fn from_records(records: Vec<DisplayRecord>) -> Self {
        let mut t = Self {
            records,
            by_id: HashMap::new(),
        };
        t.reindex();
        t
    }

    fn reindex(&mut self) {
        self.by_id = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();
    }

    /// Resolve a display id to a model path. Variant rows match exactly;
    /// otherwise the record's base model is returned. `None` means the
    /// display id does not exist at all (content-absent, not an error).
    #[must_use]
    pub fn resolve(&self, display_id: u32, race: u8, gender: u8, variant: u8) -> Option<&str> {
        let rec = &self.records[*self.by_id.get(&display_id)?];
        for v in &rec.variants {
            if v.race == race && v.gender == gender && v.variant == variant {
                return Some(&v.model);
            }
        }
        Some(&rec.model)
    }
}
