//! Canonical subjects of sentiment signals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Canonical identifier for a ticker, crypto symbol, sector, index, or
/// macro theme ("AAPL", "BTC", "Technology", "inflation").
pub type EntityId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Stock,
    Index,
    Sector,
    Crypto,
    MacroTheme,
}

/// One resolved entity plus every alias that has mapped to it this run.
/// Created lazily on first resolution; the registry is reset at run start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub aliases: BTreeSet<String>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
            aliases: BTreeSet::new(),
        }
    }
}
