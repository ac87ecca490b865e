//! Entity resolution.
//!
//! Maps free-text mentions ("$AAPL", "Apple Inc.", "tech sector") onto
//! canonical entity ids through the configured alias tables. An
//! unresolvable mention is dropped with a warning, never an abort: losing
//! one mention must not lose the document, let alone the run.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::warn;

use common::{Entity, EntityId, EntityKind};

use crate::config::Watchlist;

lazy_static! {
    static ref CASHTAG: Regex = Regex::new(r"\$([A-Z]{1,5})\b").unwrap();
}

/// Corporate suffixes stripped during fallback resolution. Mentions are
/// normalized (trailing punctuation removed) before the comparison.
const SUFFIXES: [&str; 8] = [
    "inc", "corp", "corporation", "ltd", "plc", "company", "motors", "platforms",
];

/// Per-run registry of canonical entities. Entities are created lazily on
/// first resolution and live for the run; the registry is rebuilt from the
/// watchlist at every run start.
pub struct EntityRegistry {
    /// Lowercased alias -> (canonical id, kind).
    aliases: BTreeMap<String, (EntityId, EntityKind)>,
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    pub fn from_watchlist(watchlist: &Watchlist) -> Self {
        let mut aliases = BTreeMap::new();

        let mut insert_symbol = |symbol: &str, kind: EntityKind| {
            let id: EntityId = symbol.to_string();
            aliases.insert(symbol.to_lowercase(), (id.clone(), kind));
            aliases.insert(format!("${}", symbol.to_lowercase()), (id, kind));
        };

        for symbol in &watchlist.stocks {
            insert_symbol(symbol, EntityKind::Stock);
        }
        for symbol in &watchlist.indices {
            insert_symbol(symbol, EntityKind::Index);
        }
        for symbol in &watchlist.crypto {
            insert_symbol(symbol, EntityKind::Crypto);
        }
        for sector in &watchlist.sectors {
            aliases.insert(
                sector.to_lowercase(),
                (sector.clone(), EntityKind::Sector),
            );
        }
        for theme in &watchlist.macro_themes {
            aliases.insert(
                theme.to_lowercase(),
                (theme.clone(), EntityKind::MacroTheme),
            );
        }

        // Free-form aliases resolve to whatever kind their target already
        // has; targets not present in any table default by shape.
        let mut registry = Self {
            aliases,
            entities: BTreeMap::new(),
        };
        for (alias, target) in &watchlist.aliases {
            let kind = registry
                .aliases
                .get(&target.to_lowercase())
                .map(|(_, kind)| *kind)
                .unwrap_or_else(|| infer_kind(target));
            registry
                .aliases
                .insert(alias.to_lowercase(), (target.clone(), kind));
        }
        registry
    }

    /// Resolve one mention to a canonical entity id.
    ///
    /// Order: exact alias match, then suffix-stripped match, then bare
    /// cashtag. Returns `None` for anything else; the caller drops the
    /// mention and counts it.
    pub fn resolve(&mut self, mention: &str) -> Option<EntityId> {
        let normalized = normalize_mention(mention);
        if normalized.is_empty() {
            return None;
        }

        if let Some((id, kind)) = self.aliases.get(&normalized).cloned() {
            return Some(self.record(id, kind, mention));
        }

        if let Some(stripped) = strip_suffix(&normalized) {
            if let Some((id, kind)) = self.aliases.get(&stripped).cloned() {
                return Some(self.record(id, kind, mention));
            }
        }

        // Cashtags of tickers outside the watchlist still identify a
        // concrete instrument; create the entity lazily.
        if let Some(caps) = CASHTAG.captures(mention.trim()) {
            let symbol = caps[1].to_string();
            let kind = self
                .aliases
                .get(&symbol.to_lowercase())
                .map(|(_, kind)| *kind)
                .unwrap_or(EntityKind::Stock);
            self.aliases
                .insert(normalized, (symbol.clone(), kind));
            return Some(self.record(symbol, kind, mention));
        }

        None
    }

    /// Resolve a batch of mentions, deduplicating ids and counting misses.
    pub fn resolve_all(&mut self, mentions: &[String]) -> (Vec<EntityId>, usize) {
        let mut ids = Vec::new();
        let mut misses = 0;
        for mention in mentions {
            match self.resolve(mention) {
                Some(id) => {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                None => {
                    warn!(mention = %mention, "dropping unresolved mention");
                    misses += 1;
                }
            }
        }
        (ids, misses)
    }

    /// Pull candidate mentions out of free text: cashtags plus any known
    /// alias appearing as a whole word (or as a phrase, for multi-word
    /// aliases). Used for records whose source did not pre-extract
    /// mentions.
    pub fn extract_mentions(&self, text: &str) -> Vec<String> {
        let mut mentions: Vec<String> = Vec::new();

        for caps in CASHTAG.captures_iter(text) {
            let tag = caps[0].to_string();
            if !mentions.contains(&tag) {
                mentions.push(tag);
            }
        }

        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        for alias in self.aliases.keys() {
            if alias.len() < 2 || alias.starts_with('$') {
                continue;
            }
            let hit = if alias.contains(' ') {
                lower.contains(alias.as_str())
            } else {
                tokens.iter().any(|t| t == alias)
            };
            if hit && !mentions.contains(alias) {
                mentions.push(alias.clone());
            }
        }

        mentions
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn record(&mut self, id: EntityId, kind: EntityKind, mention: &str) -> EntityId {
        let entity = self
            .entities
            .entry(id.clone())
            .or_insert_with(|| Entity::new(id.clone(), kind));
        entity.aliases.insert(mention.to_string());
        id
    }
}

fn normalize_mention(mention: &str) -> String {
    mention
        .trim()
        .trim_end_matches(['.', ',', ':', ';'])
        .to_lowercase()
}

/// "apple inc" -> "apple"; None when no known suffix is present.
fn strip_suffix(normalized: &str) -> Option<String> {
    let mut parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let last = parts.last().copied()?;
    if SUFFIXES.contains(&last) {
        parts.pop();
        return Some(parts.join(" "));
    }
    None
}

fn infer_kind(target: &str) -> EntityKind {
    let looks_like_symbol =
        target.len() <= 5 && target.chars().all(|c| c.is_ascii_uppercase());
    if looks_like_symbol {
        EntityKind::Stock
    } else {
        EntityKind::MacroTheme
    }
}
