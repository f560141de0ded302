//! Meta decks and the deck-by-card index.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::builder::DECK_SIZE;
use crate::catalog::CardCatalog;
use crate::error::{Error, Result};

const BUNDLED_DECKS: &str = include_str!("../data/decks.json");

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Archetype {
    Cycle,
    Bait,
    Beatdown,
    #[serde(rename = "Bridge Spam")]
    BridgeSpam,
    Siege,
    Control,
}

impl Archetype {
    pub const ALL: [Archetype; 6] = [
        Archetype::Cycle, Archetype::Bait, Archetype::Beatdown,
        Archetype::BridgeSpam, Archetype::Siege, Archetype::Control,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Cycle => "Cycle",
            Archetype::Bait => "Bait",
            Archetype::Beatdown => "Beatdown",
            Archetype::BridgeSpam => "Bridge Spam",
            Archetype::Siege => "Siege",
            Archetype::Control => "Control",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s.chars().filter(|c| c.is_alphanumeric()).collect();
        Archetype::ALL
            .into_iter()
            .find(|a| a.as_str().replace(' ', "").eq_ignore_ascii_case(&key))
            .ok_or_else(|| Error::parse("archetype", s))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WinRateTier { High, Medium, Low }

impl WinRateTier {
    pub fn from_win_rate(win_rate: f64) -> Self {
        if win_rate >= 52.0 {
            WinRateTier::High
        } else if win_rate >= 48.0 {
            WinRateTier::Medium
        } else {
            WinRateTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self { WinRateTier::High => "high", WinRateTier::Medium => "medium", WinRateTier::Low => "low" }
    }
}

/// Mean elixir over `ids`. Ids missing from the catalog count as 0 but still take a slot.
pub fn average_elixir(catalog: &CardCatalog, ids: &[u32]) -> f64 {
    if ids.is_empty() {
        return 0.0;
    }
    let total: u32 = ids
        .iter()
        .map(|id| catalog.get(*id).map_or(0, |c| u32::from(c.elixir)))
        .sum();
    f64::from(total) / ids.len() as f64
}

/// Rounds to one decimal with ties going up, so 2.25 becomes 2.3.
pub fn round_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// `x` rounded by [`round_tenth`] and printed with one decimal.
pub fn one_decimal(x: f64) -> String {
    format!("{:.1}", round_tenth(x))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeckRecord {
    id: String,
    name: String,
    #[serde(default)]
    archetype: Option<Archetype>,
    cards: Vec<u32>,
    #[serde(default)]
    win_rate: Option<f64>,
    #[serde(default)]
    usage: Option<f64>,
    #[serde(default)]
    wins: Option<u64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeckFile {
    top_decks: Vec<DeckRecord>,
    #[serde(default)]
    decks_by_card: BTreeMap<u32, Vec<DeckRecord>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaDeck {
    pub id: String,
    pub name: String,
    pub archetype: Option<Archetype>,
    pub cards: Vec<u32>,
    pub win_rate: Option<f64>,
    pub usage: Option<f64>,
    pub wins: Option<u64>,
    pub avg_elixir: f64,
    pub description: Option<String>,
}

impl MetaDeck {
    fn from_record(r: DeckRecord, catalog: &CardCatalog) -> Result<Self> {
        if r.cards.len() > DECK_SIZE {
            return Err(Error::InvalidDeck {
                id: r.id,
                reason: format!("{} cards, at most {DECK_SIZE} allowed", r.cards.len()),
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = r.cards.iter().find(|id| !seen.insert(**id)) {
            return Err(Error::InvalidDeck {
                reason: format!("card {dup} listed twice"),
                id: r.id,
            });
        }
        for id in r.cards.iter().filter(|id| catalog.get(**id).is_none()) {
            warn!(deck = %r.id, card = id, "deck references a card missing from the catalog");
        }

        let avg_elixir = average_elixir(catalog, &r.cards);
        Ok(MetaDeck {
            id: r.id,
            name: r.name,
            archetype: r.archetype,
            cards: r.cards,
            win_rate: r.win_rate,
            usage: r.usage,
            wins: r.wins,
            avg_elixir,
            description: r.description,
        })
    }

    pub fn contains(&self, card_id: u32) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn win_rate_tier(&self) -> Option<WinRateTier> {
        self.win_rate.map(WinRateTier::from_win_rate)
    }
}

/// The top-deck list plus the index of featured decks keyed by card id.
#[derive(Clone, Debug, Default)]
pub struct DeckTables {
    top: Vec<MetaDeck>,
    by_card: BTreeMap<u32, Vec<MetaDeck>>,
}

impl DeckTables {
    pub fn bundled(catalog: &CardCatalog) -> Result<Self> {
        Self::from_json(BUNDLED_DECKS, catalog)
    }

    pub fn load(path: &Path, catalog: &CardCatalog) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading deck tables");
        Self::from_json(&text, catalog)
    }

    pub fn from_json(text: &str, catalog: &CardCatalog) -> Result<Self> {
        let file: DeckFile = serde_json::from_str(text)?;

        let top = file
            .top_decks
            .into_iter()
            .map(|r| MetaDeck::from_record(r, catalog))
            .collect::<Result<Vec<_>>>()?;

        let mut by_card = BTreeMap::new();
        for (card_id, records) in file.decks_by_card {
            let decks = records
                .into_iter()
                .map(|r| MetaDeck::from_record(r, catalog))
                .collect::<Result<Vec<_>>>()?;
            for d in decks.iter().filter(|d| !d.contains(card_id)) {
                warn!(deck = %d.id, card = card_id, "featured deck does not contain its card");
            }
            by_card.insert(card_id, decks);
        }

        debug!(top = top.len(), featured = by_card.len(), "deck tables ready");
        Ok(Self { top, by_card })
    }

    pub fn top_decks(&self) -> &[MetaDeck] {
        &self.top
    }

    /// Featured decks for a card; empty when the card has none.
    pub fn decks_for_card(&self, card_id: u32) -> &[MetaDeck] {
        self.by_card.get(&card_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn featured_card_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_card.keys().copied()
    }

    pub fn is_featured(&self, card_id: u32) -> bool {
        self.by_card.contains_key(&card_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> (CardCatalog, DeckTables) {
        let catalog = CardCatalog::bundled().unwrap();
        let tables = DeckTables::bundled(&catalog).unwrap();
        (catalog, tables)
    }

    #[test]
    fn average_is_derived_from_catalog() {
        let (_, tables) = tables();
        let hog = tables.top_decks().iter().find(|d| d.id == "hog-2.6").unwrap();
        assert!((hog.avg_elixir - 2.625).abs() < 1e-9);
        assert_eq!(hog.archetype, Some(Archetype::Cycle));
    }

    #[test]
    fn unknown_ids_count_as_zero() {
        let (catalog, _) = tables();
        // Knight (3) + a missing card
        assert!((average_elixir(&catalog, &[26000000, 1]) - 1.5).abs() < 1e-9);
        assert_eq!(average_elixir(&catalog, &[]), 0.0);
    }

    #[test]
    fn tenths_round_ties_up() {
        assert_eq!(one_decimal(2.25), "2.3");
        assert_eq!(one_decimal(3.25), "3.3");
        assert_eq!(one_decimal(2.625), "2.6");
        assert_eq!(one_decimal(0.0), "0.0");
        assert!((round_tenth(4.25) - 4.3).abs() < 1e-9);
    }

    #[test]
    fn index_lookups() {
        let (_, tables) = tables();
        assert_eq!(tables.decks_for_card(26000021).len(), 2);
        assert!(tables.decks_for_card(26000000).is_empty());
        assert!(tables.is_featured(28000004));
        assert!(!tables.is_featured(1));
        assert_eq!(tables.featured_card_ids().count(), 5);
    }

    #[test]
    fn win_rate_tiers() {
        assert_eq!(WinRateTier::from_win_rate(54.2), WinRateTier::High);
        assert_eq!(WinRateTier::from_win_rate(52.0), WinRateTier::High);
        assert_eq!(WinRateTier::from_win_rate(48.0), WinRateTier::Medium);
        assert_eq!(WinRateTier::from_win_rate(47.9), WinRateTier::Low);
    }

    #[test]
    fn parses_archetypes() {
        assert_eq!("bridge spam".parse::<Archetype>().unwrap(), Archetype::BridgeSpam);
        assert_eq!("Bridge-Spam".parse::<Archetype>().unwrap(), Archetype::BridgeSpam);
        assert_eq!("siege".parse::<Archetype>().unwrap(), Archetype::Siege);
        assert!("midrange".parse::<Archetype>().is_err());
    }

    #[test]
    fn rejects_oversized_and_duplicate_decks() {
        let (catalog, _) = tables();
        let oversized = r#"{"topDecks": [{"id": "big", "name": "Big", "cards": [1,2,3,4,5,6,7,8,9]}]}"#;
        assert!(matches!(
            DeckTables::from_json(oversized, &catalog),
            Err(Error::InvalidDeck { .. })
        ));
        let doubled = r#"{"topDecks": [{"id": "dup", "name": "Dup", "cards": [26000000, 26000000]}]}"#;
        assert!(matches!(
            DeckTables::from_json(doubled, &catalog),
            Err(Error::InvalidDeck { .. })
        ));
    }

    #[test]
    fn optional_stats_may_be_missing() {
        let (catalog, _) = tables();
        let json = r#"{"topDecks": [{"id": "bare", "name": "Bare", "cards": [26000000]}]}"#;
        let tables = DeckTables::from_json(json, &catalog).unwrap();
        let deck = &tables.top_decks()[0];
        assert_eq!(deck.win_rate, None);
        assert_eq!(deck.win_rate_tier(), None);
        assert_eq!(deck.avg_elixir, 3.0);
    }
}
