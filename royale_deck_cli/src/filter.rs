//! Card grid filters and the deck list query.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::card::{Card, CardType, Rarity};
use crate::deck::{one_decimal, Archetype, MetaDeck};

/// Search text plus pill selections. `None` stands for "All".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub search: String,
    pub rarity: Option<Rarity>,
    pub card_type: Option<CardType>,
    pub evolutions_only: bool,
}

impl CardFilter {
    pub fn matches(&self, card: &Card) -> bool {
        card.matches_search(&self.search)
            && self.rarity.map_or(true, |r| card.rarity == r)
            && self.card_type.map_or(true, |t| card.card_type == t)
            && (!self.evolutions_only || card.has_evolution())
    }

    pub fn apply<'a>(&self, cards: &'a [Card]) -> Vec<&'a Card> {
        cards.iter().filter(|c| self.matches(c)).collect()
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == CardFilter::default()
    }
}

impl fmt::Display for CardFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rarity = self.rarity.map_or("All", Rarity::as_str);
        let card_type = self.card_type.map_or("All", CardType::as_str);
        write!(f, "search='{}' rarity={} type={}", self.search, rarity, card_type)?;
        if self.evolutions_only {
            f.write_str(" evolutions only")?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    WinRate,
    Usage,
    Wins,
    AvgElixir,
}

impl SortKey {
    /// Cheaper decks first; every other stat puts the biggest number first.
    pub fn ascending(self) -> bool {
        matches!(self, SortKey::AvgElixir)
    }

    fn value(self, deck: &MetaDeck) -> f64 {
        match self {
            SortKey::WinRate => deck.win_rate.unwrap_or(0.0),
            SortKey::Usage => deck.usage.unwrap_or(0.0),
            SortKey::Wins => deck.wins.unwrap_or(0) as f64,
            SortKey::AvgElixir => deck.avg_elixir,
        }
    }

    pub fn compare(self, a: &MetaDeck, b: &MetaDeck) -> Ordering {
        let ord = self.value(a).total_cmp(&self.value(b));
        if self.ascending() { ord } else { ord.reverse() }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::WinRate => "Win Rate",
            SortKey::Usage => "Usage Rate",
            SortKey::Wins => "Total Wins",
            SortKey::AvgElixir => "Elixir Cost",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DeckQuery {
    pub archetype: Option<Archetype>,
    pub sort: SortKey,
}

impl DeckQuery {
    pub fn run<'a>(&self, decks: &'a [MetaDeck]) -> Vec<&'a MetaDeck> {
        let mut hits: Vec<&MetaDeck> = decks
            .iter()
            .filter(|d| self.archetype.map_or(true, |a| d.archetype == Some(a)))
            .collect();
        hits.sort_by(|a, b| self.sort.compare(a, b));
        hits
    }
}

/// Headline numbers shown above a deck list.
#[derive(Clone, Debug, PartialEq)]
pub struct DeckSummary {
    pub count: usize,
    pub best_win_rate: Option<f64>,
    pub mean_avg_elixir: Option<f64>,
    pub total_wins: Option<u64>,
}

impl DeckSummary {
    pub fn of(decks: &[&MetaDeck]) -> Self {
        if decks.is_empty() {
            return DeckSummary { count: 0, best_win_rate: None, mean_avg_elixir: None, total_wins: None };
        }
        let best_win_rate = decks.iter().filter_map(|d| d.win_rate).reduce(f64::max);
        let mean = decks.iter().map(|d| d.avg_elixir).sum::<f64>() / decks.len() as f64;
        let wins: u64 = decks.iter().filter_map(|d| d.wins).sum();
        DeckSummary {
            count: decks.len(),
            best_win_rate,
            mean_avg_elixir: Some(mean),
            total_wins: Some(wins),
        }
    }

    pub fn best_win_rate_label(&self) -> String {
        self.best_win_rate.map_or_else(|| "-".to_string(), |w| format!("{}%", one_decimal(w)))
    }

    pub fn avg_elixir_label(&self) -> String {
        self.mean_avg_elixir.map_or_else(|| "-".to_string(), one_decimal)
    }

    pub fn total_wins_label(&self) -> String {
        self.total_wins
            .map_or_else(|| "-".to_string(), |w| format!("{}M", one_decimal(w as f64 / 1_000_000.0)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArchetypeHighlight {
    pub archetype: Archetype,
    pub decks: usize,
    pub best_win_rate: Option<f64>,
}

/// One entry per archetype present in `decks`, in archetype order.
pub fn archetype_highlights(decks: &[MetaDeck]) -> Vec<ArchetypeHighlight> {
    let mut by_archetype: BTreeMap<Archetype, ArchetypeHighlight> = BTreeMap::new();
    for d in decks {
        let Some(archetype) = d.archetype else { continue };
        let entry = by_archetype.entry(archetype).or_insert(ArchetypeHighlight {
            archetype,
            decks: 0,
            best_win_rate: None,
        });
        entry.decks += 1;
        if let Some(w) = d.win_rate {
            entry.best_win_rate = Some(entry.best_win_rate.map_or(w, |b| b.max(w)));
        }
    }
    by_archetype.into_values().collect()
}
