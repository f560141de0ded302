use std::collections::BTreeMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::card::{Card, CardType, Rarity};
use crate::catalog::CardCatalog;
use crate::deck::{average_elixir, one_decimal, round_tenth};
use crate::error::{Error, Result};

pub const DECK_SIZE: usize = 8;

const DEFAULT_NAME: &str = "My Deck";
const RANDOM_NAME: &str = "Random Deck";

/// The deck slate: at most `DECK_SIZE` distinct card ids, in pick order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckBuilder {
    name: String,
    slots: Vec<u32>,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self { name: String::new(), slots: Vec::with_capacity(DECK_SIZE) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { DEFAULT_NAME } else { &self.name }
    }

    pub fn cards(&self) -> &[u32] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.len() == DECK_SIZE
    }

    pub fn contains(&self, card_id: u32) -> bool {
        self.slots.contains(&card_id)
    }

    pub fn add(&mut self, card: &Card) -> Result<()> {
        if self.contains(card.id) {
            return Err(Error::DuplicateCard(card.name.clone()));
        }
        if self.is_complete() {
            return Err(Error::DeckFull(DECK_SIZE));
        }
        self.slots.push(card.id);
        Ok(())
    }

    /// Removes the card in `slot` (0-based) and returns its id.
    pub fn remove(&mut self, slot: usize) -> Result<u32> {
        if slot >= self.slots.len() {
            return Err(Error::EmptySlot(slot + 1));
        }
        Ok(self.slots.remove(slot))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.name.clear();
    }

    /// Replaces the slate with distinct cards drawn uniformly from the catalog.
    pub fn randomize<R: Rng + ?Sized>(&mut self, catalog: &CardCatalog, rng: &mut R) {
        self.slots = catalog
            .cards()
            .choose_multiple(rng, DECK_SIZE)
            .map(|c| c.id)
            .collect();
        self.name = RANDOM_NAME.to_string();
    }

    pub fn analyze(&self, catalog: &CardCatalog) -> DeckAnalysis {
        let mut types = BTreeMap::new();
        let mut rarities = BTreeMap::new();
        for card in self.slots.iter().filter_map(|id| catalog.get(*id)) {
            *types.entry(card.card_type).or_insert(0) += 1;
            *rarities.entry(card.rarity).or_insert(0) += 1;
        }
        DeckAnalysis {
            size: self.slots.len(),
            avg_elixir: average_elixir(catalog, &self.slots),
            types,
            rarities,
        }
    }

    /// The text put on the clipboard.
    pub fn summary(&self, catalog: &CardCatalog) -> String {
        let names: Vec<&str> = self
            .slots
            .iter()
            .filter_map(|id| catalog.get(*id))
            .map(|c| c.name.as_str())
            .collect();
        format!(
            "Deck: {}\nCards: {}\nAvg Elixir: {}",
            self.display_name(),
            names.join(", "),
            self.analyze(catalog).avg_elixir_label()
        )
    }

    pub fn fmt_inline(&self, catalog: &CardCatalog) -> String {
        self.slots
            .iter()
            .filter_map(|id| catalog.get(*id))
            .map(Card::short_name)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeckAnalysis {
    pub size: usize,
    pub avg_elixir: f64,
    pub types: BTreeMap<CardType, usize>,
    pub rarities: BTreeMap<Rarity, usize>,
}

impl DeckAnalysis {
    pub fn avg_elixir_label(&self) -> String {
        one_decimal(self.avg_elixir)
    }

    pub fn count_of(&self, t: CardType) -> usize {
        self.types.get(&t).copied().unwrap_or(0)
    }

    /// Advice for the current slate, judged on the average as displayed.
    pub fn tips(&self) -> Vec<DeckTip> {
        let mut tips = Vec::new();
        if self.size == 0 {
            return tips;
        }
        let avg = round_tenth(self.avg_elixir);
        if avg > 4.5 {
            tips.push(DeckTip::HighElixir);
        }
        if avg < 2.8 {
            tips.push(DeckTip::LowElixir);
        }
        if self.count_of(CardType::Spell) == 0 {
            tips.push(DeckTip::NoSpells);
        }
        let troops = self.count_of(CardType::Troop);
        if troops > 0 && troops < 4 {
            tips.push(DeckTip::FewTroops);
        }
        if self.size == DECK_SIZE {
            tips.push(DeckTip::Complete);
        }
        tips
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeckTip { HighElixir, LowElixir, NoSpells, FewTroops, Complete }

impl fmt::Display for DeckTip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeckTip::HighElixir => "High elixir cost - consider adding cheaper cards",
            DeckTip::LowElixir => "Very low elixir - you might lack defensive options",
            DeckTip::NoSpells => "No spells - add at least one spell for versatility",
            DeckTip::FewTroops => "Few troops - consider adding more offensive units",
            DeckTip::Complete => "Deck complete! Ready for battle!",
        };
        f.write_str(s)
    }
}
