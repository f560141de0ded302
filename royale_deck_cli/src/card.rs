use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rarity { Common, Rare, Epic, Legendary, Champion }

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary, Rarity::Champion,
    ];

    pub fn max_level(self) -> u8 {
        match self {
            Rarity::Common => 16,
            Rarity::Rare => 14,
            Rarity::Epic => 11,
            Rarity::Legendary => 8,
            Rarity::Champion => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "Common", Rarity::Rare => "Rare", Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary", Rarity::Champion => "Champion",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::parse("rarity", s))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum CardType { Troop, Spell, Building }

impl CardType {
    pub const ALL: [CardType; 3] = [CardType::Troop, CardType::Spell, CardType::Building];

    /// Card ids are grouped in families of one million: 26 troops, 27 buildings, 28 spells.
    pub fn from_id(id: u32) -> Option<Self> {
        match id / 1_000_000 {
            26 => Some(CardType::Troop),
            27 => Some(CardType::Building),
            28 => Some(CardType::Spell),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CardType::Troop => "Troop", CardType::Spell => "Spell", CardType::Building => "Building",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            CardType::Troop => "⚔️", CardType::Spell => "✨", CardType::Building => "🏰",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::parse("card type", s))
    }
}

/// Parses a filter choice where `all` (or an empty string) means no restriction.
pub fn parse_choice<T: FromStr<Err = Error>>(s: &str) -> Result<Option<T>, Error> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

/// Shape of a card entry in the JSON tables. `type` may be omitted when the id family implies it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardRecord {
    id: u32,
    name: String,
    rarity: Rarity,
    elixir: u8,
    #[serde(rename = "type", default)]
    card_type: Option<CardType>,
    #[serde(default)]
    evolution_level: Option<u8>,
}

impl TryFrom<CardRecord> for Card {
    type Error = Error;

    fn try_from(r: CardRecord) -> Result<Self, Self::Error> {
        let card_type = match r.card_type {
            Some(t) => t,
            None => CardType::from_id(r.id).ok_or(Error::UnknownCategory(r.id))?,
        };
        Ok(Card {
            id: r.id,
            name: r.name,
            rarity: r.rarity,
            elixir: r.elixir,
            card_type,
            evolution_level: r.evolution_level,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CardRecord", rename_all = "camelCase")]
pub struct Card {
    pub id: u32,
    pub name: String,
    pub rarity: Rarity,
    pub elixir: u8,
    #[serde(rename = "type")]
    pub card_type: CardType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evolution_level: Option<u8>,
}

impl Card {
    pub fn has_evolution(&self) -> bool {
        self.evolution_level.is_some()
    }

    pub fn max_level(&self) -> u8 {
        self.rarity.max_level()
    }

    /// Name trimmed to fit a deck slot: longer than 8 chars becomes 7 chars plus `..`.
    pub fn short_name(&self) -> String {
        if self.name.chars().count() > 8 {
            let head: String = self.name.chars().take(7).collect();
            format!("{head}..")
        } else {
            self.name.clone()
        }
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty() || self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.elixir)?;
        if self.has_evolution() {
            f.write_str(" EVO")?;
        }
        Ok(())
    }
}
