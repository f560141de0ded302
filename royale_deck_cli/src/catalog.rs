//! The static card table.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::card::Card;
use crate::error::{Error, Result};

const BUNDLED_CARDS: &str = include_str!("../data/cards.json");

#[derive(Deserialize)]
struct CardFile {
    cards: Vec<Card>,
}

#[derive(Clone, Debug)]
pub struct CardCatalog {
    cards: Vec<Card>,
}

impl CardCatalog {
    /// The card table shipped with the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CARDS)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading card catalog");
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: CardFile = serde_json::from_str(text)?;
        Self::new(file.cards)
    }

    pub fn new(cards: Vec<Card>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(cards.len());
        for c in &cards {
            if !seen.insert(c.id) {
                return Err(Error::DuplicateId(c.id));
            }
        }
        debug!(cards = cards.len(), "card catalog ready");
        Ok(Self { cards })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Finds a card by id, by name, or by a name fragment that picks out exactly one card.
    ///
    /// Names are compared case-insensitively with punctuation and spaces ignored, so
    /// `pekka` finds `P.E.K.K.A` and `xbow` finds `X-Bow`.
    pub fn resolve(&self, query: &str) -> Result<&Card> {
        let query = query.trim();
        if let Ok(id) = query.parse::<u32>() {
            return self.get(id).ok_or_else(|| Error::UnknownCard(query.to_string()));
        }

        let needle = normalize(query);
        if needle.is_empty() {
            return Err(Error::UnknownCard(query.to_string()));
        }
        if let Some(c) = self.cards.iter().find(|c| normalize(&c.name) == needle) {
            return Ok(c);
        }

        let hits: Vec<&Card> = self
            .cards
            .iter()
            .filter(|c| normalize(&c.name).contains(&needle))
            .collect();
        match hits.as_slice() {
            [] => Err(Error::UnknownCard(query.to_string())),
            [one] => Ok(*one),
            many => Err(Error::AmbiguousCard {
                query: query.to_string(),
                candidates: many.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", "),
            }),
        }
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
