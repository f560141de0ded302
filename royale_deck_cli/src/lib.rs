//! Clash Royale card browser and deck builder.
//!
//! The card catalog and the meta deck tables are static JSON bundled with the crate.
//! Everything else is in-memory state: card grid filters, deck list queries and the
//! eight-slot deck slate.

#![forbid(unsafe_code)]

pub mod builder;
pub mod card;
pub mod catalog;
pub mod clipboard;
pub mod config;
pub mod deck;
pub mod error;
pub mod filter;
pub mod logger;
pub mod prompt;
pub mod render;
pub mod session;

pub use builder::{DeckAnalysis, DeckBuilder, DeckTip, DECK_SIZE};
pub use card::{Card, CardType, Rarity};
pub use catalog::CardCatalog;
pub use config::Config;
pub use deck::{Archetype, DeckTables, MetaDeck};
pub use error::{Error, Result};
pub use filter::{CardFilter, DeckQuery, DeckSummary, SortKey};
