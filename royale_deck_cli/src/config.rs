//! Optional TOML settings. Command-line flags take precedence over the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::catalog::CardCatalog;
use crate::clipboard::ClipboardMode;
use crate::deck::DeckTables;
use crate::error::{Error, Result};
use crate::filter::SortKey;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Card table to use instead of the bundled one.
    pub cards_file: Option<PathBuf>,
    /// Deck tables to use instead of the bundled ones.
    pub decks_file: Option<PathBuf>,
    pub default_sort: SortKey,
    pub clipboard: ClipboardMode,
    /// End an interactive session after this long without input; 0 disables.
    pub idle_timeout_secs: u64,
    /// Fixed seed for `random`, so runs can be repeated.
    pub seed: Option<u64>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    /// Loads the card and deck tables named here, falling back to the bundled data.
    pub fn load_tables(&self) -> Result<(CardCatalog, DeckTables)> {
        let catalog = match &self.cards_file {
            Some(p) => CardCatalog::load(p)?,
            None => CardCatalog::bundled()?,
        };
        let decks = match &self.decks_file {
            Some(p) => DeckTables::load(p, &catalog)?,
            None => DeckTables::bundled(&catalog)?,
        };
        Ok((catalog, decks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_sort, SortKey::WinRate);
        assert_eq!(config.clipboard, ClipboardMode::Osc52);
        assert_eq!(config.idle_timeout(), None);
    }

    #[test]
    fn loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "default_sort = \"avg-elixir\"\nclipboard = \"stdout\"\nidle_timeout_secs = 90\nseed = 42"
        )
        .unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.default_sort, SortKey::AvgElixir);
        assert_eq!(config.clipboard, ClipboardMode::Stdout);
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<Config>("colour = \"gold\"").is_err());
    }

    #[test]
    fn alternate_tables_are_loaded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cards = dir.path().join("cards.json");
        fs::write(
            &cards,
            r#"{"cards": [{"id": 26000000, "name": "Knight", "rarity": "Common", "elixir": 3}]}"#,
        )
        .unwrap();
        let decks = dir.path().join("decks.json");
        fs::write(
            &decks,
            r#"{"topDecks": [{"id": "solo", "name": "Solo", "cards": [26000000], "winRate": 50.0}]}"#,
        )
        .unwrap();

        let config = Config { cards_file: Some(cards), decks_file: Some(decks), ..Config::default() };
        let (catalog, tables) = config.load_tables().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(tables.top_decks()[0].id, "solo");
        assert!(tables.decks_for_card(26000000).is_empty());
    }
}
