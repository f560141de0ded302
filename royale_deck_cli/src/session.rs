use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::builder::{DeckBuilder, DECK_SIZE};
use crate::card::{parse_choice, CardType, Rarity};
use crate::catalog::CardCatalog;
use crate::clipboard::Clipboard;
use crate::deck::DeckTables;
use crate::error::{Error, Result};
use crate::filter::CardFilter;
use crate::logger::SessionLog;
use crate::prompt::{Input, LineReader};
use crate::render;

const PROMPT: &str = "deck> ";

const HELP: &str = "\
Commands:
  add <card>        add a card by name, name fragment or id
  rm <slot>         remove the card in slot 1-8
  clear             empty the deck and reset its name
  random            fill the deck with 8 random cards
  name <text>       name the deck
  copy              copy the deck summary to the clipboard
  show              show the deck and its analysis
  cards             list cards matching the current filters
  search <text>     filter cards by name (empty clears)
  rarity <r|all>    filter by rarity
  type <t|all>      filter by troop, spell or building
  evo               toggle evolutions-only
  history           list the edits made this session
  help              show this text
  quit              leave the builder";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Remove(usize),
    Clear,
    Random,
    Name(String),
    Copy,
    Show,
    Cards,
    Search(String),
    Rarity(Option<Rarity>),
    Type(Option<CardType>),
    Evo,
    History,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let needs_arg = |what: &'static str| -> Result<String> {
            if rest.is_empty() { Err(Error::parse(what, line)) } else { Ok(rest.to_string()) }
        };

        let cmd = match word.to_lowercase().as_str() {
            "add" | "a" => Command::Add(needs_arg("card")?),
            "rm" | "remove" => {
                let slot = rest
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=DECK_SIZE).contains(n))
                    .ok_or_else(|| Error::parse("slot", rest))?;
                Command::Remove(slot)
            }
            "clear" => Command::Clear,
            "random" => Command::Random,
            "name" => Command::Name(needs_arg("deck name")?),
            "copy" => Command::Copy,
            "show" | "deck" => Command::Show,
            "cards" | "ls" => Command::Cards,
            "search" => Command::Search(rest.to_string()),
            "rarity" => Command::Rarity(parse_choice(rest)?),
            "type" => Command::Type(parse_choice(rest)?),
            "evo" => Command::Evo,
            "history" => Command::History,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(Error::parse("command", line)),
        };
        Ok(cmd)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive deck builder state: the slate, the card grid filters and the edit history.
pub struct Session<'a, C: Clipboard> {
    catalog: &'a CardCatalog,
    tables: &'a DeckTables,
    builder: DeckBuilder,
    filter: CardFilter,
    clipboard: C,
    log: SessionLog,
    rng: StdRng,
}

impl<'a, C: Clipboard> Session<'a, C> {
    pub fn new(catalog: &'a CardCatalog, tables: &'a DeckTables, clipboard: C, rng: StdRng) -> Self {
        Self {
            catalog,
            tables,
            builder: DeckBuilder::new(),
            filter: CardFilter::default(),
            clipboard,
            log: SessionLog::new(),
            rng,
        }
    }

    pub fn with_builder(mut self, builder: DeckBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn builder(&self) -> &DeckBuilder {
        &self.builder
    }

    pub fn filter(&self) -> &CardFilter {
        &self.filter
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn run(&mut self, reader: &LineReader, idle: Option<Duration>, out: &mut impl Write) -> Result<()> {
        writeln!(out, "Deck Builder - type 'help' for commands.")?;
        writeln!(out, "{}", render::slate(&self.builder, self.catalog))?;
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;
            match reader.next(idle) {
                Input::Line(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if self.handle_line(&line, out)? == Flow::Quit {
                        break;
                    }
                }
                Input::TimedOut => {
                    info!("session idle, closing");
                    writeln!(out, "\nNo input for a while, leaving the builder.")?;
                    break;
                }
                Input::Closed => break,
            }
        }
        Ok(())
    }

    /// Parses and runs one line. Bad input is reported to `out`, not returned.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        match line.parse::<Command>() {
            Ok(cmd) => self.execute(cmd, out),
            Err(e) => {
                writeln!(out, "! {e} (try 'help')")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, cmd: Command, out: &mut impl Write) -> Result<Flow> {
        debug!(?cmd, "session command");
        match cmd {
            Command::Add(query) => {
                let added = self
                    .catalog
                    .resolve(&query)
                    .and_then(|card| self.builder.add(card).map(|_| card));
                match added {
                    Ok(card) => {
                        self.log.record("add", &card.name);
                        writeln!(out, "Added {} ({}/{DECK_SIZE})", card, self.builder.len())?;
                        if self.builder.is_complete() {
                            writeln!(out, "Deck complete! Ready for battle!")?;
                        }
                    }
                    Err(e) => writeln!(out, "! {e}")?,
                }
            }
            Command::Remove(slot) => match self.builder.remove(slot - 1) {
                Ok(id) => {
                    let name = self.catalog.get(id).map_or_else(|| id.to_string(), |c| c.name.clone());
                    self.log.record("remove", &format!("{name} from slot {slot}"));
                    writeln!(out, "Removed {name} from slot {slot}")?;
                }
                Err(e) => writeln!(out, "! {e}")?,
            },
            Command::Clear => {
                if self.builder.is_empty() {
                    writeln!(out, "Deck is already empty.")?;
                } else {
                    self.builder.clear();
                    self.log.record("clear", "");
                    writeln!(out, "Deck cleared.")?;
                }
            }
            Command::Random => {
                self.builder.randomize(self.catalog, &mut self.rng);
                self.log.record("random", &self.builder.fmt_inline(self.catalog));
                writeln!(out, "{}", render::slate(&self.builder, self.catalog))?;
            }
            Command::Name(name) => {
                self.builder.set_name(&name);
                self.log.record("name", self.builder.name());
                writeln!(out, "Deck name set to '{}'", self.builder.display_name())?;
            }
            Command::Copy => {
                if self.builder.is_empty() {
                    writeln!(out, "Add some cards before copying.")?;
                } else {
                    let text = self.builder.summary(self.catalog);
                    match self.clipboard.write_text(&text) {
                        Ok(()) => {
                            self.log.record("copy", self.builder.display_name());
                            writeln!(out, "Copied!")?;
                        }
                        Err(e) => writeln!(out, "! {e}")?,
                    }
                }
            }
            Command::Show => {
                writeln!(out, "{}", render::slate(&self.builder, self.catalog))?;
                let analysis = render::analysis(&self.builder.analyze(self.catalog));
                if !analysis.is_empty() {
                    writeln!(out, "{analysis}")?;
                }
            }
            Command::Cards => self.show_cards(out)?,
            Command::Search(text) => {
                self.filter.search = text;
                self.show_cards(out)?;
            }
            Command::Rarity(rarity) => {
                self.filter.rarity = rarity;
                self.show_cards(out)?;
            }
            Command::Type(card_type) => {
                self.filter.card_type = card_type;
                self.show_cards(out)?;
            }
            Command::Evo => {
                self.filter.evolutions_only = !self.filter.evolutions_only;
                self.show_cards(out)?;
            }
            Command::History => self.log.dump(out)?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn show_cards(&self, out: &mut impl Write) -> Result<()> {
        let cards = self.filter.apply(self.catalog.cards());
        writeln!(out, "Filters: {}", self.filter)?;
        writeln!(out, "{}", render::card_grid(&cards, self.builder.cards(), self.tables))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use rand::SeedableRng;
    use std::io::{self, Cursor};
    use std::thread;

    fn fixtures() -> (CardCatalog, DeckTables) {
        let catalog = CardCatalog::bundled().unwrap();
        let tables = DeckTables::bundled(&catalog).unwrap();
        (catalog, tables)
    }

    fn feed<C: Clipboard>(session: &mut Session<'_, C>, lines: &[&str]) -> String {
        let mut out = Vec::new();
        for line in lines {
            session.handle_line(line, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("add hog rider".parse::<Command>().unwrap(), Command::Add("hog rider".into()));
        assert_eq!("  RM 3 ".parse::<Command>().unwrap(), Command::Remove(3));
        assert_eq!("rarity all".parse::<Command>().unwrap(), Command::Rarity(None));
        assert_eq!("type spell".parse::<Command>().unwrap(), Command::Type(Some(CardType::Spell)));
        assert_eq!("search".parse::<Command>().unwrap(), Command::Search(String::new()));
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert!("add".parse::<Command>().is_err());
        assert!("rm 0".parse::<Command>().is_err());
        assert!("rm 9".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[test]
    fn add_copy_and_history() {
        let (catalog, tables) = fixtures();
        let mut s = Session::new(&catalog, &tables, MemoryClipboard::default(), StdRng::seed_from_u64(3));
        let text = feed(&mut s, &["copy", "add knight", "add zap", "add knight", "name Ladder", "copy"]);

        assert!(text.contains("Add some cards before copying."));
        assert!(text.contains("Added Knight (3) EVO (1/8)"));
        assert!(text.contains("! Knight is already in the deck"));
        assert_eq!(
            s.clipboard().contents(),
            Some("Deck: Ladder\nCards: Knight, Zap\nAvg Elixir: 2.5")
        );
        let actions: Vec<&str> = s.log().entries.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["add", "add", "name", "copy"]);
    }

    #[test]
    fn rejected_edits_leave_deck_unchanged() {
        let (catalog, tables) = fixtures();
        let mut s = Session::new(&catalog, &tables, MemoryClipboard::default(), StdRng::seed_from_u64(3));
        let text = feed(&mut s, &["add hog", "add nothing-like-this", "rm 2", "clear", "bogus"]);
        assert!(text.contains("matches several cards"));
        assert!(text.contains("! no card matches 'nothing-like-this'"));
        assert!(text.contains("! slot 2 is empty"));
        assert!(text.contains("Deck is already empty."));
        assert!(text.contains("(try 'help')"));
        assert!(s.builder().is_empty());
        assert!(s.log().is_empty());
    }

    #[test]
    fn random_fills_then_full_deck_rejects_adds() {
        let (catalog, tables) = fixtures();
        let mut s = Session::new(&catalog, &tables, MemoryClipboard::default(), StdRng::seed_from_u64(11));
        feed(&mut s, &["random"]);
        assert!(s.builder().is_complete());
        assert_eq!(s.builder().name(), "Random Deck");

        let outsider = catalog
            .cards()
            .iter()
            .find(|c| !s.builder().contains(c.id))
            .unwrap()
            .id
            .to_string();
        let cmd = format!("add {outsider}");
        let text = feed(&mut s, &[cmd.as_str()]);
        assert!(text.contains("! deck is full (8 cards)"));

        feed(&mut s, &["rm 1", "clear"]);
        assert!(s.builder().is_empty());
        assert_eq!(s.builder().display_name(), "My Deck");
    }

    #[test]
    fn filters_persist_between_commands() {
        let (catalog, tables) = fixtures();
        let mut s = Session::new(&catalog, &tables, MemoryClipboard::default(), StdRng::seed_from_u64(1));
        let text = feed(&mut s, &["type spell", "evo"]);
        assert_eq!(s.filter().card_type, Some(CardType::Spell));
        assert!(s.filter().evolutions_only);
        assert!(text.contains("3 cards shown"));
        feed(&mut s, &["evo", "type all"]);
        assert!(s.filter().is_unrestricted());
    }

    #[test]
    fn run_stops_on_quit_or_closed_input() {
        let (catalog, tables) = fixtures();
        let mut s = Session::new(&catalog, &tables, MemoryClipboard::default(), StdRng::seed_from_u64(1));
        let reader = LineReader::spawn(Cursor::new("add knight\n\nquit\nadd zap\n"));
        let mut out = Vec::new();
        s.run(&reader, None, &mut out).unwrap();
        assert_eq!(s.builder().cards(), &[26000000u32]);

        let reader = LineReader::spawn(Cursor::new("add zap\n"));
        s.run(&reader, Some(Duration::from_secs(5)), &mut out).unwrap();
        assert_eq!(s.builder().len(), 2);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Deck Builder - type 'help' for commands."));
        assert_eq!(text.matches(PROMPT).count(), 5);
    }

    #[test]
    fn run_leaves_after_idle_timeout() {
        struct Silent;
        impl io::Read for Silent {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                thread::sleep(Duration::from_secs(2));
                Ok(0)
            }
        }

        let (catalog, tables) = fixtures();
        let mut s = Session::new(&catalog, &tables, MemoryClipboard::default(), StdRng::seed_from_u64(1));
        let reader = LineReader::spawn(io::BufReader::new(Silent));
        let mut out = Vec::new();
        s.run(&reader, Some(Duration::from_millis(50)), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("deck> \nNo input for a while, leaving the builder.\n"));
        assert!(s.log().is_empty());
    }
}
