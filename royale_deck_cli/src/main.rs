//! royale-deck
//!
//! Browse Clash Royale cards and meta decks from the terminal, and build your own deck.

#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use royale_deck_cli::clipboard::ClipboardMode;
use royale_deck_cli::prompt::LineReader;
use royale_deck_cli::render;
use royale_deck_cli::session::Session;
use royale_deck_cli::{
    Archetype, CardCatalog, CardFilter, CardType, Config, DeckBuilder, DeckQuery, DeckTables, Rarity,
    SortKey,
};

#[derive(Parser, Debug)]
#[command(name = "royale-deck", version)]
#[command(about = "Browse Clash Royale cards and meta decks, and build your own deck", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long, env = "ROYALE_DECK_CONFIG")]
    config: Option<PathBuf>,

    /// Card table to use instead of the bundled one
    #[arg(long)]
    cards_file: Option<PathBuf>,

    /// Deck tables to use instead of the bundled ones
    #[arg(long)]
    decks_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Catalog size and archetype highlights
    Overview,
    /// List cards, optionally filtered
    Cards {
        /// Name fragment
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(short, long)]
        rarity: Option<Rarity>,
        #[arg(short = 't', long = "type")]
        card_type: Option<CardType>,
        /// Only cards with an evolution
        #[arg(long)]
        evo: bool,
        #[arg(long)]
        json: bool,
    },
    /// List meta decks
    Decks {
        #[arg(short, long)]
        archetype: Option<Archetype>,
        #[arg(short, long, value_enum)]
        sort: Option<SortKey>,
        #[arg(long)]
        json: bool,
    },
    /// Show one card and the best decks featuring it
    Card {
        /// Card id, name or name fragment
        query: String,
    },
    /// Build a deck, interactively unless --cards or --random is given
    Build(BuildArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[arg(short, long)]
    name: Option<String>,

    /// Comma-separated cards to put in the deck
    #[arg(long, value_delimiter = ',', conflicts_with = "random")]
    cards: Vec<String>,

    /// Start from 8 random cards
    #[arg(long)]
    random: bool,

    /// Copy the summary to the clipboard (one-shot mode)
    #[arg(long)]
    copy: bool,

    #[arg(long, value_enum)]
    clipboard: Option<ClipboardMode>,

    /// Seed for random decks
    #[arg(long)]
    seed: Option<u64>,

    /// Leave the interactive builder after this many idle seconds (0 = never)
    #[arg(long)]
    idle_timeout: Option<u64>,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if cli.cards_file.is_some() {
        config.cards_file = cli.cards_file;
    }
    if cli.decks_file.is_some() {
        config.decks_file = cli.decks_file;
    }
    debug!(?config, "effective config");

    let (catalog, tables) = config.load_tables().context("failed to load card data")?;
    let mut out = io::stdout();

    match cli.command {
        Command::Overview => writeln!(out, "{}", render::overview(&catalog, &tables))?,
        Command::Cards { search, rarity, card_type, evo, json } => {
            let filter = CardFilter { search, rarity, card_type, evolutions_only: evo };
            let cards = filter.apply(catalog.cards());
            if json {
                serde_json::to_writer_pretty(&mut out, &cards)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", render::card_grid(&cards, &[], &tables))?;
            }
        }
        Command::Decks { archetype, sort, json } => {
            let query = DeckQuery { archetype, sort: sort.unwrap_or(config.default_sort) };
            let decks = query.run(tables.top_decks());
            if json {
                serde_json::to_writer_pretty(&mut out, &decks)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", render::deck_list(&decks, query.sort, &catalog))?;
            }
        }
        Command::Card { query } => {
            let card = catalog.resolve(&query)?;
            writeln!(out, "{}", render::card_detail(card, &tables, &catalog))?;
        }
        Command::Build(args) => build(args, &config, &catalog, &tables, &mut out)?,
    }
    Ok(())
}

fn build(
    args: BuildArgs,
    config: &Config,
    catalog: &CardCatalog,
    tables: &DeckTables,
    out: &mut impl Write,
) -> Result<()> {
    let mut rng = match args.seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut clipboard = args.clipboard.unwrap_or(config.clipboard).open();

    let mut builder = DeckBuilder::new();
    if args.random {
        builder.randomize(catalog, &mut rng);
    }
    for query in &args.cards {
        let card = catalog.resolve(query)?;
        builder.add(card).with_context(|| format!("cannot add {}", card.name))?;
    }
    if let Some(name) = &args.name {
        builder.set_name(name);
    }

    let one_shot = args.random || !args.cards.is_empty();
    if !one_shot {
        if args.copy {
            bail!("--copy needs --cards or --random");
        }
        let idle = match args.idle_timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => config.idle_timeout(),
        };
        let reader = LineReader::stdin();
        return Ok(Session::new(catalog, tables, clipboard, rng)
            .with_builder(builder)
            .run(&reader, idle, out)?);
    }

    writeln!(out, "{}", render::slate(&builder, catalog))?;
    let analysis = render::analysis(&builder.analyze(catalog));
    if !analysis.is_empty() {
        writeln!(out, "{analysis}")?;
    }
    if args.copy {
        clipboard.write_text(&builder.summary(catalog))?;
        writeln!(out, "Copied!")?;
    }
    Ok(())
}
