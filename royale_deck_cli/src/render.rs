//! Plain-text views of cards, decks and the deck slate.

use std::fmt::Write;

use crate::builder::{DeckAnalysis, DeckBuilder, DECK_SIZE};
use crate::card::Card;
use crate::catalog::CardCatalog;
use crate::deck::{one_decimal, DeckTables, MetaDeck, WinRateTier};
use crate::filter::{archetype_highlights, DeckSummary, SortKey};

/// `1234567` -> `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn card_grid(cards: &[&Card], selected: &[u32], tables: &DeckTables) -> String {
    let mut s = String::new();
    for c in cards {
        let mark = if selected.contains(&c.id) { "✓" } else { " " };
        let evo = if c.has_evolution() { "EVO" } else { "" };
        let star = if tables.is_featured(c.id) { "⭐" } else { "" };
        let _ = writeln!(
            s,
            "{mark} {:>8}  {:<18} {:<10} {} {:<8} 💧{}  {evo} {star}",
            c.id, c.name, c.rarity, c.card_type.icon(), c.card_type, c.elixir
        );
    }
    let _ = write!(s, "{} cards shown • ⭐ cards with featured decks", cards.len());
    s
}

fn stat_line(deck: &MetaDeck) -> String {
    let mut parts = vec![format!("💧 {}", one_decimal(deck.avg_elixir))];
    if let (Some(w), Some(tier)) = (deck.win_rate, deck.win_rate_tier()) {
        parts.push(format!("{w}% win ({})", tier.label()));
    }
    if let Some(u) = deck.usage {
        parts.push(format!("{u}% usage"));
    }
    if let Some(w) = deck.wins {
        parts.push(format!("{} wins", group_thousands(w)));
    }
    parts.join(" | ")
}

pub fn deck_row(deck: &MetaDeck, catalog: &CardCatalog) -> String {
    let mut s = String::new();
    let _ = write!(s, "{}", deck.name);
    if let Some(a) = deck.archetype {
        let _ = write!(s, "  [{a}]");
    }
    let cards: Vec<String> = deck
        .cards
        .iter()
        .filter_map(|id| catalog.get(*id))
        .map(|c| {
            let evo = if c.has_evolution() { " EVO" } else { "" };
            format!("{}({}{evo})", c.short_name(), c.elixir)
        })
        .collect();
    let _ = write!(s, "\n  {}\n  {}", cards.join(" "), stat_line(deck));
    if let Some(d) = &deck.description {
        let _ = write!(s, "\n  {d}");
    }
    s
}

pub fn deck_list(decks: &[&MetaDeck], sort: SortKey, catalog: &CardCatalog) -> String {
    let summary = DeckSummary::of(decks);
    let mut s = format!(
        "Decks: {} | Best win rate: {} | Avg elixir: {} | Total wins: {}\nSorted by {}\n",
        summary.count,
        summary.best_win_rate_label(),
        summary.avg_elixir_label(),
        summary.total_wins_label(),
        sort.label()
    );
    if decks.is_empty() {
        s.push_str("\nNo decks found for this archetype.");
        return s;
    }
    for (i, d) in decks.iter().enumerate() {
        let _ = write!(s, "\n#{} {}\n", i + 1, deck_row(d, catalog));
    }
    s
}

pub fn slate(builder: &DeckBuilder, catalog: &CardCatalog) -> String {
    let mut s = format!("{} ({}/{DECK_SIZE})\n", builder.display_name(), builder.len());
    for slot in 0..DECK_SIZE {
        let line = match builder.cards().get(slot) {
            Some(id) => match catalog.get(*id) {
                Some(c) => c.to_string(),
                None => format!("unknown card {id}"),
            },
            None => "--".to_string(),
        };
        let _ = writeln!(s, "  [{}] {line}", slot + 1);
    }
    let _ = write!(s, "Avg Elixir: {}", builder.analyze(catalog).avg_elixir_label());
    s
}

pub fn analysis(a: &DeckAnalysis) -> String {
    if a.size == 0 {
        return String::new();
    }
    let types: Vec<String> = a.types.iter().map(|(t, n)| format!("{t}: {n}")).collect();
    let rarities: Vec<String> = a.rarities.iter().map(|(r, n)| format!("{r}: {n}")).collect();
    let mut s = format!("Card types: {}\nRarities: {}", types.join(", "), rarities.join(", "));
    let tips = a.tips();
    if !tips.is_empty() {
        s.push_str("\nTips:");
        for t in tips {
            let _ = write!(s, "\n  - {t}");
        }
    }
    s
}

pub fn card_detail(card: &Card, tables: &DeckTables, catalog: &CardCatalog) -> String {
    let mut s = format!(
        "{} ({})\n{} | {} {} | 💧{}\nMax Level: {}",
        card.name,
        card.id,
        card.rarity,
        card.card_type.icon(),
        card.card_type,
        card.elixir,
        card.max_level()
    );
    if let Some(level) = card.evolution_level {
        let _ = write!(s, " • Evolution Level: {level}");
    }
    let decks = tables.decks_for_card(card.id);
    let _ = write!(s, "\n\nBest Decks with {} ({} decks)", card.name, decks.len());
    if decks.is_empty() {
        s.push_str("\nNo featured decks for this card yet.");
    }
    for d in decks {
        let _ = write!(s, "\n\n{}", deck_row(d, catalog));
    }
    s
}

pub fn overview(catalog: &CardCatalog, tables: &DeckTables) -> String {
    let mut s = format!(
        "{}+ Cards | {}+ Top Decks\n\nArchetypes:",
        catalog.len(),
        tables.top_decks().len()
    );
    for h in archetype_highlights(tables.top_decks()) {
        let _ = write!(s, "\n  {:<12} {} decks", h.archetype.as_str(), h.decks);
        if let Some(w) = h.best_win_rate {
            let _ = write!(s, "  best {w}% ({})", WinRateTier::from_win_rate(w).label());
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (CardCatalog, DeckTables) {
        let catalog = CardCatalog::bundled().unwrap();
        let tables = DeckTables::bundled(&catalog).unwrap();
        (catalog, tables)
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1845000), "1,845,000");
    }

    #[test]
    fn deck_row_shows_stats() {
        let (catalog, tables) = fixtures();
        let row = deck_row(&tables.top_decks()[0], &catalog);
        assert!(row.starts_with("Hog 2.6 Cycle  [Cycle]"));
        assert!(row.contains("Hog Rid..(4 EVO)"));
        assert!(row.contains("The Log(2)\n"));
        assert!(row.contains("💧 2.6 | 54.2% win (high) | 4.8% usage | 1,845,000 wins"));
    }

    #[test]
    fn slate_shows_empty_slots() {
        let (catalog, _) = fixtures();
        let mut b = DeckBuilder::new();
        b.add(catalog.resolve("Knight").unwrap()).unwrap();
        let text = slate(&b, &catalog);
        assert!(text.starts_with("My Deck (1/8)"));
        assert!(text.contains("[1] Knight (3) EVO"));
        assert!(text.contains("[8] --"));
        assert!(text.ends_with("Avg Elixir: 3.0"));
    }

    #[test]
    fn empty_deck_list_says_so() {
        let (catalog, _) = fixtures();
        let text = deck_list(&[], SortKey::WinRate, &catalog);
        assert!(text.starts_with("Decks: 0 | Best win rate: - |"));
        assert!(text.ends_with("No decks found for this archetype."));
    }

    #[test]
    fn card_detail_lists_featured_decks() {
        let (catalog, tables) = fixtures();
        let hog = catalog.resolve("Hog Rider").unwrap();
        let text = card_detail(hog, &tables, &catalog);
        assert!(text.contains("Max Level: 14 • Evolution Level: 1"));
        assert!(text.contains("Best Decks with Hog Rider (2 decks)"));

        let knight = catalog.resolve("Knight").unwrap();
        assert!(card_detail(knight, &tables, &catalog).ends_with("No featured decks for this card yet."));
    }

    #[test]
    fn grid_marks_selection_and_featured() {
        let (catalog, tables) = fixtures();
        let hog = catalog.resolve("Hog Rider").unwrap();
        let text = card_grid(&[hog], &[hog.id], &tables);
        assert!(text.starts_with("✓ 26000021  Hog Rider"));
        assert!(text.contains("EVO ⭐"));
        assert!(text.ends_with("1 cards shown • ⭐ cards with featured decks"));
    }

    #[test]
    fn overview_counts() {
        let (catalog, tables) = fixtures();
        let text = overview(&catalog, &tables);
        assert!(text.starts_with(&format!("{}+ Cards | 12+ Top Decks", catalog.len())));
        assert!(text.contains("Bridge Spam  2 decks  best 53.7% (high)"));
    }
}
