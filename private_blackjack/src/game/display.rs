//! Text views sent to clients. Every function here is pure.

use std::fmt::Write;

use super::{
    constants::BLACKJACK,
    engine::Game,
    entities::{Action, Card, Username},
};

const RULE: &str = "___________________________________________________";
const BANNER: &str =
    "+++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++++";
const DIVIDER: &str =
    "---------------------------------------------------------------------------------";

/// Width of the scoreboard's player column. Longer names are cut.
const NAME_COLUMN: usize = 27;

/// Sent in place of a roster when no table can be joined.
pub const NO_TABLES: &str = "\nNo current games\n\n";

fn write_cards(out: &mut String, cards: &[Card]) {
    for card in cards {
        if card.is_visible() {
            let _ = write!(out, "{card} ");
        } else {
            out.push_str("[    ]");
        }
    }
}

/// Every seated player's bet and cards, followed by the dealer's.
#[must_use]
pub fn hands(game: &Game) -> String {
    let mut out = String::with_capacity(512);
    let _ = writeln!(out, "\t\t      Hands");
    let _ = writeln!(out, "{RULE}");
    for seat in game.seats() {
        let Some(player) = &seat.player else {
            continue;
        };
        let _ = writeln!(out, "{} (Bet: ${}) ", player.name, seat.bet);
        write_cards(&mut out, &player.hand);
        if seat.bust {
            out.push_str("-- BUST");
        }
        if player.points() == BLACKJACK {
            out.push_str("-- BLACKJACK");
        }
        if seat.surrendered {
            out.push_str("SURRENDERED");
        }
        out.push_str("\n\n");
    }

    let _ = writeln!(out, "Dealer");
    write_cards(&mut out, game.dealer_hand());
    let dealer_points = game.dealer_points();
    if dealer_points > BLACKJACK {
        out.push_str("-- BUST");
    } else if dealer_points == BLACKJACK {
        out.push_str("-- BLACKJACK");
    }
    let _ = writeln!(out, "\n{RULE}");
    out
}

/// Scoreboard of every seated player.
#[must_use]
pub fn stats(game: &Game) -> String {
    let mut out = String::with_capacity(1024);
    let _ = writeln!(out, "{BANNER}");
    let title = if game.round() == 0 {
        "Starting Round 1".to_string()
    } else {
        format!("Round {}", game.round())
    };
    let _ = writeln!(out, "|{title:^79}|");
    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(
        out,
        "|{:^27}|{:^17}|{:^16}|{:^16}|",
        "Player", "Balance", "Wins", "Losses"
    );
    let _ = writeln!(out, "{DIVIDER}");
    for player in game.seats().iter().filter_map(|seat| seat.player.as_ref()) {
        let name: String = player.name.as_str().chars().take(NAME_COLUMN).collect();
        let balance = format!("${}", player.balance);
        let _ = writeln!(
            out,
            "|{:^27}|{:^17}|{:^16}|{:^16}|",
            name,
            balance,
            player.wins,
            player.losses
        );
    }
    let _ = writeln!(out, "{BANNER}");
    out
}

/// Announces whose turn it is.
#[must_use]
pub fn turn(username: &Username) -> String {
    username.to_string()
}

/// What a player just did, followed by the updated hands.
#[must_use]
pub fn action(username: &Username, action: Action, hands: &str) -> String {
    format!("\n{username} chose to {action}\n\n{hands}")
}

/// Shown when a player sends an action code that doesn't exist. The
/// player is prompted again.
#[must_use]
pub fn unknown_action(username: &Username, code: i32, hands: &str) -> String {
    format!("\n{username} sent an unknown action ({code})\n\n{hands}")
}

/// One line per table: its id and the names registered at it.
#[must_use]
pub fn roster<'a, I>(tables: I) -> String
where
    I: IntoIterator<Item = (i32, Vec<&'a Username>)>,
{
    let mut out = String::new();
    for (table_id, names) in tables {
        let _ = write!(out, "\nGame ID: {table_id}\nPlayers:");
        for name in names {
            let _ = write!(out, " {name}");
        }
        out.push_str("\n\n");
    }
    if out.is_empty() {
        NO_TABLES.to_string()
    } else {
        out
    }
}
