//! Blackjack rules for one table: seating, betting, player actions, the
//! dealer's play, and settlement.
//!
//! Every operation addresses a player by username. The engine never touches
//! the network; the table actor drives it one call at a time.

use thiserror::Error;

use super::{
    constants::{
        BET_INCREMENT, BLACKJACK, DEALER_STANDS_ON, DEFAULT_BALANCE, DEFAULT_NUM_DECKS, MAX_BET,
        MIN_BET, MIN_PLAYERS, NUM_SEATS,
    },
    entities::{Card, Chips, Player, Seat, SeatIndex, Shoe, Username, points},
};

/// Errors from requests the engine refuses. The game state is unchanged
/// whenever one of these is returned.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GameError {
    #[error("bet of ${0} is not an even amount between ${min} and ${max}", min = MIN_BET, max = MAX_BET)]
    InvalidBet(i32),
    #[error("{0} is already seated")]
    AlreadySeated(Username),
    #[error("{0} is not seated at this table")]
    NotSeated(Username),
    #[error("need at least {min} players to deal", min = MIN_PLAYERS)]
    NotEnoughPlayers,
    #[error("all {seats} seats are taken", seats = NUM_SEATS)]
    TableFull,
}

/// Per-table rule parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GameSettings {
    pub num_decks: usize,
    pub starting_balance: Chips,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            num_decks: DEFAULT_NUM_DECKS,
            starting_balance: DEFAULT_BALANCE,
        }
    }
}

/// Result of a well-formed bet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BetOutcome {
    Accepted(Chips),
    /// The player can't cover the bet. Nothing was changed; the player's
    /// balance is reported back instead.
    InsufficientFunds { balance: Chips },
}

/// Hand whose total is being checked.
#[derive(Clone, Copy, Debug)]
pub enum Contender<'a> {
    Dealer,
    Player(&'a Username),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Win,
    Push,
    Surrender,
    Loss,
}

/// How one seat's bet was settled at the end of a round.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub username: Username,
    pub outcome: Outcome,
    pub bet: Chips,
    /// Signed change applied to the player's balance.
    pub delta: i64,
    pub balance: Chips,
}

/// Demotes high aces until the hand is at most 21 or no high ace is left.
/// Returns whether the hand is bust.
fn settle_aces(hand: &mut [Card]) -> bool {
    while points(hand) > BLACKJACK {
        match hand.iter_mut().find(|card| card.is_high_ace()) {
            Some(ace) => {
                ace.demote_ace();
            }
            None => return true,
        }
    }
    false
}

/// A blackjack table: four seats, a dealer, and one shoe.
#[derive(Debug)]
pub struct Game {
    seats: [Seat; NUM_SEATS],
    dealer_hand: Vec<Card>,
    dealer_points: u32,
    shoe: Shoe,
    round: u32,
    total_players: usize,
    settings: GameSettings,
}

impl Game {
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        Self::with_shoe(settings, Shoe::new(settings.num_decks))
    }

    /// A game drawing from a prepared shoe.
    #[must_use]
    pub fn with_shoe(settings: GameSettings, shoe: Shoe) -> Self {
        Self {
            seats: Default::default(),
            dealer_hand: Vec::with_capacity(4),
            dealer_points: 0,
            shoe,
            round: 0,
            total_players: 0,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    #[must_use]
    pub fn seat_index(&self, username: &Username) -> Option<SeatIndex> {
        self.seats.iter().position(|seat| seat.is_held_by(username))
    }

    #[must_use]
    pub fn seat(&self, username: &Username) -> Option<&Seat> {
        self.seat_index(username).map(|idx| &self.seats[idx])
    }

    #[must_use]
    pub fn player(&self, username: &Username) -> Option<&Player> {
        self.seat(username).and_then(|seat| seat.player.as_ref())
    }

    fn seat_mut(&mut self, username: &Username) -> Result<&mut Seat, GameError> {
        self.seats
            .iter_mut()
            .find(|seat| seat.is_held_by(username))
            .ok_or_else(|| GameError::NotSeated(username.clone()))
    }

    #[must_use]
    pub fn dealer_hand(&self) -> &[Card] {
        &self.dealer_hand
    }

    /// The dealer's total. Zero until the hole card is revealed.
    #[must_use]
    pub fn dealer_points(&self) -> u32 {
        self.dealer_points
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub fn total_players(&self) -> usize {
        self.total_players
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.total_players >= NUM_SEATS
    }

    #[must_use]
    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    /// Seats a new player in the first empty seat, scanning left to right.
    pub fn add_player(&mut self, username: Username) -> Result<SeatIndex, GameError> {
        if self.seat_index(&username).is_some() {
            return Err(GameError::AlreadySeated(username));
        }
        let Some(seat_idx) = self.seats.iter().position(|seat| !seat.is_occupied()) else {
            return Err(GameError::TableFull);
        };
        let player = Player::new(username, self.settings.starting_balance);
        self.seats[seat_idx].seat(player);
        self.total_players += 1;
        Ok(seat_idx)
    }

    /// Vacates the player's seat and hands the player back to the caller.
    pub fn remove_player(&mut self, username: &Username) -> Result<Player, GameError> {
        let seat = self.seat_mut(username)?;
        let player = seat
            .unseat()
            .ok_or_else(|| GameError::NotSeated(username.clone()))?;
        self.total_players -= 1;
        Ok(player)
    }

    /// Resets per-round flags, refills a low shoe, and deals. Bets placed
    /// before the deal are kept.
    pub fn start_round(&mut self) -> Result<(), GameError> {
        if self.total_players < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        self.round += 1;
        for seat in &mut self.seats {
            seat.bust = false;
            seat.surrendered = false;
            if let Some(player) = seat.player.as_mut() {
                player.discard_hand();
            }
        }
        self.dealer_hand.clear();
        self.dealer_points = 0;
        self.shoe.refill_if_low();

        for seat in &mut self.seats {
            if let Some(player) = seat.player.as_mut() {
                player.hand.push(self.shoe.draw(true));
                player.hand.push(self.shoe.draw(true));
                seat.bust = settle_aces(&mut player.hand);
            }
        }
        self.dealer_hand.push(self.shoe.draw(true));
        self.dealer_hand.push(self.shoe.draw(false));
        settle_aces(&mut self.dealer_hand);
        Ok(())
    }

    /// Validates and records a bet for the coming round.
    pub fn place_bet(&mut self, username: &Username, amount: i32) -> Result<BetOutcome, GameError> {
        if !(MIN_BET..=MAX_BET).contains(&amount) || amount % BET_INCREMENT != 0 {
            return Err(GameError::InvalidBet(amount));
        }
        let seat = self.seat_mut(username)?;
        // Range check above guarantees the amount is positive.
        let amount = amount.unsigned_abs();
        let balance = seat.player.as_ref().map_or(0, |player| player.balance);
        if balance < amount {
            return Ok(BetOutcome::InsufficientFunds { balance });
        }
        seat.bet = amount;
        Ok(BetOutcome::Accepted(amount))
    }

    /// Deals one more card. Returns whether the player may keep hitting.
    pub fn hit(&mut self, username: &Username) -> Result<bool, GameError> {
        let seat_idx = self
            .seat_index(username)
            .ok_or_else(|| GameError::NotSeated(username.clone()))?;
        if self.seats[seat_idx].bust || self.seats[seat_idx].surrendered {
            return Ok(false);
        }
        let card = self.shoe.draw(true);
        if let Some(player) = self.seats[seat_idx].player.as_mut() {
            player.hand.push(card);
        }
        Ok(!self.bust_check(Contender::Player(username)))
    }

    /// Doubles the bet, capped at the player's balance, and deals exactly one
    /// card. Returns whether the hand survived.
    pub fn double_down(&mut self, username: &Username) -> Result<bool, GameError> {
        let seat_idx = self
            .seat_index(username)
            .ok_or_else(|| GameError::NotSeated(username.clone()))?;
        let seat = &mut self.seats[seat_idx];
        if seat.bust || seat.surrendered {
            return Ok(false);
        }
        let Some(player) = seat.player.as_mut() else {
            return Err(GameError::NotSeated(username.clone()));
        };
        seat.bet = seat.bet.saturating_mul(2).min(player.balance);
        player.hand.push(self.shoe.draw(true));
        Ok(!self.bust_check(Contender::Player(username)))
    }

    /// Gives up the hand for half the bet. The hand is discarded immediately.
    pub fn surrender(&mut self, username: &Username) -> Result<(), GameError> {
        let seat = self.seat_mut(username)?;
        seat.surrendered = true;
        if let Some(player) = seat.player.as_mut() {
            player.discard_hand();
        }
        Ok(())
    }

    /// Saves an over-21 hand by counting high aces as 1. Returns whether the
    /// hand is bust; a bust seat stays bust for the rest of the round.
    pub fn bust_check(&mut self, contender: Contender<'_>) -> bool {
        match contender {
            Contender::Dealer => {
                let bust = settle_aces(&mut self.dealer_hand);
                self.dealer_points = points(&self.dealer_hand);
                bust
            }
            Contender::Player(username) => {
                let Ok(seat) = self.seat_mut(username) else {
                    return false;
                };
                let Some(player) = seat.player.as_mut() else {
                    return false;
                };
                if settle_aces(&mut player.hand) {
                    seat.bust = true;
                }
                seat.bust
            }
        }
    }

    /// Reveals the hole card and draws to 17 unless the dealer has a natural
    /// or every seated player is already bust.
    pub fn dealer_actions(&mut self) {
        for card in &mut self.dealer_hand {
            card.reveal();
        }
        if self.bust_check(Contender::Dealer) {
            return;
        }

        let everyone_bust = self
            .seats
            .iter()
            .filter(|seat| seat.is_occupied())
            .all(|seat| seat.bust);
        if self.dealer_points == BLACKJACK || everyone_bust {
            return;
        }

        while self.dealer_points < DEALER_STANDS_ON {
            self.dealer_hand.push(self.shoe.draw(true));
            if self.bust_check(Contender::Dealer) {
                break;
            }
        }
    }

    /// Pays out or collects every seated player's bet, then clears hands,
    /// bets, and the dealer's hand.
    pub fn settle_bets(&mut self) -> Vec<Settlement> {
        let dealer_points = self.dealer_points;
        let mut settlements = Vec::with_capacity(self.total_players);

        for seat in &mut self.seats {
            let Some(player) = seat.player.as_mut() else {
                continue;
            };
            let player_points = player.points();
            // A dealer bust pays every seat that didn't bust, surrendered or not.
            let outcome = if !seat.bust && player_points == dealer_points {
                Outcome::Push
            } else if !seat.bust && (player_points > dealer_points || dealer_points > BLACKJACK) {
                Outcome::Win
            } else if seat.surrendered {
                Outcome::Surrender
            } else {
                Outcome::Loss
            };

            let bet = seat.bet;
            let before = player.balance;
            match outcome {
                Outcome::Win => {
                    player.balance = player.balance.saturating_add(bet);
                    player.wins += 1;
                }
                Outcome::Push => {}
                Outcome::Surrender => {
                    player.balance = player.balance.saturating_sub(bet / 2);
                    player.losses += 1;
                }
                Outcome::Loss => {
                    player.balance = player.balance.saturating_sub(bet);
                    player.losses += 1;
                }
            }

            settlements.push(Settlement {
                username: player.name.clone(),
                outcome,
                bet,
                delta: i64::from(player.balance) - i64::from(before),
                balance: player.balance,
            });
            player.discard_hand();
            seat.bet = 0;
        }

        self.dealer_hand.clear();
        self.dealer_points = 0;
        settlements
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Face, Suit};

    fn card(face: Face) -> Card {
        Card::new(face, Suit::Spade)
    }

    fn name(s: &str) -> Username {
        Username::new(s)
    }

    /// A two-player game whose shoe deals `top` first.
    fn stacked_game(top: Vec<Card>) -> Game {
        let settings = GameSettings::default();
        let mut game = Game::with_shoe(settings, Shoe::stacked(settings.num_decks, top));
        game.add_player(name("alice")).unwrap();
        game.add_player(name("bob")).unwrap();
        game
    }

    // === Seating Tests ===

    #[test]
    fn test_add_player_first_empty_seat() {
        let mut game = Game::default();
        assert_eq!(game.add_player(name("a")), Ok(0));
        assert_eq!(game.add_player(name("b")), Ok(1));
        game.remove_player(&name("a")).unwrap();
        assert_eq!(game.add_player(name("c")), Ok(0));
        assert_eq!(game.total_players(), 2);
    }

    #[test]
    fn test_add_player_table_full() {
        let mut game = Game::default();
        for n in ["a", "b", "c", "d"] {
            game.add_player(name(n)).unwrap();
        }
        assert!(game.is_full());
        assert_eq!(game.add_player(name("e")), Err(GameError::TableFull));
        assert_eq!(game.total_players(), NUM_SEATS);
    }

    #[test]
    fn test_add_player_twice() {
        let mut game = Game::default();
        game.add_player(name("a")).unwrap();
        assert_eq!(
            game.add_player(name("a")),
            Err(GameError::AlreadySeated(name("a")))
        );
        assert_eq!(game.total_players(), 1);
    }

    #[test]
    fn test_remove_player() {
        let mut game = Game::default();
        game.add_player(name("a")).unwrap();
        let player = game.remove_player(&name("a")).unwrap();
        assert_eq!(player.balance, DEFAULT_BALANCE);
        assert_eq!(game.total_players(), 0);
        assert_eq!(
            game.remove_player(&name("a")).unwrap_err(),
            GameError::NotSeated(name("a"))
        );
    }

    #[test]
    fn test_total_players_matches_occupied_seats() {
        let mut game = Game::default();
        for n in ["a", "b", "c"] {
            game.add_player(name(n)).unwrap();
        }
        game.remove_player(&name("b")).unwrap();
        let occupied = game.seats().iter().filter(|s| s.is_occupied()).count();
        assert_eq!(occupied, game.total_players());
    }

    // === Betting Tests ===

    #[test]
    fn test_place_bet_limits() {
        let mut game = stacked_game(vec![]);
        let alice = name("alice");
        for amount in [2, 4, 6, 8, 10] {
            assert_eq!(
                game.place_bet(&alice, amount),
                Ok(BetOutcome::Accepted(amount as Chips))
            );
        }
        for amount in [-1, 0, 1, 3, 11, 12, 100] {
            assert_eq!(
                game.place_bet(&alice, amount),
                Err(GameError::InvalidBet(amount))
            );
        }
        assert_eq!(game.seat(&alice).unwrap().bet, 10);
    }

    #[test]
    fn test_place_bet_insufficient_funds() {
        let settings = GameSettings {
            num_decks: 1,
            starting_balance: 4,
        };
        let mut game = Game::new(settings);
        let alice = name("alice");
        game.add_player(alice.clone()).unwrap();
        assert_eq!(
            game.place_bet(&alice, 6),
            Ok(BetOutcome::InsufficientFunds { balance: 4 })
        );
        assert_eq!(game.seat(&alice).unwrap().bet, 0);
        assert_eq!(game.place_bet(&alice, 4), Ok(BetOutcome::Accepted(4)));
    }

    #[test]
    fn test_place_bet_unknown_player() {
        let mut game = Game::default();
        assert_eq!(
            game.place_bet(&name("ghost"), 2),
            Err(GameError::NotSeated(name("ghost")))
        );
    }

    // === Dealing Tests ===

    #[test]
    fn test_start_round_needs_two_players() {
        let mut game = Game::default();
        game.add_player(name("a")).unwrap();
        assert_eq!(game.start_round(), Err(GameError::NotEnoughPlayers));
        assert_eq!(game.round(), 0);
    }

    #[test]
    fn test_start_round_deals() {
        let mut game = stacked_game(vec![]);
        let before = game.shoe().remaining();
        game.start_round().unwrap();
        assert_eq!(game.round(), 1);
        assert_eq!(game.shoe().remaining(), before - 6);
        for seat in game.seats().iter().filter(|s| s.is_occupied()) {
            let hand = &seat.player.as_ref().unwrap().hand;
            assert_eq!(hand.len(), 2);
            assert!(hand.iter().all(Card::is_visible));
        }
        assert!(game.dealer_hand()[0].is_visible());
        assert!(!game.dealer_hand()[1].is_visible());
        assert_eq!(game.dealer_points(), 0);
    }

    #[test]
    fn test_start_round_refills_low_shoe() {
        let settings = GameSettings {
            num_decks: 2,
            starting_balance: DEFAULT_BALANCE,
        };
        let mut game = Game::new(settings);
        game.add_player(name("a")).unwrap();
        game.add_player(name("b")).unwrap();
        game.start_round().unwrap();
        game.settle_bets();
        // Draw down to one deck, then the next round rebuilds the shoe.
        while game.shoe().remaining() > 52 {
            game.start_round().unwrap();
            game.settle_bets();
        }
        game.start_round().unwrap();
        assert_eq!(game.shoe().remaining(), 2 * 52 - 6);
    }

    #[test]
    fn test_pair_of_aces_is_not_bust() {
        let mut game = stacked_game(vec![
            card(Face::Ace),
            card(Face::Ace),
            card(Face::Ten),
            card(Face::Nine),
            card(Face::Ten),
            card(Face::Seven),
        ]);
        game.start_round().unwrap();
        let seat = game.seat(&name("alice")).unwrap();
        assert!(!seat.bust);
        assert_eq!(seat.player.as_ref().unwrap().points(), 12);
    }

    // === Action Tests ===

    #[test]
    fn test_hit_until_bust() {
        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Two),
            card(Face::Ten),
            card(Face::Nine),
            card(Face::Ten),
            card(Face::Seven),
            card(Face::Five),
            card(Face::King),
        ]);
        let alice = name("alice");
        game.start_round().unwrap();
        assert_eq!(game.hit(&alice), Ok(true));
        assert_eq!(game.player(&alice).unwrap().points(), 17);
        assert_eq!(game.hit(&alice), Ok(false));
        assert!(game.seat(&alice).unwrap().bust);

        // Bust hands are refused without drawing.
        let remaining = game.shoe().remaining();
        assert_eq!(game.hit(&alice), Ok(false));
        assert_eq!(game.shoe().remaining(), remaining);
    }

    #[test]
    fn test_hit_saved_by_ace() {
        let mut game = stacked_game(vec![
            card(Face::Ace),
            card(Face::Six),
            card(Face::Ten),
            card(Face::Nine),
            card(Face::Ten),
            card(Face::Seven),
            card(Face::Nine),
        ]);
        let alice = name("alice");
        game.start_round().unwrap();
        assert_eq!(game.hit(&alice), Ok(true));
        let player = game.player(&alice).unwrap();
        assert_eq!(player.points(), 16);
        assert_eq!(player.hand[0].value(), 1);
        assert!(!game.seat(&alice).unwrap().bust);
    }

    #[test]
    fn test_hit_on_twenty_one_with_ace() {
        // 10 + 5 + 6 = 21 hard, then an ace: 32 -> 22, still bust.
        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Five),
            card(Face::Ten),
            card(Face::Nine),
            card(Face::Ten),
            card(Face::Seven),
            card(Face::Six),
            card(Face::Ace),
        ]);
        let alice = name("alice");
        game.start_round().unwrap();
        assert_eq!(game.hit(&alice), Ok(true));
        assert_eq!(game.hit(&alice), Ok(false));
        assert!(game.seat(&alice).unwrap().bust);
    }

    #[test]
    fn test_double_down() {
        let mut game = stacked_game(vec![
            card(Face::Five),
            card(Face::Six),
            card(Face::Ten),
            card(Face::Nine),
            card(Face::Ten),
            card(Face::Seven),
            card(Face::Ten),
        ]);
        let alice = name("alice");
        game.place_bet(&alice, 10).unwrap();
        game.start_round().unwrap();
        assert_eq!(game.double_down(&alice), Ok(true));
        let seat = game.seat(&alice).unwrap();
        assert_eq!(seat.bet, 20);
        assert_eq!(seat.player.as_ref().unwrap().hand.len(), 3);
        assert_eq!(seat.player.as_ref().unwrap().points(), 21);
    }

    #[test]
    fn test_double_down_capped_by_balance() {
        let settings = GameSettings {
            num_decks: 4,
            starting_balance: 14,
        };
        let shoe = Shoe::stacked(4, vec![card(Face::Two); 7]);
        let mut game = Game::with_shoe(settings, shoe);
        let alice = name("alice");
        game.add_player(alice.clone()).unwrap();
        game.add_player(name("bob")).unwrap();
        game.place_bet(&alice, 10).unwrap();
        game.start_round().unwrap();
        game.double_down(&alice).unwrap();
        let seat = game.seat(&alice).unwrap();
        assert_eq!(seat.bet, 14);
        assert_eq!(seat.player.as_ref().unwrap().hand.len(), 3);
    }

    #[test]
    fn test_surrender_discards_hand() {
        let mut game = stacked_game(vec![]);
        let alice = name("alice");
        game.start_round().unwrap();
        game.surrender(&alice).unwrap();
        let seat = game.seat(&alice).unwrap();
        assert!(seat.surrendered);
        assert!(seat.player.as_ref().unwrap().hand.is_empty());
        assert_eq!(game.hit(&alice), Ok(false));
    }

    // === Dealer Tests ===

    #[test]
    fn test_dealer_draws_to_seventeen() {
        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Eight),
            card(Face::Ten),
            card(Face::Nine),
            card(Face::Two),
            card(Face::Three),
            card(Face::Four),
            card(Face::Five),
            card(Face::Three),
            card(Face::Ten),
        ]);
        game.start_round().unwrap();
        game.dealer_actions();
        // 2 + 3 + 4 + 5 = 14, then 3 -> 17 and stand
        assert_eq!(game.dealer_hand().len(), 5);
        assert_eq!(game.dealer_points(), 17);

        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Eight),
            card(Face::Ten),
            card(Face::Nine),
            card(Face::Ten),
            card(Face::Six),
            card(Face::Ten),
        ]);
        game.start_round().unwrap();
        game.dealer_actions();
        assert_eq!(game.dealer_points(), 26);
        assert_eq!(game.dealer_hand().len(), 3);
        assert!(game.dealer_hand().iter().all(Card::is_visible));
    }

    #[test]
    fn test_dealer_stands_on_natural() {
        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Two),
            card(Face::Ten),
            card(Face::Three),
            card(Face::Ace),
            card(Face::King),
        ]);
        game.start_round().unwrap();
        game.dealer_actions();
        assert_eq!(game.dealer_hand().len(), 2);
        assert_eq!(game.dealer_points(), 21);
    }

    #[test]
    fn test_dealer_skips_when_everyone_bust() {
        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Six),
            card(Face::Ten),
            card(Face::Six),
            card(Face::Two),
            card(Face::Three),
            card(Face::King),
            card(Face::King),
        ]);
        game.start_round().unwrap();
        assert_eq!(game.hit(&name("alice")), Ok(false));
        assert_eq!(game.hit(&name("bob")), Ok(false));
        game.dealer_actions();
        assert_eq!(game.dealer_hand().len(), 2);
        assert_eq!(game.dealer_points(), 5);
    }

    // === Settlement Tests ===

    #[test]
    fn test_settle_win_loss_push() {
        // alice 20, bob 17, dealer 10 + 7 = 17
        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Queen),
            card(Face::Ten),
            card(Face::Seven),
            card(Face::Ten),
            card(Face::Seven),
        ]);
        let (alice, bob) = (name("alice"), name("bob"));
        game.place_bet(&alice, 10).unwrap();
        game.place_bet(&bob, 4).unwrap();
        game.start_round().unwrap();
        game.dealer_actions();
        let settlements = game.settle_bets();

        assert_eq!(settlements[0].outcome, Outcome::Win);
        assert_eq!(settlements[0].delta, 10);
        assert_eq!(settlements[1].outcome, Outcome::Push);
        assert_eq!(settlements[1].delta, 0);
        assert_eq!(game.player(&alice).unwrap().balance, DEFAULT_BALANCE + 10);
        assert_eq!(game.player(&alice).unwrap().wins, 1);
        assert_eq!(game.player(&bob).unwrap().balance, DEFAULT_BALANCE);
        assert_eq!(game.player(&bob).unwrap().losses, 0);

        assert!(game.dealer_hand().is_empty());
        assert_eq!(game.dealer_points(), 0);
        for seat in game.seats().iter().filter(|s| s.is_occupied()) {
            assert_eq!(seat.bet, 0);
            assert!(seat.player.as_ref().unwrap().hand.is_empty());
        }
    }

    #[test]
    fn test_settle_surrender_floor_half() {
        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Six),
            card(Face::Ten),
            card(Face::Seven),
            card(Face::Ten),
            card(Face::Nine),
        ]);
        let (alice, bob) = (name("alice"), name("bob"));
        game.place_bet(&alice, 6).unwrap();
        game.place_bet(&bob, 2).unwrap();
        game.start_round().unwrap();
        game.surrender(&alice).unwrap();
        game.dealer_actions();
        let settlements = game.settle_bets();
        assert_eq!(settlements[0].outcome, Outcome::Surrender);
        assert_eq!(settlements[0].delta, -3);
        assert_eq!(settlements[1].outcome, Outcome::Loss);
        assert_eq!(settlements[1].delta, -2);
        assert_eq!(game.player(&alice).unwrap().losses, 1);
    }

    #[test]
    fn test_settle_dealer_bust_pays_standing_players() {
        // alice 12, bob busts, dealer 10 + 6 + 10 = 26
        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Two),
            card(Face::Ten),
            card(Face::Six),
            card(Face::Ten),
            card(Face::Six),
            card(Face::King),
            card(Face::Ten),
        ]);
        let (alice, bob) = (name("alice"), name("bob"));
        game.place_bet(&alice, 4).unwrap();
        game.place_bet(&bob, 8).unwrap();
        game.start_round().unwrap();
        assert_eq!(game.hit(&bob), Ok(false));
        game.dealer_actions();
        assert!(game.dealer_points() > BLACKJACK);
        let settlements = game.settle_bets();
        assert_eq!(settlements[0].outcome, Outcome::Win);
        assert_eq!(settlements[0].delta, 4);
        assert_eq!(settlements[1].outcome, Outcome::Loss);
        assert_eq!(settlements[1].delta, -8);
    }

    #[test]
    fn test_settle_dealer_bust_pays_surrendered_seat() {
        // alice 16 surrenders, bob 17 stands, dealer 10 + 6 + K = 26
        let mut game = stacked_game(vec![
            card(Face::Ten),
            card(Face::Six),
            card(Face::Ten),
            card(Face::Seven),
            card(Face::Ten),
            card(Face::Six),
            card(Face::King),
        ]);
        let (alice, bob) = (name("alice"), name("bob"));
        game.place_bet(&alice, 6).unwrap();
        game.place_bet(&bob, 2).unwrap();
        game.start_round().unwrap();
        game.surrender(&alice).unwrap();
        game.dealer_actions();
        assert_eq!(game.dealer_points(), 26);

        let settlements = game.settle_bets();
        assert_eq!(settlements[0].outcome, Outcome::Win);
        assert_eq!(settlements[0].delta, 6);
        assert_eq!(game.player(&alice).unwrap().balance, DEFAULT_BALANCE + 6);
        assert_eq!(game.player(&alice).unwrap().wins, 1);
        assert_eq!(settlements[1].outcome, Outcome::Win);
        assert_eq!(settlements[1].delta, 2);
    }

    #[test]
    fn test_flags_reset_next_round() {
        let mut game = stacked_game(vec![]);
        let alice = name("alice");
        game.start_round().unwrap();
        game.surrender(&alice).unwrap();
        game.dealer_actions();
        game.settle_bets();
        game.start_round().unwrap();
        let seat = game.seat(&alice).unwrap();
        assert!(!seat.surrendered);
        assert!(!seat.bust);
        assert_eq!(game.round(), 2);
    }
}
