use rand::seq::SliceRandom;
use std::fmt;

use super::constants::{self, DECK_SIZE};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Suit {
    Heart,
    Spade,
    Diamond,
    Club,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Heart, Self::Spade, Self::Diamond, Self::Club];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Heart => "♥",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Club => "♣",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Face {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Face {
    pub const ALL: [Self; 13] = [
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
        Self::Ace,
    ];

    /// Point value a freshly drawn card of this face is worth. Aces start
    /// high and may later be demoted to 1.
    #[must_use]
    pub fn default_value(self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::Ten | Self::Jack | Self::Queen | Self::King => 10,
            Self::Ace => 11,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        };
        write!(f, "{repr}")
    }
}

/// A playing card. Only an ace's value can change, and only from 11 to 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Card {
    face: Face,
    suit: Suit,
    value: u32,
    visible: bool,
}

impl Card {
    #[must_use]
    pub fn new(face: Face, suit: Suit) -> Self {
        Self {
            face,
            suit,
            value: face.default_value(),
            visible: false,
        }
    }

    #[must_use]
    pub fn face(&self) -> Face {
        self.face
    }

    #[must_use]
    pub fn suit(&self) -> Suit {
        self.suit
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn reveal(&mut self) {
        self.visible = true;
    }

    #[must_use]
    pub fn is_high_ace(&self) -> bool {
        self.face == Face::Ace && self.value == 11
    }

    /// Counts a high ace as 1 from now on. Returns whether anything changed.
    pub fn demote_ace(&mut self) -> bool {
        if self.is_high_ace() {
            self.value = 1;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[ {}{} ]", self.face, self.suit)
    }
}

/// Sum of the point values of `cards`.
#[must_use]
pub fn points(cards: &[Card]) -> u32 {
    cards.iter().map(Card::value).sum()
}

/// The draw pile. Cards are drawn from the back of `cards`.
#[derive(Debug)]
pub struct Shoe {
    cards: Vec<Card>,
    num_decks: usize,
}

impl Shoe {
    /// Builds and shuffles `num_decks` standard decks (at least one).
    #[must_use]
    pub fn new(num_decks: usize) -> Self {
        let num_decks = num_decks.max(1);
        let mut shoe = Self {
            cards: Vec::with_capacity(num_decks * DECK_SIZE),
            num_decks,
        };
        shoe.refill();
        shoe
    }

    /// A shoe whose next draws are exactly `top`, in order, followed by
    /// `num_decks` shuffled decks.
    #[must_use]
    pub fn stacked(num_decks: usize, top: Vec<Card>) -> Self {
        let mut shoe = Self::new(num_decks);
        shoe.cards.extend(top.into_iter().rev());
        shoe
    }

    #[must_use]
    pub fn num_decks(&self) -> usize {
        self.num_decks
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_low(&self) -> bool {
        self.remaining() <= DECK_SIZE
    }

    /// Discards whatever is left and rebuilds the shoe from fresh decks.
    pub fn refill(&mut self) {
        self.cards.clear();
        for _ in 0..self.num_decks {
            for suit in Suit::ALL {
                for face in Face::ALL {
                    self.cards.push(Card::new(face, suit));
                }
            }
        }
        self.cards.shuffle(&mut rand::rng());
    }

    /// Refills the shoe if at most one deck is left. Returns whether a refill happened.
    pub fn refill_if_low(&mut self) -> bool {
        if self.is_low() {
            log::debug!(
                "shoe low ({} cards), refilling with {} decks",
                self.remaining(),
                self.num_decks
            );
            self.refill();
            true
        } else {
            false
        }
    }

    /// Draws the next card. An empty shoe is refilled first.
    pub fn draw(&mut self, visible: bool) -> Card {
        if self.cards.is_empty() {
            self.refill();
        }
        // Never empty after a refill: there is always at least one deck.
        let mut card = self
            .cards
            .pop()
            .unwrap_or_else(|| Card::new(Face::Ace, Suit::Spade));
        if visible {
            card.reveal();
        }
        card
    }
}

impl Default for Shoe {
    fn default() -> Self {
        Self::new(constants::DEFAULT_NUM_DECKS)
    }
}

/// Whole dollars. Bets and balances never go negative.
pub type Chips = u32;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let mut username: String = s
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        if username.len() > constants::MAX_USERNAME_LENGTH {
            let mut end = constants::MAX_USERNAME_LENGTH;
            while !username.is_char_boundary(end) {
                end -= 1;
            }
            username.truncate(end);
        }
        Self(username)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Type alias for seat positions at a table.
pub type SeatIndex = usize;

#[derive(Clone, Debug)]
pub struct Player {
    pub name: Username,
    pub balance: Chips,
    pub wins: u32,
    pub losses: u32,
    pub hand: Vec<Card>,
}

impl Player {
    #[must_use]
    pub fn new(name: Username, balance: Chips) -> Self {
        Self {
            name,
            balance,
            wins: 0,
            losses: 0,
            hand: Vec::with_capacity(2),
        }
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        points(&self.hand)
    }

    pub fn discard_hand(&mut self) {
        self.hand.clear();
    }
}

/// A slot at the table. Seats live as long as the game; players come and go.
#[derive(Clone, Debug, Default)]
pub struct Seat {
    pub player: Option<Player>,
    pub bust: bool,
    pub surrendered: bool,
    pub bet: Chips,
}

impl Seat {
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.player.is_some()
    }

    #[must_use]
    pub fn is_held_by(&self, username: &Username) -> bool {
        self.player.as_ref().is_some_and(|p| &p.name == username)
    }

    pub fn seat(&mut self, player: Player) {
        self.player = Some(player);
        self.reset();
    }

    pub fn unseat(&mut self) -> Option<Player> {
        self.reset();
        self.player.take()
    }

    /// Clears per-round state.
    pub fn reset(&mut self) {
        self.bust = false;
        self.surrendered = false;
        self.bet = 0;
    }
}

/// A turn action, as sent over the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    Stand,
    Hit,
    Surrender,
    DoubleDown,
}

impl Action {
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Stand => 0,
            Self::Hit => 1,
            Self::Surrender => 2,
            Self::DoubleDown => 3,
        }
    }
}

impl TryFrom<i32> for Action {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Stand),
            1 => Ok(Self::Hit),
            2 => Ok(Self::Surrender),
            3 => Ok(Self::DoubleDown),
            other => Err(other),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Stand => "stand",
            Self::Hit => "hit!",
            Self::Surrender => "surrender!",
            Self::DoubleDown => "double down!",
        };
        write!(f, "{repr}")
    }
}

/// Outcome of the betting phase of a round, as sent over the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RoundStatus {
    /// Enough active players; the round is dealt.
    Continue,
    /// Too few active players this round, but enough registered to resume later.
    AddPlayer,
    /// The table is finished.
    Over,
}

impl RoundStatus {
    /// Status for a table with `active` seated connections and `registered` names.
    #[must_use]
    pub fn from_counts(active: usize, registered: usize) -> Self {
        if active >= constants::MIN_PLAYERS {
            Self::Continue
        } else if registered >= constants::MIN_PLAYERS {
            Self::AddPlayer
        } else {
            Self::Over
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Continue => 0,
            Self::AddPlayer => 1,
            Self::Over => 2,
        }
    }
}

impl TryFrom<u8> for RoundStatus {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Continue),
            1 => Ok(Self::AddPlayer),
            2 => Ok(Self::Over),
            other => Err(other),
        }
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Continue => "continue",
            Self::AddPlayer => "waiting for players",
            Self::Over => "over",
        };
        write!(f, "{repr}")
    }
}
