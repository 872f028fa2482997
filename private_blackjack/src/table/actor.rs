//! Table actor driving one table's rounds over blocking connections.

use super::{
    TableId, lock,
    config::TableConfig,
    messages::{JoinError, TableMessage},
};
use crate::{
    game::{
        Game,
        constants::{MIN_PLAYERS, NUM_SEATS},
        display,
        engine::BetOutcome,
        entities::{Action, RoundStatus, Shoe, Username},
    },
    net::{messages::QUIT_BET, utils},
};
use bincode::Encode;
use std::{
    collections::{BTreeMap, BTreeSet},
    io::{Read, Write},
    mem,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};
use tokio::sync::mpsc;

/// How long an empty table waits for its registered players' connections
/// before checking the mailbox again.
pub const IDLE_WAIT: Duration = Duration::from_millis(50);

/// A player's connection. Implemented for anything that can carry the wire
/// protocol across threads.
pub trait PlayerStream: Read + Write + Send + 'static {}

impl<T: Read + Write + Send + 'static> PlayerStream for T {}

/// State other threads may read or update without going through the actor.
#[derive(Debug, Default)]
struct TableShared {
    /// Everyone committed to the table, admitted or still in the mailbox.
    names: Mutex<BTreeSet<Username>>,
    ready: AtomicBool,
    over: AtomicBool,
}

/// Table actor handle for registering players and sending messages
pub struct TableHandle<S> {
    table_id: TableId,
    shared: Arc<TableShared>,
    sender: mpsc::UnboundedSender<TableMessage<S>>,
}

impl<S> Clone for TableHandle<S> {
    fn clone(&self) -> Self {
        Self {
            table_id: self.table_id,
            shared: Arc::clone(&self.shared),
            sender: self.sender.clone(),
        }
    }
}

impl<S: PlayerStream> TableHandle<S> {
    /// Get table ID
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Whether enough players registered for the table to start.
    pub fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::Acquire)
    }

    pub fn is_over(&self) -> bool {
        self.shared.over.load(Ordering::Acquire)
    }

    pub fn is_full(&self) -> bool {
        lock(&self.shared.names).len() >= NUM_SEATS
    }

    pub fn is_joinable(&self) -> bool {
        !self.is_over() && !self.is_full()
    }

    pub fn has_name(&self, username: &Username) -> bool {
        lock(&self.shared.names).contains(username)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<Username> {
        lock(&self.shared.names).iter().cloned().collect()
    }

    /// Claims a seat for `username`. The over, capacity, and uniqueness
    /// checks happen under the same lock the round status is computed under.
    pub fn try_register(&self, username: &Username) -> Result<(), JoinError> {
        let mut names = lock(&self.shared.names);
        if self.is_over() {
            return Err(JoinError::TableOver(self.table_id));
        }
        if names.len() >= NUM_SEATS {
            return Err(JoinError::TableFull(self.table_id));
        }
        if !names.insert(username.clone()) {
            return Err(JoinError::NameTaken(username.clone()));
        }
        if names.len() >= MIN_PLAYERS {
            self.shared.ready.store(true, Ordering::Release);
        }
        Ok(())
    }

    /// Gives up a claimed seat that was never handed a connection.
    pub fn unregister(&self, username: &Username) {
        lock(&self.shared.names).remove(username);
    }

    /// Send a message to the table
    pub fn send(&self, message: TableMessage<S>) -> Result<(), JoinError> {
        self.sender
            .send(message)
            .map_err(|_| JoinError::Closed(self.table_id))
    }
}

/// Table actor owning one game and the connections seated at it
pub struct TableActor<S> {
    /// Table ID
    id: TableId,

    /// Table configuration
    config: TableConfig,

    /// Rule engine
    game: Game,

    shared: Arc<TableShared>,

    /// Join requests waiting for the next round boundary
    inbox: mpsc::UnboundedReceiver<TableMessage<S>>,

    /// Admitted players' connections, iterated in name order
    active: BTreeMap<Username, S>,

    /// Players whose connection failed this round
    dropped: BTreeSet<Username>,
}

impl<S: PlayerStream> TableActor<S> {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `id` - Table ID
    /// * `config` - Table configuration
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for reaching it
    pub fn new(id: TableId, config: TableConfig) -> (Self, TableHandle<S>) {
        let game = Game::new(config.game_settings());
        Self::with_game(id, config, game)
    }

    /// Create a table actor whose game deals from `shoe`.
    pub fn with_shoe(id: TableId, config: TableConfig, shoe: Shoe) -> (Self, TableHandle<S>) {
        let game = Game::with_shoe(config.game_settings(), shoe);
        Self::with_game(id, config, game)
    }

    fn with_game(id: TableId, config: TableConfig, game: Game) -> (Self, TableHandle<S>) {
        let (sender, inbox) = mpsc::unbounded_channel();
        let shared = Arc::new(TableShared::default());

        let actor = Self {
            id,
            config,
            game,
            shared: Arc::clone(&shared),
            inbox,
            active: BTreeMap::new(),
            dropped: BTreeSet::new(),
        };

        let handle = TableHandle {
            table_id: id,
            shared,
            sender,
        };

        (actor, handle)
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn is_over(&self) -> bool {
        self.shared.over.load(Ordering::Acquire)
    }

    /// Names of the players currently admitted.
    pub fn active_players(&self) -> Vec<Username> {
        self.active.keys().cloned().collect()
    }

    /// Seats the table's creator immediately, without going through the
    /// mailbox.
    pub fn seat_creator(&mut self, username: Username, stream: S) -> Result<(), JoinError> {
        {
            let mut names = lock(&self.shared.names);
            if !names.insert(username.clone()) {
                return Err(JoinError::NameTaken(username));
            }
            if names.len() >= MIN_PLAYERS {
                self.shared.ready.store(true, Ordering::Release);
            }
        }
        self.admit(username, stream);
        Ok(())
    }

    /// Run rounds until the table is over
    pub fn run(mut self) {
        log::info!("Table {} starting", self.id);

        while !self.is_over() {
            let status = self.play_round();
            log::debug!("Table {} round ended: {}", self.id, status);
            // Nobody to read from; wait for registered players to arrive.
            if status == RoundStatus::AddPlayer && self.active.is_empty() {
                thread::sleep(IDLE_WAIT);
            }
        }

        self.inbox.close();
        while let Ok(TableMessage::JoinTable { username, .. }) = self.inbox.try_recv() {
            log::warn!(
                "Table {}: dropping {} who joined after the table ended",
                self.id,
                username
            );
        }

        log::info!("Table {} closed", self.id);
    }

    /// Plays one round: admit waiting players, collect bets, process quits,
    /// and either deal, wait for more players, or end the table.
    pub fn play_round(&mut self) -> RoundStatus {
        while let Ok(TableMessage::JoinTable { username, stream }) = self.inbox.try_recv() {
            self.admit(username, stream);
        }

        self.broadcast(true);
        let quitters = self.collect_bets();
        for username in quitters {
            self.remove_player(&username);
        }

        let status = {
            let names = lock(&self.shared.names);
            let status = RoundStatus::from_counts(self.active.len(), names.len());
            if status == RoundStatus::Over {
                self.shared.over.store(true, Ordering::Release);
            }
            status
        };
        self.broadcast(status.code());

        match status {
            RoundStatus::Continue => {
                self.play_hand();
                let next = {
                    let names = lock(&self.shared.names);
                    let next = names.len() >= MIN_PLAYERS;
                    if !next {
                        self.shared.over.store(true, Ordering::Release);
                    }
                    next
                };
                self.broadcast(next);
            }
            RoundStatus::AddPlayer => {
                log::info!("Table {} waiting for more players", self.id);
                self.broadcast(true);
            }
            RoundStatus::Over => {}
        }

        status
    }

    fn admit(&mut self, username: Username, stream: S) {
        match self.game.add_player(username.clone()) {
            Ok(seat_idx) => {
                log::info!("Table {}: {} took seat {}", self.id, username, seat_idx);
                self.active.insert(username, stream);
            }
            Err(error) => {
                log::warn!("Table {}: couldn't seat {}: {}", self.id, username, error);
                lock(&self.shared.names).remove(&username);
            }
        }
    }

    fn remove_player(&mut self, username: &Username) {
        self.active.remove(username);
        self.dropped.remove(username);
        lock(&self.shared.names).remove(username);
        match self.game.remove_player(username) {
            Ok(player) => log::info!(
                "Table {}: {} left with ${}",
                self.id,
                username,
                player.balance
            ),
            Err(error) => log::warn!("Table {}: {}", self.id, error),
        }
    }

    /// Reads one bet from every active player. Returns the players leaving:
    /// those who sent the quit sentinel and those whose connection failed.
    fn collect_bets(&mut self) -> Vec<Username> {
        let mut quitters = Vec::new();
        for (username, stream) in &mut self.active {
            if self.dropped.contains(username) {
                quitters.push(username.clone());
                continue;
            }
            let amount = match utils::read_value::<i32, _>(stream) {
                Ok(QUIT_BET) => {
                    quitters.push(username.clone());
                    continue;
                }
                Ok(amount) => amount,
                Err(error) => {
                    log::warn!(
                        "Table {}: lost {} while betting: {}",
                        self.id,
                        username,
                        error
                    );
                    quitters.push(username.clone());
                    continue;
                }
            };
            match self.game.place_bet(username, amount) {
                Ok(BetOutcome::Accepted(bet)) => {
                    log::debug!("Table {}: {} bet ${}", self.id, username, bet);
                }
                Ok(BetOutcome::InsufficientFunds { balance }) => log::warn!(
                    "Table {}: {} can't cover ${} with ${}",
                    self.id,
                    username,
                    amount,
                    balance
                ),
                Err(error) => log::warn!("Table {}: {}: {}", self.id, username, error),
            }
        }
        quitters
    }

    fn play_hand(&mut self) {
        if let Err(error) = self.game.start_round() {
            log::error!("Table {}: couldn't deal: {}", self.id, error);
        }
        self.broadcast(true);
        self.broadcast(display::hands(&self.game).as_str());
        self.pause();

        self.take_turns();

        self.game.dealer_actions();
        self.broadcast(display::hands(&self.game).as_str());
        self.pause();

        for settlement in self.game.settle_bets() {
            log::debug!(
                "Table {}: {} {:?} on ${}, balance ${}",
                self.id,
                settlement.username,
                settlement.outcome,
                settlement.bet,
                settlement.balance
            );
        }
        self.broadcast(display::stats(&self.game).as_str());
        self.pause();

        for username in mem::take(&mut self.dropped) {
            log::info!("Table {}: dropping {} after a failed connection", self.id, username);
            self.remove_player(&username);
        }
    }

    fn take_turns(&mut self) {
        let players: Vec<Username> = self.active.keys().cloned().collect();
        for username in players {
            if self.dropped.contains(&username) {
                continue;
            }
            loop {
                self.broadcast(true);
                self.broadcast(display::turn(&username).as_str());
                let Some(code) = self.read_action(&username) else {
                    // A player we can't hear from stands.
                    self.apply(&username, Action::Stand);
                    let hands = display::hands(&self.game);
                    self.broadcast(display::action(&username, Action::Stand, &hands).as_str());
                    break;
                };
                let Ok(action) = Action::try_from(code) else {
                    log::warn!("Table {}: {} sent unknown action {}", self.id, username, code);
                    let hands = display::hands(&self.game);
                    self.broadcast(display::unknown_action(&username, code, &hands).as_str());
                    continue;
                };
                let can_hit = self.apply(&username, action);
                let hands = display::hands(&self.game);
                self.broadcast(display::action(&username, action, &hands).as_str());
                if !(action == Action::Hit && can_hit) {
                    break;
                }
            }
        }
        self.broadcast(false);
    }

    fn read_action(&mut self, username: &Username) -> Option<i32> {
        let stream = self.active.get_mut(username)?;
        match utils::read_value::<i32, _>(stream) {
            Ok(code) => Some(code),
            Err(error) => {
                log::warn!(
                    "Table {}: lost {} during their turn: {}",
                    self.id,
                    username,
                    error
                );
                self.dropped.insert(username.clone());
                None
            }
        }
    }

    /// Applies an action. Returns whether the player may hit again.
    fn apply(&mut self, username: &Username, action: Action) -> bool {
        let result = match action {
            Action::Stand => Ok(false),
            Action::Hit => self.game.hit(username),
            Action::Surrender => self.game.surrender(username).map(|()| false),
            Action::DoubleDown => self.game.double_down(username).map(|_| false),
        };
        result.unwrap_or_else(|error| {
            log::warn!("Table {}: {}", self.id, error);
            false
        })
    }

    /// Sends a value to every active player. Players whose write fails are
    /// marked dropped and skipped for the rest of the round.
    fn broadcast<T: Encode>(&mut self, value: T) {
        let buf = match utils::encode(value) {
            Ok(buf) => buf,
            Err(error) => {
                log::error!("Table {}: couldn't encode message: {}", self.id, error);
                return;
            }
        };
        for (username, stream) in &mut self.active {
            if self.dropped.contains(username) {
                continue;
            }
            if let Err(error) = stream.write_all(&buf).and_then(|()| stream.flush()) {
                log::warn!("Table {}: lost {}: {}", self.id, username, error);
                self.dropped.insert(username.clone());
            }
        }
    }

    fn pause(&self) {
        if !self.config.display_wait.is_zero() {
            thread::sleep(self.config.display_wait);
        }
    }
}
