//! Authoritative side of a game.
//!
//! The [`Dealer`] owns the [`GameState`] and the deck, seats one link per player and then drives
//! the game from a single event queue:
//!
//! 1. every player sends `^` and receives the serialized path,
//! 2. the player picked by the turn scheduler receives `YT` and answers `DO<site>`,
//! 3. the move is validated, committed and broadcast as `HAP...` to every player, in commit order,
//! 4. once some player rests on the last site with the highest rank, everybody receives `DONE`.
//!
//! An [`EarlyStop`] (or a misbehaving player) ends the game with `EARLY` instead. In every case
//! the dealer waits for all sessions to hang up, bounded by the configured shutdown timeout.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Instant;

use anyhow::{bail, ensure};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::configuration::Configuration;
use crate::deck::Deck;
use crate::economy::Scoreboard;
use crate::error::{ProtocolFault, SessionError};
use crate::game_state::GameState;
use crate::logger::init_logger;
use crate::path::Path;
use crate::player_link::{EarlyStop, Event, PlayerLink};
use crate::protocol::{DealerMessage, PlayerMessage, SessionState};

/// How a game ended, from the dealer's point of view.
#[derive(Debug)]
pub enum GameOutcome {
    /// Somebody reached the end. Scores of all players, by id.
    Finished(Scoreboard),
    /// An [`EarlyStop`] was triggered.
    Terminated,
    /// `player` broke the protocol (or hung up) and the game was called off.
    Aborted { player: usize, reason: SessionError },
}

/// Reason the turn loop stopped before the end of the game.
enum Halt {
    Interrupted,
    Fault { player: usize, reason: SessionError },
}

impl From<(usize, ProtocolFault)> for Halt {
    fn from((player, fault): (usize, ProtocolFault)) -> Self {
        Halt::Fault {
            player,
            reason: fault.into(),
        }
    }
}

pub struct Dealer {
    state: GameState,
    deck: Deck,
    config: Configuration,
    links: Vec<PlayerLink>,
    events_tx: Sender<Event>,
    events: Receiver<Event>,
}

impl Dealer {
    /// Creates a dealer expecting as many players as `path` was parsed for.
    #[instrument(skip_all)]
    pub fn new(path: Path, deck: Deck, config: Configuration) -> anyhow::Result<Dealer> {
        if config.log {
            init_logger("dealer")?;
        }
        trace!(?config);
        info!(players = path.player_count(), path = %path.names(), cards = deck.len());

        let (events_tx, events) = mpsc::channel();
        Ok(Dealer {
            state: GameState::new(path),
            deck,
            config,
            links: Vec::new(),
            events_tx,
            events,
        })
    }

    pub fn player_count(&self) -> usize {
        self.state.player_count()
    }

    /// Seats the next player on the given byte stream ends and returns its id.
    pub fn seat(
        &mut self,
        reader: Box<dyn Read + Send>,
        writer: Box<dyn Write + Send>,
    ) -> anyhow::Result<usize> {
        let player = self.links.len();
        ensure!(
            player < self.player_count(),
            "all {} seats are already taken",
            self.player_count()
        );
        let link = PlayerLink::open(player, reader, writer, self.events_tx.clone())?;
        self.links.push(link);
        debug!(player, "player seated");
        Ok(player)
    }

    /// Seats the next player on a connected TCP stream.
    pub fn seat_tcp(&mut self, stream: TcpStream) -> anyhow::Result<usize> {
        let (reader, writer) = PlayerLink::tcp_ends(stream)?;
        self.seat(reader, writer)
    }

    /// Handle to end the game early, usable from any thread.
    pub fn early_stop(&self) -> EarlyStop {
        EarlyStop(self.events_tx.clone())
    }

    /// Plays the game to its end. Fails only if not every seat was taken.
    #[instrument(skip_all)]
    pub fn run(mut self) -> anyhow::Result<GameOutcome> {
        if self.links.len() != self.player_count() {
            bail!(
                "{} players seated, the path was made for {}",
                self.links.len(),
                self.player_count()
            );
        }

        let halt = match self.deal_path().and_then(|_| self.play_turns()) {
            Ok(()) => {
                let scoreboard = self.state.scoreboard();
                info!(%scoreboard, "game finished");
                self.broadcast_end(&DealerMessage::Done);
                self.wait_for_sessions();
                return Ok(GameOutcome::Finished(scoreboard));
            }
            Err(halt) => halt,
        };

        let outcome = match halt {
            Halt::Interrupted => {
                info!("early stop requested");
                GameOutcome::Terminated
            }
            Halt::Fault { player, reason } => {
                warn!(player, "aborting game: {reason}");
                self.links[player].shut_down();
                GameOutcome::Aborted { player, reason }
            }
        };
        self.broadcast_end(&DealerMessage::Early);
        self.wait_for_sessions();
        Ok(outcome)
    }

    /// Answers every path request. Players may ask in any order.
    fn deal_path(&mut self) -> Result<(), Halt> {
        let path_line = self.state.path().to_string();
        let mut pending = self.links.len();
        while pending > 0 {
            match self.next_event() {
                Event::Line { player, line } => {
                    let request = line.parse::<PlayerMessage>();
                    let link = &mut self.links[player];
                    match (request, link.state) {
                        (Ok(PlayerMessage::PathRequest), SessionState::AwaitingPath) => {
                            link.send(&path_line).map_err(|e| Halt::Fault {
                                player,
                                reason: e.into(),
                            })?;
                            link.state = SessionState::Idle;
                            pending -= 1;
                        }
                        _ => return Err(self.unexpected(player, line)),
                    }
                }
                Event::Closed { player } => {
                    self.links[player].closed = true;
                    return Err((player, ProtocolFault::ChannelClosed).into());
                }
                Event::Interrupt => return Err(Halt::Interrupted),
            }
        }
        debug!("path dealt to every player");
        Ok(())
    }

    fn play_turns(&mut self) -> Result<(), Halt> {
        while !self.state.is_finished() {
            let Some(player) = self.state.next_player() else {
                break;
            };
            self.request_move(player)?;
            let site = self.await_move(player)?;
            let broadcast = self
                .state
                .commit_move(player, site, &mut self.deck)
                .map_err(|fault| Halt::from((player, fault)))?;
            self.links[player].state = SessionState::Idle;
            self.broadcast(&DealerMessage::Happened(broadcast))?;
        }
        Ok(())
    }

    fn request_move(&mut self, player: usize) -> Result<(), Halt> {
        trace!(player, "your turn");
        let link = &mut self.links[player];
        link.send(&DealerMessage::YourTurn)
            .map_err(|e| Halt::Fault {
                player,
                reason: e.into(),
            })?;
        link.state = SessionState::AwaitingMoveResponse;
        Ok(())
    }

    /// Blocks until `player` names its target. Anything else arriving meanwhile is a fault.
    fn await_move(&mut self, player: usize) -> Result<usize, Halt> {
        match self.next_event() {
            Event::Line { player: from, line } if from == player => {
                match line.parse::<PlayerMessage>() {
                    Ok(PlayerMessage::Move(site)) => Ok(site),
                    _ => Err(self.unexpected(from, line)),
                }
            }
            Event::Line { player: from, line } => Err(self.unexpected(from, line)),
            Event::Closed { player: from } => {
                self.links[from].closed = true;
                Err((from, ProtocolFault::ChannelClosed).into())
            }
            Event::Interrupt => Err(Halt::Interrupted),
        }
    }

    /// Sends `message` to every player, in seat order.
    fn broadcast(&mut self, message: &DealerMessage) -> Result<(), Halt> {
        for link in self.links.iter_mut() {
            link.send(message).map_err(|e| Halt::Fault {
                player: link.player,
                reason: e.into(),
            })?;
        }
        Ok(())
    }

    /// Sends the final token to every player still listening, then stops writing.
    fn broadcast_end(&mut self, message: &DealerMessage) {
        for link in self.links.iter_mut().filter(|l| l.is_writable()) {
            if let Err(e) = link.send(message) {
                debug!(player = link.player, "could not send {message}: {e}");
            }
            link.shut_down();
        }
    }

    fn wait_for_sessions(&mut self) {
        let deadline = Instant::now() + self.config.shutdown_timeout;
        while self.links.iter().any(|l| !l.closed) {
            let timeout = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(timeout) {
                Ok(Event::Closed { player }) => {
                    debug!(player, "session closed");
                    self.links[player].closed = true;
                }
                Ok(Event::Line { player, line }) => {
                    debug!(player, %line, "ignoring message after end of game");
                }
                Ok(Event::Interrupt) => {}
                Err(RecvTimeoutError::Timeout) => {
                    let open = self
                        .links
                        .iter()
                        .filter(|l| !l.closed)
                        .map(|l| l.player)
                        .collect::<Vec<_>>();
                    error!(?open, "sessions still open after {:?}", self.config.shutdown_timeout);
                    return;
                }
                // the dealer holds a sender itself
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
        debug!("every session closed");
    }

    fn next_event(&mut self) -> Event {
        // never disconnected, `self.events_tx` is alive
        match self.events.recv() {
            Ok(event) => event,
            Err(_) => Event::Interrupt,
        }
    }

    fn unexpected(&self, player: usize, line: String) -> Halt {
        let state = self.links[player].state.to_string();
        (player, ProtocolFault::Unexpected { line, state }).into()
    }
}
