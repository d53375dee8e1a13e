//! # Barrier Race
//!
//! Dealer and player sessions for a small turn-based race and economy board game.
//!
//! Tokens race along a [`Path`](crate::path::Path) of sites separated by barriers. Every site has
//! a capacity, every arrival has an economic effect (money, victory points, cards) and the game
//! ends once some token rests on the last barrier behind everybody else.
//!
//! It provides:
//! - Path and deck parsing (`path`, `deck`)
//! - The economy engine and end of game scoring (`economy`)
//! - The shared position ledger and the turn scheduler (`ledger`, `turn_scheduler`)
//! - Player strategies via the [`Strategy`](crate::strategy::Strategy) trait, and the movement
//!   engine turning their wishes into legal moves
//! - A line based protocol between one [`Dealer`](crate::dealer::Dealer) and its
//!   [`PlayerSession`](crate::player::PlayerSession)s, over any byte stream (TCP, pipes)
//!
//! The dealer is authoritative: it schedules turns, validates and commits moves, and broadcasts
//! them in commit order. Each player keeps its own copy of the game, updated from those
//! broadcasts only.
//!
//! # Documentation Overview
//!
//! - For the game flow and early termination, see the [`dealer`] module.
//! - For the message formats, see the [`protocol`] module.
//! - For configuring the binaries, see [`Configuration`](crate::configuration::Configuration).
//!
//! # Usage Example
//!
//! A complete game over loopback TCP, players running on threads:
//!
//! ```no_run
//! use std::net::{TcpListener, TcpStream};
//! use std::io::BufReader;
//! use barrier_race::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let players = 2;
//!     let path = parse_path("7;::-Mo1V11V22Mo1Mo1::-", players)?;
//!     let deck: Deck = "5ABCDE".parse()?;
//!     let mut dealer = Dealer::new(path, deck, Configuration::new())?;
//!
//!     let listener = TcpListener::bind("127.0.0.1:0")?;
//!     let addr = listener.local_addr()?;
//!     let mut handles = vec![];
//!     for id in 0..players {
//!         handles.push(std::thread::spawn(move || {
//!             let stream = TcpStream::connect(addr).unwrap();
//!             let mut session =
//!                 PlayerSession::new(id, players, StrategyKind::Cascade.build()).unwrap();
//!             session.run(BufReader::new(stream.try_clone().unwrap()), stream)
//!         }));
//!         let (stream, _) = listener.accept()?;
//!         dealer.seat_tcp(stream)?;
//!     }
//!
//!     if let GameOutcome::Finished(scores) = dealer.run()? {
//!         println!("{scores}");
//!     }
//!     Ok(())
//! }
//! ```

pub use anyhow;
pub mod configuration;
pub mod dealer;
pub mod deck;
pub mod economy;
pub mod error;
pub mod game_state;
pub mod ledger;
pub mod logger;
pub mod path;
mod player_link;
pub mod player;
pub mod process;
pub mod protocol;
pub mod strategy;
pub mod turn_scheduler;

pub use player_link::EarlyStop;

/// Commonly used types and traits for quick access.
///
/// ```rust
/// use barrier_race::prelude::*;
/// ```
pub mod prelude {
    pub use crate::configuration::Configuration;
    pub use crate::dealer::{Dealer, GameOutcome};
    pub use crate::deck::{Card, Deck};
    pub use crate::economy::Scoreboard;
    pub use crate::error::{ParseError, ProtocolFault, SessionError};
    pub use crate::game_state::GameState;
    pub use crate::path::{parse_path, Path, SiteKind};
    pub use crate::player::{PlayerOutcome, PlayerSession};
    pub use crate::process::PlayerProcess;
    pub use crate::strategy::{Strategy, StrategyKind};
    pub use crate::EarlyStop;
}
