//! Everything a process knows about a running game.
//!
//! The dealer owns the authoritative [`GameState`] and changes it with
//! [`commit_move`](GameState::commit_move). Every player owns an independent copy which only
//! changes through [`apply_broadcast`](GameState::apply_broadcast).

use tracing::debug;

use crate::deck::Deck;
use crate::economy::{apply_arrival, PlayerAccount, Scoreboard};
use crate::error::ProtocolFault;
use crate::ledger::Ledger;
use crate::path::{Path, SiteKind};
use crate::protocol::MoveBroadcast;
use crate::turn_scheduler;

#[derive(Debug, Clone)]
pub struct GameState {
    path: Path,
    ledger: Ledger,
    accounts: Vec<PlayerAccount>,
}

impl GameState {
    /// Fresh game for as many players as the path was parsed for.
    pub fn new(path: Path) -> Self {
        let player_count = path.player_count();
        GameState {
            path,
            ledger: Ledger::new(player_count),
            accounts: vec![PlayerAccount::default(); player_count],
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn player_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn account(&self, player: usize) -> Option<&PlayerAccount> {
        self.accounts.get(player)
    }

    pub fn accounts(&self) -> &[PlayerAccount] {
        &self.accounts
    }

    /// True if `site` can take one more token right now.
    pub fn has_room(&self, site: usize) -> bool {
        self.path
            .site(site)
            .is_some_and(|s| self.ledger.site_usage(site) < s.capacity)
    }

    pub fn is_finished(&self) -> bool {
        turn_scheduler::is_finished(&self.ledger, self.path.last_index())
    }

    pub fn next_player(&self) -> Option<usize> {
        turn_scheduler::next_player(&self.ledger)
    }

    fn check_player(&self, player: usize) -> Result<(), ProtocolFault> {
        if player < self.player_count() {
            Ok(())
        } else {
            Err(ProtocolFault::PlayerOutOfRange {
                player,
                count: self.player_count(),
            })
        }
    }

    fn site_kind(&self, site: usize) -> Result<SiteKind, ProtocolFault> {
        self.path
            .site(site)
            .map(|s| s.kind)
            .ok_or(ProtocolFault::SiteOutOfRange {
                site,
                len: self.path.len(),
            })
    }

    /// Validates and commits the move of `player` to `site`, drawing from `deck` if needed.
    ///
    /// The target must lie ahead of the player, not beyond the next barrier, and have room.
    pub fn commit_move(
        &mut self,
        player: usize,
        site: usize,
        deck: &mut Deck,
    ) -> Result<MoveBroadcast, ProtocolFault> {
        self.check_player(player)?;
        let kind = self.site_kind(site)?;
        let illegal = |reason| ProtocolFault::IllegalMove {
            player,
            site,
            reason,
        };

        let from = self.ledger.positions()[player].site;
        if site <= from {
            return Err(illegal("target is not ahead"));
        }
        if self
            .path
            .find_ahead(SiteKind::Barrier, from)
            .is_some_and(|barrier| site > barrier)
        {
            return Err(illegal("target is beyond the next barrier"));
        }
        if !self.has_room(site) {
            return Err(illegal("target is full"));
        }

        let rank = self.ledger.place(player, site);
        let effect = apply_arrival(kind, &mut self.accounts[player], deck);
        debug!(player, site, rank, ?effect, "move committed");
        Ok(MoveBroadcast {
            player,
            site,
            effect,
        })
    }

    /// Replays a move reported by the dealer on this copy of the game.
    pub fn apply_broadcast(&mut self, broadcast: &MoveBroadcast) -> Result<(), ProtocolFault> {
        self.check_player(broadcast.player)?;
        let kind = self.site_kind(broadcast.site)?;

        let rank = self.ledger.place(broadcast.player, broadcast.site);
        self.accounts[broadcast.player].apply_reported(kind, &broadcast.effect);
        debug!(
            player = broadcast.player,
            site = broadcast.site,
            rank,
            "move observed"
        );
        Ok(())
    }

    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard(self.accounts.iter().map(PlayerAccount::final_score).collect())
    }
}
