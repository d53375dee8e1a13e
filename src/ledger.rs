//! Positions of every token on the path.
//!
//! The dealer holds the authoritative ledger. Every player keeps its own copy, updated from
//! move broadcasts only.

/// Where a token stands.
///
/// `rank` orders tokens sharing a site, 0 being the earliest arrival still present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerPosition {
    pub site: usize,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    positions: Vec<PlayerPosition>,
}

impl Ledger {
    /// All tokens on site 0. Higher numbered players count as earlier arrivals, so player 0
    /// holds the highest rank.
    pub fn new(player_count: usize) -> Self {
        let positions = (0..player_count)
            .map(|player| PlayerPosition {
                site: 0,
                rank: player_count - 1 - player,
            })
            .collect();
        Ledger { positions }
    }

    /// Ledger with explicit positions.
    pub fn from_positions(positions: Vec<PlayerPosition>) -> Self {
        Ledger { positions }
    }

    pub fn player_count(&self) -> usize {
        self.positions.len()
    }

    pub fn position(&self, player: usize) -> Option<PlayerPosition> {
        self.positions.get(player).copied()
    }

    pub fn positions(&self) -> &[PlayerPosition] {
        &self.positions
    }

    /// Number of tokens on `site`.
    pub fn site_usage(&self, site: usize) -> usize {
        self.positions.iter().filter(|p| p.site == site).count()
    }

    /// Moves `player` to `site`, ranking it behind the tokens already there.
    ///
    /// Capacity is checked by the callers. Returns the new rank.
    pub(crate) fn place(&mut self, player: usize, site: usize) -> usize {
        let rank = self.site_usage(site);
        self.positions[player] = PlayerPosition { site, rank };
        rank
    }
}
