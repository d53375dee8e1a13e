//! Dealer side turn order.
//!
//! The least advanced token moves next. Among tokens sharing that site, the latest arrival
//! moves first, so tokens leave a site in reverse arrival order and ranks on a site stay
//! `0..usage`.

use tracing::trace;

use crate::ledger::Ledger;

/// Player that has to move next, `None` for an empty ledger.
pub fn next_player(ledger: &Ledger) -> Option<usize> {
    let positions = ledger.positions();
    let min_site = positions.iter().map(|p| p.site).min()?;
    let (player, position) = positions
        .iter()
        .enumerate()
        .filter(|(_, p)| p.site == min_site)
        .max_by_key(|(_, p)| p.rank)?;
    trace!(player, site = position.site, rank = position.rank, "next player");
    Some(player)
}

/// The game is over once a token sits on the last site with the highest possible rank, i.e.
/// every token made it through.
pub fn is_finished(ledger: &Ledger, last_site: usize) -> bool {
    let top_rank = ledger.player_count().saturating_sub(1);
    ledger
        .positions()
        .iter()
        .any(|p| p.site == last_site && p.rank == top_rank)
}
