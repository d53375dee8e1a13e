//! Player strategies used to pick the next site to move to.
//!
//! This module defines the [`Strategy`] trait, the two built-in strategies and the movement
//! engine ([`plan_move`]) that turns a strategy's wish into a site that can actually be taken.
//!
//! # Provided Strategies
//! - [`CascadeStrategy`]: trails behind when last, collects odd money, cards and `V2` sites.
//! - [`ConvertStrategy`]: converts money whenever it holds some, otherwise goes for the points.
//!
//! # Movement engine
//! A player never moves beyond the next barrier. The engine asks the strategy for a target,
//! clamps it to that barrier and checks its capacity against the local ledger. If the site is
//! full, the strategy is asked again with its search cursor moved to the rejected site, until a
//! site with room is found or the strategy gives up. In that case the player passes.
//! Strategies see whether they are retrying through [`MoveView::retry`].

use std::fmt::{self, Display};
use std::str::FromStr;

use tracing::{debug, trace};

use crate::economy::PlayerAccount;
use crate::game_state::GameState;
use crate::path::SiteKind;

/// What a strategy gets to look at while deciding.
#[derive(Debug, Clone, Copy)]
pub struct MoveView<'a> {
    pub state: &'a GameState,
    /// The deciding player.
    pub me: usize,
    /// Searches start strictly after this site. Equals the player's site on the first try.
    pub cursor: usize,
    /// The next barrier ahead of the player.
    pub barrier: usize,
    /// Set once an earlier target turned out to be full.
    pub retry: bool,
}

impl MoveView<'_> {
    /// First site of `kind` after the cursor, if it lies strictly before the next barrier.
    pub fn ahead_before_barrier(&self, kind: SiteKind) -> Option<usize> {
        self.state
            .path()
            .find_ahead(kind, self.cursor)
            .filter(|&site| site < self.barrier)
    }

    /// First site of `kind` after the cursor.
    pub fn ahead(&self, kind: SiteKind) -> Option<usize> {
        self.state.path().find_ahead(kind, self.cursor)
    }

    /// Site right after the cursor.
    pub fn next_site(&self) -> usize {
        self.cursor + 1
    }

    pub fn account(&self) -> Option<&PlayerAccount> {
        self.state.account(self.me)
    }
}

/// A fixed rule cascade choosing where a player wants to go.
///
/// Implementations must only return sites after `view.cursor`; the engine takes care of
/// barriers and capacity.
pub trait Strategy: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Desired target site, `None` if no rule applies.
    fn decide_move(&self, view: &MoveView<'_>) -> Option<usize>;
}

/// Built-in strategies, selectable at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    Cascade,
    Convert,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Cascade => Box::new(CascadeStrategy),
            StrategyKind::Convert => Box::new(ConvertStrategy),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "cascade" => Ok(StrategyKind::Cascade),
            "b" | "convert" => Ok(StrategyKind::Convert),
            _ => anyhow::bail!("unknown strategy '{s}' (expected 'a' or 'b')"),
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Cascade => f.write_str("cascade"),
            StrategyKind::Convert => f.write_str("convert"),
        }
    }
}

/// The reference strategy. First applicable rule wins:
///
/// 1. Alone at the back (rank 0, every other token strictly ahead) and the next site has
///    room: step forward once.
/// 2. Odd money and a `Mo` before the next barrier: go there.
/// 3. Most cards of all players (or nobody holds any) and a `Ri` before the next barrier: go
///    there.
/// 4. A `V2` before the next barrier: go there.
/// 5. The nearest site with room.
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeStrategy;

impl CascadeStrategy {
    fn we_are_last(view: &MoveView<'_>) -> Option<usize> {
        let ledger = view.state.ledger();
        let own = ledger.position(view.me)?;
        let next = view.next_site();
        let alone_at_back = own.rank == 0
            && ledger
                .positions()
                .iter()
                .enumerate()
                .all(|(player, p)| player == view.me || p.site > own.site);
        (alone_at_back && view.state.has_room(next)).then_some(next)
    }

    fn odd_money(view: &MoveView<'_>) -> Option<usize> {
        let account = view.account()?;
        if account.money % 2 != 1 {
            return None;
        }
        view.ahead_before_barrier(SiteKind::Money)
    }

    fn draw_card(view: &MoveView<'_>) -> Option<usize> {
        let site = view.ahead_before_barrier(SiteKind::Draw)?;
        let own = view.account()?.total_cards;
        let most_of_others = view
            .state
            .accounts()
            .iter()
            .enumerate()
            .filter(|(player, _)| *player != view.me)
            .map(|(_, account)| account.total_cards)
            .max()
            .unwrap_or(0);
        (own > most_of_others || own.max(most_of_others) == 0).then_some(site)
    }

    fn score2(view: &MoveView<'_>) -> Option<usize> {
        view.ahead_before_barrier(SiteKind::Score2)
    }

    fn next_free(view: &MoveView<'_>) -> Option<usize> {
        (view.next_site()..view.state.path().len()).find(|&site| view.state.has_room(site))
    }
}

impl Strategy for CascadeStrategy {
    fn name(&self) -> &'static str {
        "cascade"
    }

    fn decide_move(&self, view: &MoveView<'_>) -> Option<usize> {
        Self::we_are_last(view)
            .or_else(|| Self::odd_money(view))
            .or_else(|| Self::draw_card(view))
            .or_else(|| Self::score2(view))
            .or_else(|| Self::next_free(view))
    }
}

/// Money hoarding strategy:
///
/// 1. Holding money: go to the next `Do`. Past the next barrier, the engine stops at the barrier.
/// 2. The next site is a `Mo`: go there. First attempt only.
/// 3. The nearest `V1`, `V2` or barrier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertStrategy;

impl Strategy for ConvertStrategy {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn decide_move(&self, view: &MoveView<'_>) -> Option<usize> {
        let has_money = view.account().is_some_and(|a| a.money > 0);
        if has_money {
            if let Some(site) = view.ahead(SiteKind::Convert) {
                return Some(site);
            }
        }

        let next = view.next_site();
        let next_is_money = !view.retry
            && view
                .state
                .path()
                .site(next)
                .is_some_and(|s| s.kind == SiteKind::Money);
        if next_is_money {
            return Some(next);
        }

        [SiteKind::Score1, SiteKind::Score2, SiteKind::Barrier]
            .into_iter()
            .filter_map(|kind| view.ahead(kind))
            .min()
    }
}

/// The target was taken by someone else in the meantime.
#[derive(Debug)]
struct CapacityConflict;

fn claim(state: &GameState, site: usize) -> Result<usize, CapacityConflict> {
    if state.has_room(site) {
        Ok(site)
    } else {
        Err(CapacityConflict)
    }
}

/// Site `me` should move to according to `strategy`, or `None` to pass.
///
/// Nothing is committed: the move only becomes real once the dealer broadcasts it.
pub fn plan_move(strategy: &dyn Strategy, state: &GameState, me: usize) -> Option<usize> {
    let path = state.path();
    let position = state.ledger().position(me)?.site;
    if position + 1 >= path.len() {
        trace!(me, position, "at the end of the path");
        return None;
    }
    let barrier = path.find_ahead(SiteKind::Barrier, position)?;

    let mut cursor = position;
    loop {
        let view = MoveView {
            state,
            me,
            cursor,
            barrier,
            retry: cursor != position,
        };
        let wanted = strategy.decide_move(&view)?;
        let target = wanted.min(barrier);
        match claim(state, target) {
            Ok(site) => {
                debug!(me, strategy = strategy.name(), from = position, site, "move planned");
                return Some(site);
            }
            Err(CapacityConflict) => {
                trace!(me, site = target, "site full, trying next rule");
                if wanted <= cursor {
                    return None;
                }
                cursor = wanted;
            }
        }
    }
}
