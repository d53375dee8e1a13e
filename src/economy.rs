//! Site effects and end of game scoring.

use std::fmt::{self, Display};

use crate::deck::{Card, Deck};
use crate::path::SiteKind;

/// Points for a set of `n` distinct card kinds, indexed by `n`.
const SET_BONUS: [i64; 6] = [0, 1, 3, 5, 7, 10];

/// Money every player starts with.
pub const STARTING_MONEY: i64 = 7;

/// Number of collected cards of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardCounts([u32; 5]);

impl CardCounts {
    pub fn get(&self, card: Card) -> u32 {
        self.0[card.index()]
    }

    pub fn add(&mut self, card: Card) {
        self.0[card.index()] += 1;
    }

    pub fn from_counts(counts: [u32; 5]) -> Self {
        CardCounts(counts)
    }
}

/// Earnings of a single player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAccount {
    pub money: i64,
    pub score1: u32,
    pub score2: u32,
    pub points: i64,
    pub cards: CardCounts,
    pub total_cards: u32,
}

impl Default for PlayerAccount {
    fn default() -> Self {
        PlayerAccount {
            money: STARTING_MONEY,
            score1: 0,
            score2: 0,
            points: 0,
            cards: CardCounts::default(),
            total_cards: 0,
        }
    }
}

/// Result of landing on a site, as reported in move broadcasts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrivalEffect {
    pub money_delta: i64,
    pub points_delta: i64,
    pub drawn: Option<Card>,
}

/// Applies the effect of landing on a `kind` site to `account`. Only the dealer calls this.
pub fn apply_arrival(kind: SiteKind, account: &mut PlayerAccount, deck: &mut Deck) -> ArrivalEffect {
    let mut effect = ArrivalEffect::default();
    match kind {
        SiteKind::Money => {
            account.money += 3;
            effect.money_delta = 3;
        }
        SiteKind::Convert => {
            effect.points_delta = account.money / 2;
            account.points += effect.points_delta;
            effect.money_delta = -account.money;
            account.money = 0;
        }
        SiteKind::Score1 => account.score1 += 1,
        SiteKind::Score2 => account.score2 += 1,
        SiteKind::Draw => {
            let card = deck.draw();
            account.cards.add(card);
            account.total_cards += 1;
            effect.drawn = Some(card);
        }
        SiteKind::Barrier => {}
    }
    effect
}

impl PlayerAccount {
    /// Book-keeping from a broadcast: deltas as reported, victory points inferred from the site.
    pub fn apply_reported(&mut self, kind: SiteKind, effect: &ArrivalEffect) {
        self.money += effect.money_delta;
        self.points += effect.points_delta;
        if let Some(card) = effect.drawn {
            self.cards.add(card);
            self.total_cards += 1;
        }
        match kind {
            SiteKind::Score1 => self.score1 += 1,
            SiteKind::Score2 => self.score2 += 1,
            _ => {}
        }
    }

    pub fn final_score(&self) -> i64 {
        self.points + i64::from(self.score1) + i64::from(self.score2) + card_set_bonus(&self.cards)
    }
}

/// Bonus for collected cards.
///
/// Sets are peeled off layer by layer: each pass removes one card of every kind still held and
/// scores the number of kinds removed.
pub fn card_set_bonus(cards: &CardCounts) -> i64 {
    let mut counts = cards.0;
    let mut total = 0;
    loop {
        let mut distinct = 0;
        for count in counts.iter_mut().filter(|c| **c > 0) {
            *count -= 1;
            distinct += 1;
        }
        if distinct == 0 {
            return total;
        }
        total += SET_BONUS[distinct];
    }
}

/// Final scores of all players, in player order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard(pub Vec<i64>);

impl Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scores = self
            .0
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "Scores: {scores}")
    }
}
