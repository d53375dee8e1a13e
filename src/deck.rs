//! Cards and the circular deck the dealer draws from.
//!
//! A deck is written as its size followed by that many card symbols, e.g. `6ABCDEA`.
//! Players never draw: they only learn about drawn cards through move broadcasts.

use std::fmt::{self, Display};

use crate::error::ParseError;

/// Kind of a collectable card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Card {
    A,
    B,
    C,
    D,
    E,
}

impl Card {
    pub const ALL: [Card; 5] = [Card::A, Card::B, Card::C, Card::D, Card::E];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_symbol(symbol: char) -> Option<Card> {
        match symbol {
            'A' => Some(Card::A),
            'B' => Some(Card::B),
            'C' => Some(Card::C),
            'D' => Some(Card::D),
            'E' => Some(Card::E),
            _ => None,
        }
    }

    /// Number used in move broadcasts, `A` is 1. 0 stands for "no card".
    pub fn wire_number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_wire_number(number: u8) -> Option<Card> {
        Card::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Circular sequence of cards, owned by the dealer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Result<Deck, ParseError> {
        if cards.is_empty() {
            return Err(ParseError::EmptyDeck);
        }
        Ok(Deck { cards, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draws the card under the cursor, wrapping around at the end.
    pub fn draw(&mut self) -> Card {
        let card = self.cards[self.next];
        self.next = (self.next + 1) % self.cards.len();
        card
    }
}

impl std::str::FromStr for Deck {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim_start();
        let digits = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
        let declared: usize = text[..digits]
            .parse()
            .map_err(|_| ParseError::MissingDeckSize)?;

        let cards = text[digits..]
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| Card::from_symbol(c).ok_or(ParseError::UnknownCard(c)))
            .collect::<Result<Vec<_>, _>>()?;

        if declared == 0 {
            return Err(ParseError::EmptyDeck);
        }
        if cards.len() != declared {
            return Err(ParseError::DeckSizeMismatch {
                declared,
                found: cards.len(),
            });
        }
        Deck::new(cards)
    }
}
