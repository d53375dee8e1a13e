//! Error types shared by the dealer and player sessions.
//!
//! Malformed path or deck text is reported as [`ParseError`], misbehaving peers as
//! [`ProtocolFault`]. Both are fatal to the session that hit them, see [`SessionError`].
//! Running out of capacity while choosing a move is not an error at all: the movement engine
//! retries internally. An early stop is a regular outcome of a session, not an error either.

use thiserror::Error;

/// Path or deck text violating its grammar or its declared length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing or garbled site count (expected '<count>;')")]
    MissingCount,

    #[error("a path needs at least 2 sites, {declared} declared")]
    TooShort { declared: usize },

    #[error("path text is {len} bytes long, at most {bound} bytes allowed")]
    Overrun { len: usize, bound: usize },

    #[error("unknown site code '{code}' at byte {offset}")]
    UnknownSiteCode { code: String, offset: usize },

    #[error("missing or malformed capacity at byte {offset}")]
    BadCapacity { offset: usize },

    #[error("path declares {declared} sites but contains {found}")]
    CountMismatch { declared: usize, found: usize },

    #[error("path must start and end with a barrier")]
    MissingBarrier,

    #[error("player count must be at least 1")]
    NoPlayers,

    #[error("missing or garbled deck size")]
    MissingDeckSize,

    #[error("deck must hold at least one card")]
    EmptyDeck,

    #[error("unknown card symbol '{0}'")]
    UnknownCard(char),

    #[error("deck declares {declared} cards but contains {found}")]
    DeckSizeMismatch { declared: usize, found: usize },
}

/// A peer sent something that does not fit the session protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolFault {
    #[error("unparsable message '{0}'")]
    Unparsable(String),

    #[error("unexpected message '{line}' while {state}")]
    Unexpected { line: String, state: String },

    #[error("player {player} out of range (player count {count})")]
    PlayerOutOfRange { player: usize, count: usize },

    #[error("site {site} out of range (path length {len})")]
    SiteOutOfRange { site: usize, len: usize },

    #[error("illegal move of player {player} to site {site}: {reason}")]
    IllegalMove {
        player: usize,
        site: usize,
        reason: &'static str,
    },

    #[error("channel closed")]
    ChannelClosed,
}

/// Why a single session had to stop.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed input: {0}")]
    Malformed(#[from] ParseError),

    #[error("protocol fault: {0}")]
    Protocol(#[from] ProtocolFault),

    #[error("channel error: {0}")]
    Io(#[from] std::io::Error),
}
