//! Line oriented messages exchanged between the dealer and its players.
//!
//! | direction       | message        | line                                  |
//! |-----------------|----------------|---------------------------------------|
//! | player → dealer | path request   | `^`                                   |
//! | dealer → player | path           | `7;::-Mo1V11V22Mo1Mo1::-`             |
//! | dealer → player | your turn      | `YT`                                  |
//! | player → dealer | move           | `DO<site>`                            |
//! | dealer → all    | move broadcast | `HAP<player>,<site>,<points>,<money>,<card>` |
//! | dealer → all    | early stop     | `EARLY`                               |
//! | dealer → all    | game over      | `DONE`                                |
//!
//! Every message is terminated by a line break. The path line is only valid right after a path
//! request and is parsed by [`parse_path`](crate::path::parse_path).

use std::fmt::{self, Display};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::deck::Card;
use crate::economy::ArrivalEffect;
use crate::error::ProtocolFault;

/// A committed move, as told to every player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveBroadcast {
    pub player: usize,
    pub site: usize,
    pub effect: ArrivalEffect,
}

impl Display for MoveBroadcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HAP{},{},{},{},{}",
            self.player,
            self.site,
            self.effect.points_delta,
            self.effect.money_delta,
            self.effect.drawn.map_or(0, Card::wire_number)
        )
    }
}

impl FromStr for MoveBroadcast {
    type Err = ProtocolFault;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let unparsable = || ProtocolFault::Unparsable(line.to_owned());
        let fields: Vec<_> = line
            .strip_prefix("HAP")
            .ok_or_else(unparsable)?
            .split(',')
            .collect();
        let [player, site, points, money, card] = fields.as_slice() else {
            return Err(unparsable());
        };

        let card: u8 = card.parse().map_err(|_| unparsable())?;
        let drawn = match card {
            0 => None,
            n => Some(Card::from_wire_number(n).ok_or_else(unparsable)?),
        };
        Ok(MoveBroadcast {
            player: player.parse().map_err(|_| unparsable())?,
            site: site.parse().map_err(|_| unparsable())?,
            effect: ArrivalEffect {
                points_delta: points.parse().map_err(|_| unparsable())?,
                money_delta: money.parse().map_err(|_| unparsable())?,
                drawn,
            },
        })
    }
}

/// Dealer to player messages, apart from the path line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealerMessage {
    YourTurn,
    Happened(MoveBroadcast),
    Early,
    Done,
}

impl Display for DealerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealerMessage::YourTurn => f.write_str("YT"),
            DealerMessage::Happened(broadcast) => Display::fmt(broadcast, f),
            DealerMessage::Early => f.write_str("EARLY"),
            DealerMessage::Done => f.write_str("DONE"),
        }
    }
}

impl FromStr for DealerMessage {
    type Err = ProtocolFault;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line {
            "YT" => Ok(DealerMessage::YourTurn),
            "EARLY" => Ok(DealerMessage::Early),
            "DONE" => Ok(DealerMessage::Done),
            _ if line.starts_with("HAP") => line.parse().map(DealerMessage::Happened),
            _ => Err(ProtocolFault::Unparsable(line.to_owned())),
        }
    }
}

/// Player to dealer messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMessage {
    PathRequest,
    Move(usize),
}

impl Display for PlayerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerMessage::PathRequest => f.write_str("^"),
            PlayerMessage::Move(site) => write!(f, "DO{site}"),
        }
    }
}

impl FromStr for PlayerMessage {
    type Err = ProtocolFault;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if line == "^" {
            return Ok(PlayerMessage::PathRequest);
        }
        line.strip_prefix("DO")
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .map(PlayerMessage::Move)
            .ok_or_else(|| ProtocolFault::Unparsable(line.to_owned()))
    }
}

/// Where a session stands in the message exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingPath,
    Idle,
    AwaitingMoveResponse,
    Finished,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::AwaitingPath => "awaiting path",
            SessionState::Idle => "idle",
            SessionState::AwaitingMoveResponse => "awaiting move",
            SessionState::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// Writes one message line and flushes it.
pub fn send_line(writer: &mut impl Write, message: &impl Display) -> io::Result<()> {
    writeln!(writer, "{message}")?;
    writer.flush()
}

/// Reads one line without its line break, `None` once the stream is closed.
pub fn read_line(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}
