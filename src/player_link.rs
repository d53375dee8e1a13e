//! Dealer side end of the byte stream to a single player.
//!
//! Every link owns a reader thread forwarding the player's lines into the dealer's single event
//! queue, so the dealer only ever blocks on one receiver. An [`EarlyStop`] pushes into that
//! same queue and therefore interrupts any wait.

use std::io::{BufReader, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use tracing::{debug, instrument, trace, warn};

use crate::protocol::{self, SessionState};

/// Something happening on one of the links, or an external stop request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Line { player: usize, line: String },
    Closed { player: usize },
    Interrupt,
}

/// Handle requesting the dealer to end the game early.
///
/// Every player still connected is sent `EARLY` and the dealer waits for all sessions to close.
#[derive(Debug, Clone)]
pub struct EarlyStop(pub(crate) Sender<Event>);

impl EarlyStop {
    /// Returns false if the dealer already stopped.
    pub fn trigger(&self) -> bool {
        self.0.send(Event::Interrupt).is_ok()
    }
}

pub(crate) struct PlayerLink {
    pub(crate) player: usize,
    pub(crate) state: SessionState,
    /// Set once the player's stream reached its end.
    pub(crate) closed: bool,
    writer: Option<Box<dyn Write + Send>>,
    reader_thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PlayerLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerLink")
            .field("player", &self.player)
            .field("state", &self.state)
            .field("closed", &self.closed)
            .finish()
    }
}

impl PlayerLink {
    /// Starts forwarding lines read from `reader` to `events`.
    #[instrument(skip_all, fields(player = player))]
    pub(crate) fn open(
        player: usize,
        reader: Box<dyn Read + Send>,
        writer: Box<dyn Write + Send>,
        events: Sender<Event>,
    ) -> anyhow::Result<PlayerLink> {
        let reader_thread = thread::Builder::new()
            .name(format!("player-{player}-reader"))
            .spawn(move || forward_lines(player, reader, events))
            .context("could not spawn reader thread")?;

        Ok(PlayerLink {
            player,
            state: SessionState::AwaitingPath,
            closed: false,
            writer: Some(writer),
            reader_thread: Some(reader_thread),
        })
    }

    /// Splits a TCP stream into the two ends of a link.
    pub(crate) fn tcp_ends(
        stream: TcpStream,
    ) -> anyhow::Result<(Box<dyn Read + Send>, Box<dyn Write + Send>)> {
        let reader = stream
            .try_clone()
            .context("could not clone player stream")?;
        Ok((Box::new(reader), Box::new(TcpWriter(stream))))
    }

    /// True while messages can still be sent to the player.
    pub(crate) fn is_writable(&self) -> bool {
        self.writer.is_some()
    }

    pub(crate) fn send(&mut self, message: &impl std::fmt::Display) -> std::io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "link already shut down")
        })?;
        trace!(player = self.player, %message, "send");
        protocol::send_line(writer, message)
    }

    /// Stops writing to the player. For pipes this closes the player's input.
    pub(crate) fn shut_down(&mut self) {
        if self.writer.take().is_some() {
            debug!(player = self.player, "link shut down");
        }
        self.state = SessionState::Finished;
    }
}

impl Drop for PlayerLink {
    fn drop(&mut self) {
        self.writer.take();
        if let Some(handle) = self.reader_thread.take() {
            // the reader only ends with its stream, do not wait for streams still open
            if handle.is_finished() && handle.join().is_err() {
                warn!(player = self.player, "reader thread panicked");
            }
        }
    }
}

/// Write half of a TCP link. Dropping it closes the player's input even though the reader
/// thread still holds a clone of the stream.
struct TcpWriter(TcpStream);

impl Write for TcpWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

impl Drop for TcpWriter {
    fn drop(&mut self) {
        let _ = self.0.shutdown(Shutdown::Write);
    }
}

fn forward_lines(player: usize, reader: Box<dyn Read + Send>, events: Sender<Event>) {
    let mut reader = BufReader::new(reader);
    loop {
        match protocol::read_line(&mut reader) {
            Ok(Some(line)) => {
                trace!(player, %line, "received");
                if events.send(Event::Line { player, line }).is_err() {
                    return;
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(player, "read error: {e}");
                break;
            }
        }
    }
    let _ = events.send(Event::Closed { player });
}

#[cfg(test)]
mod link_tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn forwards_lines_then_close() {
        let (tx, rx) = mpsc::channel();
        let input: &'static [u8] = b"^\nDO3\n";
        let mut link = PlayerLink::open(4, Box::new(input), Box::new(Vec::new()), tx).unwrap();

        assert_eq!(
            rx.recv().unwrap(),
            Event::Line {
                player: 4,
                line: "^".to_owned()
            }
        );
        assert_eq!(
            rx.recv().unwrap(),
            Event::Line {
                player: 4,
                line: "DO3".to_owned()
            }
        );
        assert_eq!(rx.recv().unwrap(), Event::Closed { player: 4 });

        assert!(link.is_writable());
        link.send(&"YT").unwrap();
        link.shut_down();
        assert!(!link.is_writable());
        assert!(link.send(&"YT").is_err());
        assert_eq!(link.state, SessionState::Finished);
    }

    #[test]
    fn early_stop_reaches_queue() {
        let (tx, rx) = mpsc::channel();
        let stop = EarlyStop(tx);
        assert!(stop.trigger());
        assert_eq!(rx.recv().unwrap(), Event::Interrupt);
        drop(rx);
        assert!(!stop.trigger());
    }
}
