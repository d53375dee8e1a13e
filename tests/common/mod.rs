#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::JoinHandle;
use std::time::Duration;

use barrier_race::prelude::*;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub const PATH: &str = "12;::-Mo1V11Do1Ri2V22::-Mo2V11Ri1V21::-";
pub const DECK: &str = "5ABCDE";

pub fn init_test_logger() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_ansi(true)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn new_dealer(players: usize) -> Dealer {
    let path = parse_path(PATH, players).unwrap();
    let config = Configuration::new().with_shutdown_timeout(Duration::from_secs(2));
    Dealer::new(path, DECK.parse().unwrap(), config).unwrap()
}

/// Seats `players` on the dealer, each connected over loopback TCP and driven by `play`.
pub fn seat_tcp_players<T, F>(dealer: &mut Dealer, players: usize, play: F) -> Vec<JoinHandle<T>>
where
    T: Send + 'static,
    F: Fn(usize, TcpStream) -> T + Send + Clone + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    (0..players)
        .map(|id| {
            let play = play.clone();
            let handle = std::thread::spawn(move || {
                let stream = TcpStream::connect(addr).unwrap();
                play(id, stream)
            });
            let (stream, _) = listener.accept().unwrap();
            assert_eq!(dealer.seat_tcp(stream).unwrap(), id);
            handle
        })
        .collect()
}

/// Plays a real session with the given strategy.
pub fn play_session(
    id: usize,
    players: usize,
    strategy: StrategyKind,
    stream: TcpStream,
) -> Result<PlayerOutcome, SessionError> {
    let mut session = PlayerSession::new(id, players, strategy.build()).unwrap();
    let reader = BufReader::new(stream.try_clone().unwrap());
    session.run(reader, stream)
}

/// Hand driven player end of a TCP link.
pub struct ScriptedPlayer {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl ScriptedPlayer {
    pub fn new(stream: TcpStream) -> Self {
        ScriptedPlayer {
            reader: BufReader::new(stream.try_clone().unwrap()),
            writer: stream,
        }
    }

    pub fn send(&mut self, line: &str) {
        writeln!(self.writer, "{line}").unwrap();
    }

    /// Next line without its line break, `None` at the end of the stream.
    pub fn receive(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end().to_owned()),
        }
    }

    /// Everything left until the dealer hangs up.
    pub fn drain(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.receive()).collect()
    }
}
