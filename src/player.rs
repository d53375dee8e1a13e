//! Player side of a game.
//!
//! A [`PlayerSession`] asks for the path, keeps its own copy of the game in sync with the
//! dealer's broadcasts and answers every `YT` with the site chosen by its [`Strategy`].

use std::io::{BufRead, Write};

use anyhow::ensure;
use tracing::{debug, info, instrument, warn};

use crate::economy::Scoreboard;
use crate::error::{ProtocolFault, SessionError};
use crate::game_state::GameState;
use crate::path::parse_path;
use crate::protocol::{read_line, send_line, DealerMessage, PlayerMessage, SessionState};
use crate::strategy::{plan_move, Strategy};

/// How a game ended, from a player's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerOutcome {
    /// Final scores computed from this player's own copy of the game.
    Finished(Scoreboard),
    /// The dealer sent `EARLY`. No score is reported.
    Terminated,
}

pub struct PlayerSession {
    id: usize,
    player_count: usize,
    strategy: Box<dyn Strategy>,
    state: SessionState,
    /// Site requested by the last `DO`, until the dealer confirms it.
    pending: Option<usize>,
}

impl PlayerSession {
    pub fn new(
        id: usize,
        player_count: usize,
        strategy: Box<dyn Strategy>,
    ) -> anyhow::Result<PlayerSession> {
        ensure!(player_count > 0, "a game needs at least one player");
        ensure!(
            id < player_count,
            "player id {id} out of range (player count {player_count})"
        );
        Ok(PlayerSession {
            id,
            player_count,
            strategy,
            state: SessionState::AwaitingPath,
            pending: None,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Plays one game over the given channel ends, until `DONE`, `EARLY` or a fault.
    #[instrument(skip_all, fields(player = self.id, strategy = self.strategy.name()))]
    pub fn run(
        &mut self,
        mut reader: impl BufRead,
        mut writer: impl Write,
    ) -> Result<PlayerOutcome, SessionError> {
        let result = self.play(&mut reader, &mut writer);
        self.state = SessionState::Finished;
        match &result {
            Ok(outcome) => info!(?outcome, "session over"),
            Err(e) => warn!("session failed: {e}"),
        }
        result
    }

    fn play(
        &mut self,
        reader: &mut impl BufRead,
        writer: &mut impl Write,
    ) -> Result<PlayerOutcome, SessionError> {
        send_line(writer, &PlayerMessage::PathRequest)?;
        let line = Self::receive(reader)?;
        if line == DealerMessage::Early.to_string() {
            return Ok(PlayerOutcome::Terminated);
        }
        let path = parse_path(&line, self.player_count)?;
        info!(path = %path.names(), "path received");
        let mut game = GameState::new(path);
        self.state = SessionState::Idle;

        loop {
            let line = Self::receive(reader)?;
            match line.parse::<DealerMessage>()? {
                DealerMessage::YourTurn if self.state == SessionState::Idle => {
                    match plan_move(self.strategy.as_ref(), &game, self.id) {
                        Some(site) => {
                            debug!(site, "moving");
                            send_line(writer, &PlayerMessage::Move(site))?;
                            self.pending = Some(site);
                            self.state = SessionState::AwaitingMoveResponse;
                        }
                        None => warn!("no site to move to, passing"),
                    }
                }
                DealerMessage::Happened(broadcast) => {
                    if broadcast.player == self.id {
                        if self.pending != Some(broadcast.site) {
                            return Err(self.unexpected(line));
                        }
                        self.pending = None;
                        self.state = SessionState::Idle;
                    }
                    game.apply_broadcast(&broadcast)?;
                }
                DealerMessage::Early => return Ok(PlayerOutcome::Terminated),
                DealerMessage::Done => return Ok(PlayerOutcome::Finished(game.scoreboard())),
                DealerMessage::YourTurn => return Err(self.unexpected(line)),
            }
        }
    }

    fn receive(reader: &mut impl BufRead) -> Result<String, SessionError> {
        read_line(reader)?.ok_or_else(|| ProtocolFault::ChannelClosed.into())
    }

    fn unexpected(&self, line: String) -> SessionError {
        ProtocolFault::Unexpected {
            line,
            state: self.state.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod player_tests {
    use super::*;
    use crate::strategy::StrategyKind;

    fn session(id: usize, players: usize) -> PlayerSession {
        PlayerSession::new(id, players, StrategyKind::Cascade.build()).unwrap()
    }

    fn run_scripted(
        session: &mut PlayerSession,
        input: &str,
    ) -> (Result<PlayerOutcome, SessionError>, String) {
        let mut output = Vec::new();
        let result = session.run(input.as_bytes(), &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(PlayerSession::new(2, 2, StrategyKind::Convert.build()).is_err());
        assert!(PlayerSession::new(0, 0, StrategyKind::Convert.build()).is_err());
    }

    #[test]
    fn plays_a_scripted_game() {
        let mut player = session(0, 1);
        let (result, output) = run_scripted(
            &mut player,
            "4;::-Mo1V11::-\nYT\nHAP0,1,0,3,0\nYT\nHAP0,2,0,0,0\nYT\nHAP0,3,0,0,0\nDONE\n",
        );
        assert_eq!(result.unwrap(), PlayerOutcome::Finished(Scoreboard(vec![1])));
        assert_eq!(output, "^\nDO1\nDO2\nDO3\n");
        assert_eq!(player.state(), SessionState::Finished);
    }

    #[test]
    fn early_stop_before_path() {
        let (result, output) = run_scripted(&mut session(1, 2), "EARLY\n");
        assert_eq!(result.unwrap(), PlayerOutcome::Terminated);
        assert_eq!(output, "^\n");
    }

    #[test]
    fn early_stop_mid_game() {
        let (result, _) = run_scripted(&mut session(1, 2), "4;::-Mo1V11::-\nHAP0,1,0,3,0\nEARLY\n");
        assert_eq!(result.unwrap(), PlayerOutcome::Terminated);
    }

    #[test]
    fn faults_end_the_session() {
        let (result, _) = run_scripted(&mut session(0, 1), "4;::-Mo1V11::-\nYT\nYT\n");
        assert!(matches!(
            result,
            Err(SessionError::Protocol(ProtocolFault::Unexpected { .. }))
        ));

        let (result, _) = run_scripted(&mut session(0, 1), "4;::-Mo1V11::-\nHAP3,1,0,0,0\n");
        assert!(matches!(
            result,
            Err(SessionError::Protocol(ProtocolFault::PlayerOutOfRange { .. }))
        ));

        let (result, _) = run_scripted(&mut session(0, 1), "4;::-Mo1V11::-\nYT\n");
        assert!(matches!(
            result,
            Err(SessionError::Protocol(ProtocolFault::ChannelClosed))
        ));

        let (result, _) = run_scripted(&mut session(0, 1), "4;Mo1Mo1Mo1Mo1\n");
        assert!(matches!(result, Err(SessionError::Malformed(_))));
    }
}
