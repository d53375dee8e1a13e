//! `race-player <playerCount> <playerId>`
//!
//! Plays one game against a dealer talking over stdin/stdout. The strategy is selected with
//! `RACE_STRATEGY`. Final scores go to stderr, stdout belongs to the dealer.

use anyhow::Context;

use barrier_race::logger::init_logger;
use barrier_race::prelude::*;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: race-player <playerCount> <playerId>";
    let player_count: usize = args.next().context(usage)?.parse().context(usage)?;
    let id: usize = args.next().context(usage)?.parse().context(usage)?;

    let config = Configuration::from_env();
    if config.log() {
        init_logger(&format!("player-{id}"))?;
    }

    let mut session = PlayerSession::new(id, player_count, config.strategy().build())?;
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    match session.run(stdin, stdout)? {
        PlayerOutcome::Finished(scores) if config.verbose() => eprintln!("player {id}: {scores}"),
        _ => {}
    }
    Ok(())
}
