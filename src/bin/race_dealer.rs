//! `race-dealer <deck-file> <path-file> <player-program>...`
//!
//! Starts one process per player program (called as `<program> <playerCount> <playerId>`) and
//! deals a game between them over their stdin/stdout. `SIGHUP`, or typing `EARLY` on the
//! dealer's stdin, stops the game early.

use std::io::BufRead;

use anyhow::{bail, Context};

use barrier_race::prelude::*;
use barrier_race::protocol::DealerMessage;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: race-dealer <deck-file> <path-file> <player-program>...";
    let deck_file = args.next().context(usage)?;
    let path_file = args.next().context(usage)?;
    let programs = args.collect::<Vec<_>>();
    if programs.is_empty() {
        bail!("{usage}");
    }

    let config = Configuration::from_env();
    let deck = std::fs::read_to_string(&deck_file)
        .with_context(|| format!("could not read {deck_file}"))?
        .parse::<Deck>()?;
    let path_text =
        std::fs::read_to_string(&path_file).with_context(|| format!("could not read {path_file}"))?;
    let path = parse_path(path_text.trim_end(), programs.len())?;

    let mut dealer = Dealer::new(path, deck, config)?;
    #[cfg(unix)]
    stop_on_hangup(dealer.early_stop())?;

    let mut processes = vec![];
    for (id, program) in programs.iter().enumerate() {
        let args = [programs.len().to_string(), id.to_string()];
        let mut process = PlayerProcess::launch(program, &args, config.debug_player_stderr())?;
        let (reader, writer) = process.take_io()?;
        dealer.seat(reader, writer)?;
        processes.push(process);
    }

    let early_stop = dealer.early_stop();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines().map_while(Result::ok) {
            if line.trim() == DealerMessage::Early.to_string() {
                early_stop.trigger();
                return;
            }
        }
    });

    let outcome = dealer.run()?;
    for mut process in processes {
        process.try_kill(std::time::Duration::from_millis(100))?;
    }

    match outcome {
        GameOutcome::Finished(scores) => {
            if config.verbose() {
                println!("{scores}");
            }
            Ok(())
        }
        GameOutcome::Terminated => {
            if config.verbose() {
                println!("game stopped early");
            }
            Ok(())
        }
        GameOutcome::Aborted { player, reason } => {
            Err(anyhow::Error::new(reason)
                .context(format!("game aborted by player {player} ({})", programs[player])))
        }
    }
}

/// Triggers `early_stop` on the first `SIGHUP`.
#[cfg(unix)]
fn stop_on_hangup(early_stop: EarlyStop) -> anyhow::Result<()> {
    use signal_hook::{consts::SIGHUP, iterator::Signals};

    let mut signals = Signals::new([SIGHUP]).context("could not register SIGHUP handler")?;
    std::thread::Builder::new()
        .name("sighup".to_owned())
        .spawn(move || {
            if signals.forever().next().is_some() {
                tracing::info!("SIGHUP received, stopping early");
                early_stop.trigger();
            }
        })
        .context("could not spawn signal thread")?;
    Ok(())
}
