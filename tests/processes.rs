use std::process::Command;

use barrier_race::prelude::*;

mod common;
use common::*;

const PLAYER_EXE: &str = env!("CARGO_BIN_EXE_race-player");
const DEALER_EXE: &str = env!("CARGO_BIN_EXE_race-dealer");

#[test]
fn dealer_drives_player_processes() {
    init_test_logger();
    let players = 3;
    let mut dealer = new_dealer(players);
    let mut processes = vec![];
    for id in 0..players {
        let args = [players.to_string(), id.to_string()];
        let mut process = PlayerProcess::launch(PLAYER_EXE, &args, false).unwrap();
        let (reader, writer) = process.take_io().unwrap();
        dealer.seat(reader, writer).unwrap();
        processes.push(process);
    }

    match dealer.run().unwrap() {
        GameOutcome::Finished(scores) => assert_eq!(scores.0.len(), players),
        other => panic!("unexpected outcome {other:?}"),
    }
    for mut process in processes {
        process.try_kill(std::time::Duration::from_secs(2)).unwrap();
        assert!(process.child.wait().unwrap().success());
    }
}

#[test]
fn player_binary_rejects_bad_arguments() {
    let status = Command::new(PLAYER_EXE)
        .args(["2", "5"])
        .output()
        .unwrap()
        .status;
    assert!(!status.success());
}

#[test]
fn dealer_binary_prints_scores() {
    let dir = std::env::temp_dir().join(format!("barrier-race-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let deck = dir.join("deck.txt");
    let path = dir.join("path.txt");
    std::fs::write(&deck, format!("{DECK}\n")).unwrap();
    std::fs::write(&path, format!("{PATH}\n")).unwrap();

    let output = Command::new(DEALER_EXE)
        .arg(&deck)
        .arg(&path)
        .args([PLAYER_EXE, PLAYER_EXE])
        .env("RACE_VERBOSE", "true")
        .env("RACE_STRATEGY", "b")
        .output()
        .unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let scores = stdout.trim().strip_prefix("Scores: ").unwrap();
    assert_eq!(scores.split(',').count(), 2);
    assert!(scores.split(',').all(|s| s.parse::<i64>().is_ok()));
}

#[cfg(unix)]
#[test]
fn dealer_binary_stops_early_on_hangup() {
    use std::os::unix::fs::PermissionsExt;
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    let dir = std::env::temp_dir().join(format!("barrier-race-hup-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let deck = dir.join("deck.txt");
    let path = dir.join("path.txt");
    std::fs::write(&deck, DECK).unwrap();
    std::fs::write(&path, PATH).unwrap();

    // never asks for the path; marks itself started, then echoes until its input closes
    let player = dir.join("silent-player.sh");
    std::fs::write(&player, "#!/bin/sh\ntouch \"$0.started.$2\"\nexec cat\n").unwrap();
    std::fs::set_permissions(&player, std::fs::Permissions::from_mode(0o755)).unwrap();

    let dealer = Command::new(DEALER_EXE)
        .arg(&deck)
        .arg(&path)
        .args([&player, &player])
        .env("RACE_VERBOSE", "true")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    // players are launched once the signal handler is in place
    let started = |id: usize| dir.join(format!("silent-player.sh.started.{id}")).exists();
    let deadline = Instant::now() + Duration::from_secs(10);
    while !(started(0) && started(1)) {
        assert!(Instant::now() < deadline, "players never started");
        std::thread::sleep(Duration::from_millis(20));
    }

    let status = Command::new("kill")
        .args(["-HUP", &dealer.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let output = dealer.wait_with_output().unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "game stopped early\n");
}
