use std::io::{Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Stdio};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use tracing::{debug, warn};

/// A player program started by the dealer, talking over its stdin/stdout.
#[derive(Debug)]
pub struct PlayerProcess {
    pub child: Child,
    cleaned_up: bool,
}

fn create_process(command: &str, args: &[String], allow_stderr: bool) -> anyhow::Result<Child> {
    let mut cmd = std::process::Command::new(command);
    cmd.args(args).stdin(Stdio::piped()).stdout(Stdio::piped());
    if !allow_stderr {
        cmd.stderr(Stdio::null());
    }
    cmd.spawn()
        .with_context(|| format!("command '{command}' not found"))
}

impl PlayerProcess {
    pub fn launch(command: &str, args: &[String], allow_stderr: bool) -> anyhow::Result<Self> {
        let child =
            create_process(command, args, allow_stderr).context("could not create process")?;
        debug!(pid = child.id(), command, ?args, "player process started");
        Ok(PlayerProcess {
            child,
            cleaned_up: false,
        })
    }

    /// Hands out the pipes, to be seated at the dealer. Only succeeds once.
    pub fn take_io(
        &mut self,
    ) -> anyhow::Result<(Box<dyn Read + Send>, Box<dyn Write + Send>)> {
        let stdout: ChildStdout = self.child.stdout.take().context("stdout already taken")?;
        let stdin: ChildStdin = self.child.stdin.take().context("stdin already taken")?;
        Ok((Box::new(stdout), Box::new(stdin)))
    }

    /// Waits up to `max_duration` for the program to exit, then kills it.
    pub fn try_kill(&mut self, max_duration: Duration) -> anyhow::Result<()> {
        let start = Instant::now();
        loop {
            match self.child.try_wait().context("could not poll process")? {
                Some(status) => {
                    debug!(pid = self.child.id(), %status, "player process exited");
                    self.cleaned_up = true;
                    return Ok(());
                }
                None if start.elapsed() >= max_duration => break,
                None => std::thread::sleep(Duration::from_millis(10)),
            }
        }
        warn!(pid = self.child.id(), "player process still running, killing it");
        self.child.kill().context("could not kill process")?;
        if self.child.wait().is_err() {
            bail!("could not reap process {}", self.child.id());
        }
        self.cleaned_up = true;
        Ok(())
    }
}

impl Drop for PlayerProcess {
    fn drop(&mut self) {
        static CLEANUP_DURATION: Duration = Duration::from_secs(1);
        if !self.cleaned_up {
            if let Err(e) = self.try_kill(CLEANUP_DURATION) {
                warn!("could not clean up player process on drop: {e}");
            }
        }
    }
}

#[cfg(all(test, unix))]
mod process_tests {
    use std::io::{BufRead, BufReader};

    use super::*;

    #[test]
    fn pipes_reach_the_program() {
        let mut process = PlayerProcess::launch("cat", &[], false).unwrap();
        let (reader, mut writer) = process.take_io().unwrap();
        writeln!(writer, "YT").unwrap();
        drop(writer);
        let mut line = String::new();
        BufReader::new(reader).read_line(&mut line).unwrap();
        assert_eq!(line, "YT\n");
        assert!(process.take_io().is_err());
        process.try_kill(Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn missing_program_is_an_error() {
        assert!(PlayerProcess::launch("./does-not-exist-race-player", &[], false).is_err());
    }
}
