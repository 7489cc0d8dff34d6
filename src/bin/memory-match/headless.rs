//! Headless mode.
//!
//! A line protocol for scripts and automated play. Each line on stdin is one
//! command:
//!
//! - `start`, `restart`, `switch`
//! - `flip N` where `N` is a zero-based card position
//! - `quit`
//!
//! Every published snapshot is written to stdout as one JSON line, starting
//! with the initial one. Bad input is reported on stderr and the session
//! carries on. On `quit` or end of input, commands already read still run and
//! their snapshots are written before the program exits.

use anyhow::Result;
use memory_match::{runtime, CardIndex, Command, SessionController, Snapshot};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Quit,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'flip' needs a card position")]
    MissingPosition,

    #[error("invalid card position '{0}'")]
    BadPosition(String),

    #[error("unexpected argument '{0}'")]
    TrailingArgument(String),
}

pub fn parse_command(line: &str) -> Result<Input, InputError> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(Input::Blank);
    };

    let input = match word.to_ascii_lowercase().as_str() {
        "start" => Input::Command(Command::Start),
        "restart" => Input::Command(Command::Restart),
        "switch" => Input::Command(Command::SwitchTurn),
        "quit" | "exit" => Input::Quit,
        "flip" => {
            let arg = parts.next().ok_or(InputError::MissingPosition)?;
            let position = arg
                .parse::<u16>()
                .map_err(|_| InputError::BadPosition(arg.to_string()))?;
            Input::Command(Command::Flip(CardIndex::new(position)))
        }
        other => return Err(InputError::Unknown(other.to_string())),
    };

    match parts.next() {
        Some(extra) => Err(InputError::TrailingArgument(extra.to_string())),
        None => Ok(input),
    }
}

/// Run a session driven by stdin until `quit` or end of input.
pub async fn run(controller: SessionController) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run_with(controller, input, tokio::io::stdout()).await?;
    Ok(())
}

/// Run a session reading commands from `input` and writing snapshots to
/// `output`. Returns the controller once input ends.
///
/// Snapshots are taken from an observer on the controller, not the handle's
/// watch channel, so every change is written even when commands arrive
/// faster than they can be printed.
pub async fn run_with<R, W>(
    mut controller: SessionController,
    input: R,
    mut output: W,
) -> Result<SessionController>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    controller.subscribe(move |snapshot: &Snapshot| {
        // Nobody left to print for once the runner has returned.
        let _ = updates_tx.send(snapshot.clone());
    });

    let handle = runtime::spawn(controller);
    let mut lines = input.lines();
    info!("Headless session started");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Input::Command(command)) => handle.send(command).await?,
                    Ok(Input::Quit) => break,
                    Ok(Input::Blank) => {}
                    Err(e) => {
                        warn!(line = %line.trim(), "Rejected input");
                        eprintln!("error: {e}");
                    }
                }
            }

            Some(snapshot) = updates.recv() => emit(&mut output, &snapshot).await?,
        }
    }

    let controller = handle.close().await?;
    while let Ok(snapshot) = updates.try_recv() {
        emit(&mut output, &snapshot).await?;
    }

    info!(phase = ?controller.state().phase(), "Headless session finished");
    Ok(controller)
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, snapshot: &Snapshot) -> Result<()> {
    let mut line = serde_json::to_vec(snapshot)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_match::{Phase, PlayerId, SessionConfig};

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("start"), Ok(Input::Command(Command::Start)));
        assert_eq!(parse_command("  RESTART "), Ok(Input::Command(Command::Restart)));
        assert_eq!(parse_command("switch"), Ok(Input::Command(Command::SwitchTurn)));
        assert_eq!(parse_command("quit"), Ok(Input::Quit));
        assert_eq!(parse_command(""), Ok(Input::Blank));
        assert_eq!(
            parse_command("flip 12"),
            Ok(Input::Command(Command::Flip(CardIndex::new(12))))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("flip"), Err(InputError::MissingPosition));
        assert_eq!(
            parse_command("flip -1"),
            Err(InputError::BadPosition("-1".to_string()))
        );
        assert_eq!(
            parse_command("flip 1 2"),
            Err(InputError::TrailingArgument("2".to_string()))
        );
        assert_eq!(
            parse_command("dance"),
            Err(InputError::Unknown("dance".to_string()))
        );
    }

    fn session(values: Vec<u8>) -> SessionController {
        SessionController::new(SessionConfig::default().with_fixed_deck(values)).unwrap()
    }

    fn emitted(output: &[u8]) -> Vec<Snapshot> {
        output
            .split(|&b| b == b'\n')
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_slice(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_every_change_is_written() {
        let input: &[u8] = b"start\nflip 0\nflip 2\nflip 1\n";
        let mut output = Vec::new();

        let controller = run_with(session(vec![1, 2, 1, 2]), input, &mut output)
            .await
            .unwrap();

        let snapshots = emitted(&output);
        assert_eq!(snapshots.len(), 5);
        assert_eq!(snapshots[0].phase, Phase::NotStarted);
        assert_eq!(snapshots[1].phase, Phase::InProgress);
        assert_eq!(snapshots[2].flipped.as_slice(), &[CardIndex::new(0)]);
        assert_eq!(snapshots[3].matched.len(), 2);
        assert_eq!(snapshots[4].flipped.as_slice(), &[CardIndex::new(1)]);
        assert_eq!(controller.state().scores()[PlayerId::ONE], 1);
    }

    #[tokio::test]
    async fn test_ignored_and_bad_lines_write_nothing() {
        let input: &[u8] = b"start\n\nflip 0\nflip 0\ndance\nflip 99\nquit\nflip 1\n";
        let mut output = Vec::new();

        run_with(session(vec![1, 2, 1, 2]), input, &mut output)
            .await
            .unwrap();

        // initial, start, one accepted flip; everything after quit is unread
        let snapshots = emitted(&output);
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[2].flipped.as_slice(), &[CardIndex::new(0)]);
    }
}
