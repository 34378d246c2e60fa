//! Line-based confirmation gate
//!
//! [`PromptGate`] writes a prompt, reads one line and treats only `y` or
//! `yes` (any case, surrounding whitespace ignored) as approval. Empty
//! input, end of input and read errors all decline.

use std::io::{BufRead, BufReader, Stderr, Stdin, Write};
use std::sync::Mutex;

use tracing::{debug, warn};

use nib_core::ports::confirmation::IConfirmation;

/// Whether `answer` approves the operation
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Confirmation gate over an arbitrary reader/writer pair
pub struct PromptGate<R, W> {
    io: Mutex<(R, W)>,
}

impl<R, W> PromptGate<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }
}

/// Gate reading from stdin and prompting on stderr
///
/// Prompts go to stderr so that stdout stays clean for `--json` output.
pub fn stdin_gate() -> PromptGate<BufReader<Stdin>, Stderr> {
    PromptGate::new(BufReader::new(std::io::stdin()), std::io::stderr())
}

impl<R, W> IConfirmation for PromptGate<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&self, prompt: &str, count: usize) -> bool {
        let Ok(mut guard) = self.io.lock() else {
            warn!("Confirmation gate poisoned, declining");
            return false;
        };
        let (reader, writer) = &mut *guard;

        let shown = write!(writer, "{prompt} ({count} files) [y/N]: ").and_then(|()| writer.flush());
        if let Err(err) = shown {
            warn!(%err, "Failed to show confirmation prompt, declining");
            return false;
        }

        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                debug!("End of input at confirmation prompt, declining");
                false
            }
            Ok(_) => is_affirmative(&line),
            Err(err) => {
                warn!(%err, "Failed to read confirmation, declining");
                false
            }
        }
    }
}
