use crate::dom::Host;
use std::io::{self, BufRead, Write};

/// Window effects for a terminal session: alerts go to stderr, confirms
/// prompt on stdin, reloads and navigation are logged.
pub struct TerminalHost {
    assume_yes: bool,
    alerts: usize,
}

impl TerminalHost {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            alerts: 0,
        }
    }

    /// Number of alerts raised so far; any alert means the command failed.
    pub fn alerts(&self) -> usize {
        self.alerts
    }
}

impl Host for TerminalHost {
    fn alert(&mut self, message: &str) {
        self.alerts += 1;
        eprintln!("{message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            tracing::debug!(%message, "Confirmed by --yes");
            return true;
        }

        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(err) => {
                tracing::warn!("Unable to read confirmation: {err}");
                false
            }
        }
    }

    fn reload(&mut self) {
        tracing::info!("Page reload requested");
    }

    fn navigate(&mut self, url: &str) {
        tracing::info!(%url, "Navigation requested");
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn assume_yes_skips_prompt_and_alerts_are_counted() {
        let mut host = TerminalHost::new(true);
        assert!(host.confirm("Delete?"));
        host.alert("Error deleting rule: gone");
        assert_eq!(host.alerts(), 1);
    }
}
