//! Terminal progress output

use colored::*;
use std::sync::Mutex;
use studio_core::domain::progress::ProgressUpdate;
use studio_poller::ProgressSink;

const BAR_WIDTH: usize = 20;

/// Prints poller progress as one line per round
///
/// Single-job updates are only printed when the status message changes.
#[derive(Default)]
pub struct TerminalProgress {
    last_message: Mutex<Option<&'static str>>,
}

impl ProgressSink for TerminalProgress {
    fn report(&self, update: &ProgressUpdate) {
        match update {
            ProgressUpdate::RoundStarted(_) => {}
            ProgressUpdate::RoundFinished(p) => {
                println!(
                    "  {} {} {} {}",
                    "▸".cyan(),
                    bar(p.percent).cyan(),
                    p.text(),
                    format!("(round {}/{}, {} failed)", p.round, p.max_rounds, p.failed).dimmed()
                );
            }
            ProgressUpdate::Single(p) => {
                let mut last = match self.last_message.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if *last != Some(p.message) {
                    *last = Some(p.message);
                    println!("  {} {} {}", "▸".cyan(), bar(p.percent).cyan(), p.text());
                }
            }
        }
    }
}

/// Fixed-width text progress bar
fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.0), format!("[{}]", "-".repeat(20)));
        assert_eq!(bar(50.0), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(bar(150.0), format!("[{}]", "#".repeat(20)));
    }
}
