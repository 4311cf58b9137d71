//! Terminal progress bars for the fetch phases.

use std::io::IsTerminal;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_TEMPLATE: &str = "{prefix:>14} [{bar:30}] {pos}/{len} {msg}";

/// Hands out one bar per phase. Disabled instances only produce hidden bars.
#[derive(Clone)]
pub struct Progress {
    multi: Option<MultiProgress>,
}

impl Progress {
    /// Visible when `enabled` and stderr is a terminal.
    pub fn new(enabled: bool) -> Self {
        let multi = (enabled && std::io::stderr().is_terminal())
            .then(|| MultiProgress::with_draw_target(ProgressDrawTarget::stderr()));
        Self { multi }
    }

    pub fn disabled() -> Self {
        Self { multi: None }
    }

    pub fn is_visible(&self) -> bool {
        self.multi.is_some()
    }

    /// A bar of `len` steps labelled `prefix`.
    pub fn bar(&self, prefix: &str, len: usize) -> ProgressBar {
        let Some(multi) = &self.multi else {
            return ProgressBar::hidden();
        };

        let bar = multi.add(ProgressBar::new(len as u64));
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_prefix(prefix.to_string());
        bar
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_bars_are_hidden() {
        let progress = Progress::new(false);
        assert!(!progress.is_visible());
        let bar = progress.bar("eth", 3);
        assert!(bar.is_hidden());
        bar.inc(3);
        bar.finish_and_clear();
    }
}
