//! Terminal progress bars for pipeline stages.

use indicatif::{ProgressBar, ProgressStyle};

use eicu_core::Progress;

const STAGE_TEMPLATE: &str =
    "{spinner:.green} {msg:<8} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len}";

/// Draws one bar per stage on stderr, or nothing when disabled.
#[derive(Debug)]
pub struct TerminalProgress {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

fn stage_style() -> ProgressStyle {
    ProgressStyle::with_template(STAGE_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl Progress for TerminalProgress {
    fn start(&mut self, stage: &str, total: u64) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        let bar = if self.enabled {
            let bar = ProgressBar::new(total);
            bar.set_style(stage_style());
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(stage.to_string());
        self.bar = Some(bar);
    }

    fn advance(&mut self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_progress_accepts_updates() {
        let mut progress = TerminalProgress::new(false);
        progress.start("encode", 3);
        progress.advance(2);
        progress.finish();
        progress.finish();
        assert!(!progress.is_enabled());
    }
}
