//! Progress reporting hooks for long-running stages.

/// Receives progress from pipeline stages.
///
/// Implementations decide how (or whether) to render it; the library only
/// ever calls these methods and logs through `tracing`.
pub trait Progress {
    /// A new stage begins with `total` units of work.
    fn start(&mut self, stage: &str, total: u64);
    fn advance(&mut self, delta: u64);
    fn finish(&mut self);
}

/// Discards all progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&mut self, _stage: &str, _total: u64) {}
    fn advance(&mut self, _delta: u64) {}
    fn finish(&mut self) {}
}

/// Records every call; useful for asserting on stage boundaries.
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    pub stages: Vec<(String, u64)>,
    pub advanced: u64,
    pub finished: usize,
}

impl Progress for RecordingProgress {
    fn start(&mut self, stage: &str, total: u64) {
        self.stages.push((stage.to_string(), total));
    }

    fn advance(&mut self, delta: u64) {
        self.advanced += delta;
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}
