/// Outcome counters returned by every batch stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct StageStats {
    /// Number of output buffers written.
    pub written: usize,
    /// Number of items skipped at the item boundary.
    pub skipped: usize,
}

impl StageStats {
    /// Record one successfully written output.
    pub(crate) fn note_written(&mut self) {
        self.written += 1;
    }

    /// Record one skipped item.
    pub(crate) fn note_skipped(&mut self) {
        self.skipped += 1;
    }
}
