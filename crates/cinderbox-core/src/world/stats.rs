//! Simulation statistics collection trait

/// Trait for collecting simulation statistics
///
/// Passes report through this seam so callers can aggregate counters
/// without the core depending on a collector implementation.
pub trait SimStats {
    /// Record cells rearranged by the automaton this generation
    fn record_cells_moved(&mut self, count: usize);

    /// Record temperature-driven material transforms this pass
    fn record_state_changes(&mut self, count: usize);

    /// Record a grid cell ejected into the dynamic buffer
    fn record_extraction(&mut self);

    /// Record a dynamic particle written back into the grid
    fn record_reintegration(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl SimStats for NoopStats {
    fn record_cells_moved(&mut self, _count: usize) {}
    fn record_state_changes(&mut self, _count: usize) {}
    fn record_extraction(&mut self) {}
    fn record_reintegration(&mut self) {}
}
