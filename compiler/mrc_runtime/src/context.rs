//! Runtime configuration passed to every compiled statement.

/// Sequences shorter than this are processed sequentially even in
/// parallel mode.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// How `map` and `reduce` traverse sequences.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ExecMode {
    /// One thread, left to right.
    #[default]
    Sequential,
    /// Spread over the rayon pool once a sequence has `min_len` elements.
    Parallel { min_len: usize },
}

#[derive(Clone, Debug, Default)]
pub struct RuntimeContext {
    mode: ExecMode,
}

impl RuntimeContext {
    pub fn sequential() -> Self {
        RuntimeContext {
            mode: ExecMode::Sequential,
        }
    }

    pub fn parallel() -> Self {
        Self::parallel_with_threshold(DEFAULT_PARALLEL_THRESHOLD)
    }

    pub fn parallel_with_threshold(min_len: usize) -> Self {
        RuntimeContext {
            mode: ExecMode::Parallel { min_len },
        }
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// Whether a sequence of `len` elements should be processed in parallel.
    #[inline]
    pub fn is_parallel_for(&self, len: usize) -> bool {
        match self.mode {
            ExecMode::Sequential => false,
            ExecMode::Parallel { min_len } => len >= min_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_applies_only_in_parallel_mode() {
        assert!(!RuntimeContext::sequential().is_parallel_for(1 << 20));
        let ctx = RuntimeContext::parallel_with_threshold(10);
        assert!(!ctx.is_parallel_for(9));
        assert!(ctx.is_parallel_for(10));
        assert_eq!(RuntimeContext::default().mode(), ExecMode::Sequential);
    }
}
