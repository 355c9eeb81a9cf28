//! Construction-time parameters of an [`Aig`](crate::Aig).

/// Parameters used when creating an [`Aig`](crate::Aig).
///
/// ```rust
/// use strashaig::{Aig, AigConfig};
/// let aig = Aig::with_config(AigConfig::default().with_initial_bins(7));
/// assert_eq!(aig.bin_count(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AigConfig {
    /// Requested number of buckets of the structural hash table.
    /// The actual count is the next prime greater or equal to this.
    pub initial_bins: usize,
    /// Number of node slots reserved up front.
    pub node_capacity: usize,
}

impl Default for AigConfig {
    fn default() -> Self {
        AigConfig {
            initial_bins: 10_000,
            node_capacity: 0,
        }
    }
}

impl AigConfig {
    pub fn with_initial_bins(mut self, initial_bins: usize) -> Self {
        self.initial_bins = initial_bins;
        self
    }

    pub fn with_node_capacity(mut self, node_capacity: usize) -> Self {
        self.node_capacity = node_capacity;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn builder() {
        let cfg = AigConfig::default()
            .with_initial_bins(3)
            .with_node_capacity(64);
        assert_eq!(cfg.initial_bins, 3);
        assert_eq!(cfg.node_capacity, 64);
        assert_eq!(AigConfig::default().initial_bins, 10_000);
    }
}
