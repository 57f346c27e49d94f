//! Consensus tuning parameters. `isaac-node` loads these from its `ballot`
//! and `tx` configuration sections; this crate only needs the values, not
//! the TOML shape they arrived in.

use std::time::Duration;

/// Parameters governing ballot timing and shape, shared by validation and
/// the round state machine.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    pub timeout_init: Duration,
    pub timeout_sign: Duration,
    pub timeout_accept: Duration,
    pub timeout_all_confirm: Duration,
    /// Target spacing between blocks.
    pub block_time: Duration,
    /// Allowed jitter around `block_time`; also the `±D` window
    /// `IsWellFormed` checks `confirmed` timestamps against.
    pub block_time_delta: Duration,
    /// `OpsInBallotLimit`: max transactions a ballot may propose.
    pub ops_in_ballot_limit: usize,
    /// Quorum threshold as a percentage of connected validators, `[1, 100]`.
    pub threshold_percent: u8,
    pub network_id: Vec<u8>,
}

impl ConsensusConfig {
    /// Panics if the threshold is outside `[1, 100]` or any timeout is zero —
    /// this is invalid configuration caught at startup, not a runtime error.
    pub fn validate(&self) {
        assert!(
            (1..=100).contains(&self.threshold_percent),
            "threshold_percent must be in [1, 100], got {}",
            self.threshold_percent
        );
        for (name, d) in [
            ("timeout_init", self.timeout_init),
            ("timeout_sign", self.timeout_sign),
            ("timeout_accept", self.timeout_accept),
            ("timeout_all_confirm", self.timeout_all_confirm),
            ("block_time", self.block_time),
        ] {
            assert!(!d.is_zero(), "{name} must be non-zero");
        }
    }

    /// The minimum YES-vote count to reach quorum out of `connected`
    /// validators, rounding up.
    #[must_use]
    pub fn quorum(&self, connected: usize) -> usize {
        let needed = (connected * self.threshold_percent as usize).div_ceil(100);
        needed.max(1)
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        ConsensusConfig {
            timeout_init: Duration::from_secs(2),
            timeout_sign: Duration::from_secs(2),
            timeout_accept: Duration::from_secs(2),
            timeout_all_confirm: Duration::from_secs(2),
            block_time: Duration::from_secs(5),
            block_time_delta: Duration::from_secs(1),
            ops_in_ballot_limit: 1000,
            threshold_percent: 67,
            network_id: b"isaac".to_vec(),
        }
    }
}
