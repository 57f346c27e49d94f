//! Configuration for the finish-ballot engine.

use isaac_types::Amount;

/// The subset of node configuration the block engine needs to turn ballots
/// into blocks: the reserve a new account must clear, and the height past
/// which `Inflation` operations stop crediting the common account.
#[derive(Debug, Clone, Copy)]
pub struct BlockEngineConfig {
    /// Minimum balance a freshly created account must hold.
    pub base_reserve: Amount,
    /// Last height at which `Inflation` operations still apply. Past this
    /// height the operation is staged but has no balance effect.
    pub block_height_end_of_inflation: u64,
}

impl Default for BlockEngineConfig {
    fn default() -> Self {
        BlockEngineConfig {
            base_reserve: Amount::new(1),
            block_height_end_of_inflation: u64::MAX,
        }
    }
}
