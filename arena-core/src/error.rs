use thiserror::Error;

/// Error taxonomy for the simulation core (§7). Wire-decode errors
/// (`BadPacket`, `InvalidCell`, `BufferOverflow`) live in `arena_proto`;
/// these three cover failures that only make sense once a match is
/// actually running.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("strategy for agent {agent_id} faulted: {reason}")]
    StrategyFault { agent_id: u16, reason: String },

    #[error("io failure: {0}")]
    IoFault(#[from] std::io::Error),

    #[error("config error: {0}")]
    ConfigFault(String),
}

pub type ArenaResult<T> = Result<T, ArenaError>;
