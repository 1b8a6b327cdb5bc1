//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the ability system, worker coordination and snapshot
//! encoding so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use ability_core::AbilityError;

use crate::host::EntityId;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{0} is already live")]
    DuplicateEntity(EntityId),

    #[error("{0} is not live")]
    UnknownEntity(EntityId),

    #[error(transparent)]
    Ability(#[from] AbilityError),

    #[error("host worker command channel closed")]
    CommandChannelClosed,

    #[error("host worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("host worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("failed to encode snapshot")]
    Encode(#[from] serde_json::Error),
}
