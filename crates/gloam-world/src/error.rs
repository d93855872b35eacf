//! World error types

use gloam_core::EntityId;
use gloam_sprite::AnimationError;
use thiserror::Error;

/// Errors raised while building or updating a single entity
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("unknown creature kind: {0}")]
    UnknownEntityKind(String),

    #[error("no sprite loaded for {0}")]
    MissingSprite(String),

    #[error("creature {id} has no {field}")]
    MissingField { id: EntityId, field: &'static str },

    #[error("animation error: {0}")]
    Animation(#[from] AnimationError),
}

/// Errors raised while decoding an inbound message
#[derive(Debug, Error)]
pub enum SyncError {
    /// The message is not a well-formed packet; nothing was applied
    #[error("malformed packet: {0}")]
    MalformedPacket(#[from] serde_json::Error),
}
