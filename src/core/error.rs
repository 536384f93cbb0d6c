//! Data-integrity errors.
//!
//! Illegal player actions are not errors (see `rules::IllegalAction`);
//! `DuelError` covers problems that stop a duel from being built or saved:
//! missing catalog entries, malformed recipes and undecodable data.

use thiserror::Error;

/// Failure while assembling, loading or snapshotting a duel.
#[derive(Debug, Error)]
pub enum DuelError {
    #[error("card `{0}` is not in the catalog")]
    UnknownCard(String),

    #[error("deck recipe `{0}` is not in the catalog")]
    UnknownRecipe(String),

    #[error("deck recipe `{0}` contains no cards")]
    EmptyRecipe(String),

    #[error("card `{0}` is registered twice")]
    DuplicateCard(String),

    #[error("no deck recipe assigned to the {0} side")]
    MissingRecipe(crate::core::Side),

    #[error("deck recipe `{recipe}` breaks deck rules: {reason}")]
    InvalidDeck { recipe: String, reason: String },

    #[error("malformed catalog or config data: {0}")]
    Data(#[from] serde_json::Error),

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),
}

pub type DuelResult<T> = Result<T, DuelError>;
