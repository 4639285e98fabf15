use thiserror::Error;

use crate::store::LoadPhase;

pub type TileResult<T> = Result<T, TileError>;

#[derive(Debug, Error)]
pub enum TileError {
    #[error("unknown field: context={context}, field={field}")]
    UnknownField { context: String, field: String },

    #[error("invalid loading-state transition: {from:?} -> {to:?}")]
    InvalidLoadTransition { from: LoadPhase, to: LoadPhase },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
