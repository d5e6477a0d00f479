use thiserror::Error;

use crate::{config::ConfigError, dataset::DatasetError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("input must be a non-empty string")]
    InvalidInput,
    #[error("product `{product}` is not in the co-purchase catalog")]
    UnknownProduct { product: String },
    #[error("product `{product}` has zero total purchases")]
    DivisionByZero { product: String },
    #[error("walkthrough is not active; initialize it first")]
    NotActive,
    #[error("walkthrough already completed all {max_steps} steps")]
    AlreadyComplete { max_steps: u8 },
}

impl StepError {
    /// True when a reset (followed by a fresh initialize) puts the engine back in a usable state.
    pub fn is_recoverable_by_reset(&self) -> bool {
        matches!(self, Self::NotActive | Self::AlreadyComplete { .. })
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Step(#[from] StepError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("dataset unavailable: {message}")]
    Unavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "That action is not possible right now. Check the input and try again."
            }
            Self::Unavailable { .. } => "The dataset could not be loaded.",
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::Unavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Unavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Step(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::Dataset(error) => {
                Self::Unavailable { message: error.to_string(), correlation_id }
            }
            ApplicationError::Configuration(error) => {
                Self::Internal { message: error.to_string(), correlation_id }
            }
        }
    }
}

impl From<StepError> for InterfaceError {
    fn from(value: StepError) -> Self {
        ApplicationError::from(value).into()
    }
}
