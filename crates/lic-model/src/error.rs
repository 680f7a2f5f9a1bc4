//! Errors raised when the document builder is asked to touch something
//! that does not exist.

use thiserror::Error;

use crate::arena::{AbstractPartId, PartInstanceId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("no abstract part with id {0}")]
    UnknownModel(AbstractPartId),

    #[error("'{0}' is not a submodel")]
    NotASubmodel(String),

    #[error("submodel '{model}' has no page {page}")]
    UnknownPage { model: String, page: i32 },

    #[error("page {page} has no step {step}")]
    UnknownStep { page: i32, step: i32 },

    #[error("step {step} has no callout at index {index}")]
    UnknownCallout { step: i32, index: usize },

    #[error("no part instance with id {0}")]
    UnknownPart(PartInstanceId),

    #[error("page {0} still holds parts and cannot be removed")]
    PageNotEmpty(i32),
}

pub type Result<T> = std::result::Result<T, ModelError>;
