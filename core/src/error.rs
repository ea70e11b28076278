use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Invalid argument: {what}")]
    InvalidArgument { what: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GenError {
    pub fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidArgument { what: what.into() }
    }
}

pub type GenResult<T> = Result<T, GenError>;
