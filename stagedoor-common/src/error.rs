use std::error::Error;

use poem::error::ResponseError;

#[derive(thiserror::Error, Debug)]
pub enum StagedoorError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),
    #[error("teaser duration out of range: {0}s")]
    InvalidTeaserDuration(i32),
    #[error("viewer is already blocked for this profile")]
    DuplicateBlockEntry,
    #[error("a block entry needs a viewer id or an IP address")]
    MissingBlockSubject,
    #[error("Inconsistent state error")]
    InconsistentState,
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl ResponseError for StagedoorError {
    fn status(&self) -> poem::http::StatusCode {
        poem::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl poem_openapi::ApiResponse for StagedoorError {
    fn meta() -> poem_openapi::registry::MetaResponses {
        poem_openapi::registry::MetaResponses {
            responses: Vec::new(),
        }
    }

    fn register(_registry: &mut poem_openapi::registry::Registry) {}
}

impl StagedoorError {
    pub fn other<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Other(Box::new(err))
    }
}
