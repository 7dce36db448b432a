//! Error envelope shared by every failing response

pub mod codes;
pub mod response;

pub use codes::ErrorCode;
pub use response::{
    ApiResponse, ClientListResponse, ClientResponse, ErrorModel, FileListResponse, FileResponse,
    LoginEnvelope, PrincipalResponse, SocietyListResponse, SocietyResponse,
    TOKEN_VALIDATION_FAILED,
};

use crate::db::RepositoryError;

impl From<RepositoryError> for ErrorModel {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ErrorModel::not_found(err.to_string()),
            RepositoryError::Conflict(message) => ErrorModel::conflict(message),
            other => {
                tracing::error!(error = %other, "Repository failure");
                ErrorModel::internal_error()
            }
        }
    }
}
