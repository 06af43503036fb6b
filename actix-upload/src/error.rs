//! Error and Result module

use std::io;

use actix_multipart::MultipartError;
use actix_web::{http::StatusCode, ResponseError};
use derive_more::{Display, Error, From};

/// A set of errors that can occur while receiving or validating uploads.
///
/// Resolution failures, missing fields and "no file chosen" parts are not errors; those surface
/// as absent values from the decoding functions.
#[derive(Debug, Display, From, Error)]
#[non_exhaustive]
pub enum UploadError {
    /// The multipart stream could not be parsed.
    #[display("{}", _0)]
    Multipart(MultipartError),

    /// Spooling a part to disk failed.
    #[display("File I/O error: {}", _0)]
    FileIo(io::Error),

    /// The request body is larger than the configured total limit.
    #[display("Multipart payload exceeds the limit of {} bytes", limit)]
    #[from(ignore)]
    Overflow { limit: usize },

    /// The [`UploadFilter`](crate::UploadFilter) did not run for this request.
    #[display("No multipart request found; is the `UploadFilter` middleware registered?")]
    #[from(ignore)]
    MissingFilter,

    /// An uploaded file is larger than its size limit.
    #[display("File `{}` is {} bytes, the limit is {} bytes", file_name, size, limit)]
    #[from(ignore)]
    SizeLimitExceeded {
        file_name: String,
        size: usize,
        limit: usize,
    },

    /// An uploaded file's name or content type is not allowed.
    #[display("File type of `{}` is not allowed", _0)]
    #[from(ignore)]
    InvalidFileType(#[error(not(source))] String),

    /// More files were uploaded than allowed.
    #[display("At most {} files may be uploaded, got {}", limit, count)]
    #[from(ignore)]
    FileLimitExceeded { limit: usize, count: usize },
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Multipart(err) => err.status_code(),
            UploadError::FileIo(_) | UploadError::MissingFilter => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            UploadError::Overflow { .. } | UploadError::SizeLimitExceeded { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            UploadError::InvalidFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::FileLimitExceeded { .. } => StatusCode::BAD_REQUEST,
        }
    }
}
