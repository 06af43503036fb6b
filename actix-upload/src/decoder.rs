//! Decoding the value of a file input from a request.

use std::path::PathBuf;

use actix_web::HttpRequest;

use crate::{
    config::UploadConfig,
    directory::resolve_upload_directory,
    multipart::with_multipart,
    uploaded::UploadedFile,
};

/// Whether a file input accepts one file or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    /// A single file input.
    #[default]
    Single,

    /// A file input with the `multiple` attribute.
    Multiple,
}

/// Decoded value of a file input.
#[derive(Debug, Clone)]
pub enum DecodedUpload {
    /// The file chosen in a single file input.
    Single(UploadedFile),

    /// The files chosen in a multiple file input; empty if none were chosen.
    Multiple(Vec<UploadedFile>),
}

impl DecodedUpload {
    /// All decoded files.
    pub fn into_files(self) -> Vec<UploadedFile> {
        match self {
            DecodedUpload::Single(file) => vec![file],
            DecodedUpload::Multiple(files) => files,
        }
    }
}

/// Decodes file inputs of requests parsed by [`UploadFilter`](crate::UploadFilter).
///
/// Size limit and default upload directory come from the request's [`UploadConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileUploadDecoder;

impl FileUploadDecoder {
    /// Name of the multipart backend this decoder reads from.
    pub fn name(&self) -> &'static str {
        "actix-multipart"
    }

    /// Decodes the file input `field_name`.
    ///
    /// Returns `None` when the request was not parsed by the upload filter, or when no file was
    /// chosen in a single file input. A multiple file input with no files chosen decodes to an
    /// empty list.
    pub fn decode(
        &self,
        req: &HttpRequest,
        field_name: &str,
        mode: UploadMode,
    ) -> Option<DecodedUpload> {
        let size_limit = UploadConfig::from_req(req).get_size_limit();

        with_multipart(req, |multipart| {
            let Some(multipart) = multipart else {
                log::warn!(
                    "{} uploader requires registration of the `UploadFilter` middleware",
                    self.name()
                );
                return None;
            };

            match mode {
                UploadMode::Single => {
                    UploadedFile::from_item(multipart.file_item(field_name), size_limit)
                        .map(DecodedUpload::Single)
                }
                UploadMode::Multiple => Some(DecodedUpload::Multiple(UploadedFile::from_items(
                    multipart.file_items(field_name),
                    size_limit,
                ))),
            }
        })
    }

    /// Directory uploads of `req` are stored in.
    ///
    /// Falls back to the configured default directory when the request was not parsed by the
    /// upload filter or the filter has no directory of its own.
    pub fn upload_directory(&self, req: &HttpRequest) -> PathBuf {
        let default = UploadConfig::from_req(req).default_upload_directory();

        with_multipart(req, |multipart| match multipart {
            Some(multipart) => resolve_upload_directory(multipart, &default),
            None => std::path::absolute(&default).unwrap_or(default),
        })
    }
}
