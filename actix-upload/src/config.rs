//! Upload configuration, registered as app data.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use actix_web::{web, Error, HttpRequest};
use serde::Deserialize;

use crate::{error::UploadError, uploaded::SizeLimit};

type UploadErrorHandler = Option<Arc<dyn Fn(UploadError, &HttpRequest) -> Error + Send + Sync>>;

/// Configuration for [`UploadFilter`](crate::UploadFilter) and the upload decoders.
///
/// Add to your app data to have it picked up; requests without one use the defaults.
///
/// ```
/// use actix_upload::{SizeLimit, UploadConfig, UploadFilter};
/// use actix_web::App;
///
/// let app = App::new()
///     .app_data(
///         UploadConfig::default()
///             .size_limit(SizeLimit::Bytes(1024 * 1024))
///             .upload_directory("/var/uploads"),
///     )
///     .wrap(UploadFilter::default());
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    size_limit: SizeLimit,
    upload_directory: Option<PathBuf>,
    memory_threshold: usize,
    total_limit: usize,
    #[serde(skip)]
    err_handler: UploadErrorHandler,
}

impl UploadConfig {
    /// Sets the per-file size limit handed to uploaded files. Unbounded by default.
    pub fn size_limit(mut self, size_limit: SizeLimit) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Sets the default directory spooled parts are written to.
    ///
    /// The default is the platform's temporary directory.
    pub fn upload_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.upload_directory = Some(dir.as_ref().to_owned());
        self
    }

    /// Sets the size above which a part is spooled to disk. By default this is 10KiB.
    pub fn memory_threshold(mut self, memory_threshold: usize) -> Self {
        self.memory_threshold = memory_threshold;
        self
    }

    /// Sets maximum accepted payload size for the entire form. By default this limit is 50MiB.
    pub fn total_limit(mut self, total_limit: usize) -> Self {
        self.total_limit = total_limit;
        self
    }

    /// Sets custom error handler.
    pub fn error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(UploadError, &HttpRequest) -> Error + Send + Sync + 'static,
    {
        self.err_handler = Some(Arc::new(f));
        self
    }

    /// Per-file size limit.
    pub fn get_size_limit(&self) -> SizeLimit {
        self.size_limit
    }

    /// Configured default upload directory, falling back to the platform's temporary directory.
    pub fn default_upload_directory(&self) -> PathBuf {
        self.upload_directory
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    pub(crate) fn get_memory_threshold(&self) -> usize {
        self.memory_threshold
    }

    pub(crate) fn get_total_limit(&self) -> usize {
        self.total_limit
    }

    /// Extracts upload config from app data. Check both `T` and `Data<T>`, in that order, and fall
    /// back to the default upload config.
    pub fn from_req(req: &HttpRequest) -> &Self {
        req.app_data::<Self>()
            .or_else(|| req.app_data::<web::Data<Self>>().map(|d| d.as_ref()))
            .unwrap_or(&DEFAULT_CONFIG)
    }

    pub(crate) fn map_error(&self, req: &HttpRequest, err: UploadError) -> Error {
        if let Some(ref err_handler) = self.err_handler {
            (err_handler)(err, req)
        } else {
            err.into()
        }
    }
}

const DEFAULT_CONFIG: UploadConfig = UploadConfig {
    size_limit: SizeLimit::Unbounded,
    upload_directory: None,
    memory_threshold: 10_240, // 10 KiB
    total_limit: 52_428_800, // 50 MiB
    err_handler: None,
};

impl Default for UploadConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("size_limit", &self.size_limit)
            .field("upload_directory", &self.upload_directory)
            .field("memory_threshold", &self.memory_threshold)
            .field("total_limit", &self.total_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test::TestRequest, HttpResponse, ResponseError as _};

    use super::*;

    #[test]
    fn defaults() {
        let config = UploadConfig::default();
        assert_eq!(config.get_size_limit(), SizeLimit::Unbounded);
        assert_eq!(config.get_memory_threshold(), 10_240);
        assert_eq!(config.get_total_limit(), 52_428_800);
        assert_eq!(config.default_upload_directory(), std::env::temp_dir());
    }

    #[test]
    fn from_app_data() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(UploadConfig::from_req(&req).get_total_limit(), 52_428_800);

        let req = TestRequest::default()
            .app_data(UploadConfig::default().total_limit(100))
            .to_http_request();
        assert_eq!(UploadConfig::from_req(&req).get_total_limit(), 100);

        let req = TestRequest::default()
            .app_data(web::Data::new(
                UploadConfig::default().upload_directory("/var/uploads"),
            ))
            .to_http_request();
        assert_eq!(
            UploadConfig::from_req(&req).default_upload_directory(),
            Path::new("/var/uploads")
        );
    }

    #[test]
    fn custom_error_handler() {
        let config = UploadConfig::default().error_handler(|err, _req| {
            actix_web::error::InternalError::from_response(err, HttpResponse::Conflict().finish())
                .into()
        });

        let req = TestRequest::default().to_http_request();
        let err = config.map_error(&req, UploadError::MissingFilter);
        assert_eq!(err.as_response_error().status_code(), StatusCode::CONFLICT);

        let err = UploadConfig::default().map_error(&req, UploadError::MissingFilter);
        assert_eq!(
            err.as_response_error().status_code(),
            UploadError::MissingFilter.status_code()
        );
    }

    #[test]
    fn deserialize() {
        let config: UploadConfig = serde_json::from_str(
            r#"{
                "size_limit": { "bytes": 2048 },
                "upload_directory": "/srv/uploads",
                "memory_threshold": 0
            }"#,
        )
        .unwrap();

        assert_eq!(config.get_size_limit(), SizeLimit::Bytes(2048));
        assert_eq!(config.default_upload_directory(), Path::new("/srv/uploads"));
        assert_eq!(config.get_memory_threshold(), 0);
        assert_eq!(config.get_total_limit(), 52_428_800);
    }
}
