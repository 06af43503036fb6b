//! For middleware documentation, see [`UploadFilter`].

use std::{
    future::{ready, Ready},
    path::{Path, PathBuf},
    rc::Rc,
    sync::Arc,
};

use actix_multipart::{Field, Multipart};
use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web::BytesMut,
    Error, HttpMessage as _,
};
use futures_core::future::LocalBoxFuture;
use futures_util::TryStreamExt as _;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt as _;

use crate::{
    config::UploadConfig,
    error::UploadError,
    item::{FileContent, FileItem},
    multipart::MultipartFiles,
};

/// Middleware that parses `multipart/form-data` request bodies into [`MultipartFiles`].
///
/// The parsed parts are attached to the request extensions, where the upload decoders and the
/// [`MultipartFiles`] extractor find them. Requests of any other content type are passed through
/// untouched.
///
/// Parts are held in memory up to [`UploadConfig::memory_threshold`] bytes and spooled into
/// temporary files beyond that. Bodies larger than [`UploadConfig::total_limit`] are rejected.
///
/// # Examples
/// ```
/// use actix_upload::UploadFilter;
/// use actix_web::{web, App, HttpResponse};
///
/// let app = App::new()
///     .wrap(UploadFilter::new().upload_directory("/var/uploads/avatars"))
///     .route("/avatar", web::post().to(HttpResponse::Ok));
/// ```
#[derive(Debug, Clone, Default)]
pub struct UploadFilter {
    inner: Rc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    upload_directory: Option<PathBuf>,
}

impl UploadFilter {
    /// Constructs an upload filter spooling into the configured default directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spools parts of requests handled by this filter into `dir`.
    ///
    /// The directory is reported by the parsed request and overrides
    /// [`UploadConfig::upload_directory`].
    pub fn upload_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.inner = Rc::new(Inner {
            upload_directory: Some(dir.as_ref().to_owned()),
        });
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for UploadFilter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = UploadFilterMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(UploadFilterMiddleware {
            service: Rc::new(service),
            inner: Rc::clone(&self.inner),
        }))
    }
}

/// Service returned by [`UploadFilter`].
pub struct UploadFilterMiddleware<S> {
    service: Rc<S>,
    inner: Rc<Inner>,
}

impl<S, B> Service<ServiceRequest> for UploadFilterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let inner = Rc::clone(&self.inner);

        Box::pin(async move {
            if is_form_data(&req) && !req.extensions().contains::<MultipartFiles>() {
                let config = UploadConfig::from_req(req.request()).clone();
                let dir = inner
                    .upload_directory
                    .clone()
                    .unwrap_or_else(|| config.default_upload_directory());

                let payload = req.take_payload();
                let multipart = Multipart::new(req.headers(), payload);

                match read_parts(multipart, &config, &dir).await {
                    Ok(items) => {
                        log::debug!("parsed {} multipart parts", items.len());
                        let files = MultipartFiles::new(items, inner.upload_directory.clone());
                        req.extensions_mut().insert(files);
                    }
                    Err(err) => {
                        log::debug!("failed to parse multipart request: {err}");
                        let err = config.map_error(req.request(), err);
                        return Ok(req.error_response(err).map_into_right_body());
                    }
                }
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

fn is_form_data(req: &ServiceRequest) -> bool {
    matches!(
        req.mime_type(),
        Ok(Some(ct)) if ct.type_() == mime::MULTIPART && ct.subtype() == mime::FORM_DATA
    )
}

/// Used to keep track of the remaining size limit for the whole form.
struct Limits {
    total_limit: usize,
    total_limit_remaining: usize,
}

impl Limits {
    fn new(total_limit: usize) -> Self {
        Self {
            total_limit,
            total_limit_remaining: total_limit,
        }
    }

    fn try_consume_limits(&mut self, bytes: usize) -> Result<(), UploadError> {
        self.total_limit_remaining = self
            .total_limit_remaining
            .checked_sub(bytes)
            .ok_or(UploadError::Overflow {
                limit: self.total_limit,
            })?;

        Ok(())
    }
}

async fn read_parts(
    mut multipart: Multipart,
    config: &UploadConfig,
    dir: &Path,
) -> Result<Vec<FileItem>, UploadError> {
    let mut limits = Limits::new(config.get_total_limit());
    let mut items = Vec::new();

    while let Some(field) = multipart.try_next().await? {
        let item = read_part(field, config.get_memory_threshold(), dir, &mut limits).await?;
        items.push(item);
    }

    Ok(items)
}

async fn read_part(
    mut field: Field,
    memory_threshold: usize,
    dir: &Path,
    limits: &mut Limits,
) -> Result<FileItem, UploadError> {
    let field_name = field.name().unwrap_or_default().to_owned();
    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(ToOwned::to_owned);
    let content_type = field.content_type().cloned();

    let mut data = BytesMut::new();
    let mut spool: Option<(NamedTempFile, tokio::fs::File)> = None;
    let mut size = 0;

    while let Some(chunk) = field.try_next().await? {
        limits.try_consume_limits(chunk.len())?;
        size += chunk.len();

        if let Some((_, file_async)) = spool.as_mut() {
            file_async.write_all(&chunk).await?;
        } else if size > memory_threshold {
            let file = NamedTempFile::new_in(dir)?;
            log::trace!(
                "spooling field `{}` to {}",
                field_name,
                file.path().display()
            );

            let mut file_async = tokio::fs::File::from_std(file.reopen()?);
            file_async.write_all(&data).await?;
            file_async.write_all(&chunk).await?;
            data.clear();

            spool = Some((file, file_async));
        } else {
            data.extend_from_slice(&chunk);
        }
    }

    let content = match spool {
        Some((file, mut file_async)) => {
            file_async.flush().await?;
            FileContent::Disk(Arc::new(file))
        }
        None => FileContent::Memory(data.freeze()),
    };

    Ok(FileItem::new(field_name, file_name, content_type, content, size))
}
