//! Parts of a multipart request, as attached to the request by [`UploadFilter`].
//!
//! [`UploadFilter`]: crate::UploadFilter

use std::{
    borrow::Cow,
    future::{ready, Ready},
    path::{Path, PathBuf},
    rc::Rc,
};

use actix_web::{dev::Payload, Error, FromRequest, HttpMessage as _, HttpRequest};

use crate::{
    config::UploadConfig,
    error::UploadError,
    item::FileItem,
    request::{resolve_multipart, MultipartRequest},
    uploaded::{SizeLimit, UploadedFile},
};

/// Parsed `multipart/form-data` parts of a request.
///
/// Cloning is cheap; clones share the same parts.
///
/// # Extractor
/// Handlers behind [`UploadFilter`](crate::UploadFilter) can take `MultipartFiles` as an argument.
/// Extraction fails with [`UploadError::MissingFilter`] when the filter did not run.
///
/// ```
/// use actix_upload::{MultipartFiles, SizeLimit, UploadFilter};
/// use actix_web::{web, App, HttpResponse};
///
/// async fn upload(files: MultipartFiles) -> HttpResponse {
///     match files.uploaded_file("file", SizeLimit::Unbounded) {
///         Some(file) => HttpResponse::Ok().body(format!("got {}", file.file_name())),
///         None => HttpResponse::Ok().body("no file chosen"),
///     }
/// }
///
/// let app = App::new()
///     .wrap(UploadFilter::default())
///     .route("/upload", web::post().to(upload));
/// ```
#[derive(Debug, Clone)]
pub struct MultipartFiles {
    inner: Rc<Inner>,
}

#[derive(Debug)]
struct Inner {
    items: Vec<FileItem>,
    upload_directory: Option<PathBuf>,
}

impl MultipartFiles {
    /// Constructs from parts in submission order.
    pub fn new(items: Vec<FileItem>, upload_directory: Option<PathBuf>) -> Self {
        Self {
            inner: Rc::new(Inner {
                items,
                upload_directory,
            }),
        }
    }

    /// All parts in submission order.
    pub fn items(&self) -> &[FileItem] {
        &self.inner.items
    }

    /// Returns true if the request had no parts.
    pub fn is_empty(&self) -> bool {
        self.inner.items.is_empty()
    }

    /// Value of the first plain form field named `name`.
    pub fn parameter(&self, name: &str) -> Option<Cow<'_, str>> {
        self.form_fields(name).next().and_then(FileItem::string)
    }

    /// Values of all plain form fields named `name`, in submission order.
    pub fn parameters(&self, name: &str) -> Vec<Cow<'_, str>> {
        self.form_fields(name).filter_map(FileItem::string).collect()
    }

    /// Uploaded file for a single file input, or `None` if nothing was chosen.
    pub fn uploaded_file(&self, field_name: &str, size_limit: SizeLimit) -> Option<UploadedFile> {
        UploadedFile::from_item(self.file_item(field_name), size_limit)
    }

    /// Uploaded files for a multiple file input, skipping inputs left empty.
    pub fn uploaded_files(&self, field_name: &str, size_limit: SizeLimit) -> Vec<UploadedFile> {
        UploadedFile::from_items(self.file_items(field_name), size_limit)
    }

    fn form_fields<'a: 'n, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a FileItem> + 'n {
        self.fields(name).filter(|item| item.is_form_field())
    }

    fn fields<'a: 'n, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a FileItem> + 'n {
        self.inner
            .items
            .iter()
            .filter(move |item| item.field_name() == name)
    }
}

impl MultipartRequest for MultipartFiles {
    fn file_item(&self, field_name: &str) -> Option<&FileItem> {
        self.fields(field_name).next()
    }

    fn file_items(&self, field_name: &str) -> Vec<&FileItem> {
        self.fields(field_name).collect()
    }

    fn upload_directory(&self) -> Option<&Path> {
        self.inner.upload_directory.as_deref()
    }
}

impl FromRequest for MultipartFiles {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    #[inline]
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let files = req.extensions().get::<MultipartFiles>().cloned();

        ready(match files {
            Some(files) => Ok(files),
            None => {
                let err = UploadError::MissingFilter;
                log::warn!("{err}");
                Err(UploadConfig::from_req(req).map_error(req, err))
            }
        })
    }
}

/// Looks up the multipart request of an actix request, if the filter ran.
pub(crate) fn with_multipart<R>(
    req: &HttpRequest,
    f: impl FnOnce(Option<&dyn MultipartRequest>) -> R,
) -> R {
    let ext = req.extensions();
    f(resolve_multipart(&*ext))
}
