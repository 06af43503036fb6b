//! Locating the multipart request behind a chain of request wrappers.

use std::path::Path;

use actix_web::dev::Extensions;

use crate::{item::FileItem, multipart::MultipartFiles};

/// A request that carries parsed `multipart/form-data` parts.
pub trait MultipartRequest {
    /// Returns the first part submitted for `field_name`, if any.
    fn file_item(&self, field_name: &str) -> Option<&FileItem>;

    /// Returns all parts submitted for `field_name`, in submission order.
    fn file_items(&self, field_name: &str) -> Vec<&FileItem>;

    /// Directory this request spooled its parts into, if one was set explicitly.
    fn upload_directory(&self) -> Option<&Path> {
        None
    }
}

/// A request object, possibly decorating an inner request.
///
/// Middleware that wants to expose extra capabilities wraps the request it was given and
/// returns it from [`inner_request`](Self::inner_request).
pub trait Request {
    /// The decorated request, or `None` for the innermost request.
    fn inner_request(&self) -> Option<&dyn Request> {
        None
    }

    /// This request as a multipart request, if it is one.
    fn as_multipart(&self) -> Option<&dyn MultipartRequest> {
        None
    }
}

/// Finds the first multipart request in a chain of request wrappers.
///
/// The chain is walked from the outermost request inwards. Returns `None` when the innermost
/// request is reached without finding one; callers decide whether that deserves a warning.
pub fn resolve_multipart(req: &dyn Request) -> Option<&dyn MultipartRequest> {
    let mut current = req;

    loop {
        if let Some(multipart) = current.as_multipart() {
            return Some(multipart);
        }

        current = current.inner_request()?;
    }
}

/// Request extensions are the innermost request; they are multipart once the
/// [`UploadFilter`](crate::UploadFilter) has attached its parsed parts.
impl Request for Extensions {
    fn as_multipart(&self) -> Option<&dyn MultipartRequest> {
        self.get::<MultipartFiles>()
            .map(|files| files as &dyn MultipartRequest)
    }
}
