//! Resolving the directory uploads are stored in.

use std::path::{Path, PathBuf};

use crate::request::MultipartRequest;

/// Resolves the directory uploads of `req` are stored in.
///
/// The request's own upload directory wins over `default`. The result is made absolute against
/// the current directory; a path that cannot be made absolute is returned as given.
pub fn resolve_upload_directory(req: &dyn MultipartRequest, default: &Path) -> PathBuf {
    let dir = req.upload_directory().unwrap_or(default);
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_owned())
}
