//! Enforcing limits on uploaded files.

use mime::Mime;
use regex_lite::Regex;

use crate::{error::UploadError, uploaded::UploadedFile};

/// Checks uploaded files against the constraints of a file input.
///
/// Creating an [`UploadedFile`] only records its size limit; this is where the limit, the allowed
/// file types and the maximum number of files are enforced.
///
/// ```
/// use actix_upload::UploadValidator;
///
/// let validator = UploadValidator::new()
///     .allow_types(r"(?i)\.(gif|jpe?g|png)$")
///     .unwrap()
///     .file_limit(3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UploadValidator {
    allow_types: Option<Regex>,
    allow_mime_types: Vec<Mime>,
    file_limit: Option<usize>,
}

impl UploadValidator {
    /// Constructs a validator that only enforces each file's size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accepts files whose name matches `pattern`.
    pub fn allow_types(mut self, pattern: &str) -> Result<Self, regex_lite::Error> {
        self.allow_types = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Only accepts files with this content type, or any content type in its range for `*` subtypes
    /// such as `image/*`. May be called multiple times.
    pub fn allow_mime_type(mut self, mime: Mime) -> Self {
        self.allow_mime_types.push(mime);
        self
    }

    /// Accepts at most `limit` files per input.
    pub fn file_limit(mut self, limit: usize) -> Self {
        self.file_limit = Some(limit);
        self
    }

    /// Validates a single uploaded file.
    pub fn validate(&self, file: &UploadedFile) -> Result<(), UploadError> {
        if let Some(limit) = file.size_limit().bytes() {
            if file.size() > limit {
                return Err(UploadError::SizeLimitExceeded {
                    file_name: file.file_name().to_owned(),
                    size: file.size(),
                    limit,
                });
            }
        }

        if let Some(allow_types) = &self.allow_types {
            if !allow_types.is_match(file.file_name()) {
                return Err(UploadError::InvalidFileType(file.file_name().to_owned()));
            }
        }

        if !self.allow_mime_types.is_empty() {
            let allowed = file.content_type().is_some_and(|ct| {
                self.allow_mime_types
                    .iter()
                    .any(|allowed| mime_matches(allowed, ct))
            });

            if !allowed {
                return Err(UploadError::InvalidFileType(file.file_name().to_owned()));
            }
        }

        Ok(())
    }

    /// Validates all files of one input, including the file count.
    pub fn validate_all(&self, files: &[UploadedFile]) -> Result<(), UploadError> {
        if let Some(limit) = self.file_limit {
            if files.len() > limit {
                return Err(UploadError::FileLimitExceeded {
                    limit,
                    count: files.len(),
                });
            }
        }

        files.iter().try_for_each(|file| self.validate(file))
    }
}

fn mime_matches(allowed: &Mime, ct: &Mime) -> bool {
    allowed.type_() == ct.type_()
        && (allowed.subtype() == mime::STAR || allowed.subtype() == ct.subtype())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::{
        item::{FileContent, FileItem},
        uploaded::SizeLimit,
    };

    fn file(name: &str, content_type: Option<Mime>, size: usize, limit: SizeLimit) -> UploadedFile {
        let item = FileItem::new(
            "file",
            Some(name.to_owned()),
            content_type,
            FileContent::Memory(Bytes::from(vec![0; size])),
            size,
        );
        UploadedFile::from_item(Some(&item), limit).unwrap()
    }

    #[test]
    fn size_limit() {
        let validator = UploadValidator::new();

        let ok = file("a.bin", None, 10, SizeLimit::Bytes(10));
        assert!(validator.validate(&ok).is_ok());

        let unbounded = file("a.bin", None, 10_000, SizeLimit::Unbounded);
        assert!(validator.validate(&unbounded).is_ok());

        let big = file("big.bin", None, 11, SizeLimit::Bytes(10));
        assert!(matches!(
            validator.validate(&big),
            Err(UploadError::SizeLimitExceeded { size: 11, limit: 10, .. })
        ));
    }

    #[test]
    fn allowed_file_names() {
        let validator = UploadValidator::new()
            .allow_types(r"(?i)\.(gif|jpe?g|png)$")
            .unwrap();

        let png = file("photo.PNG", None, 1, SizeLimit::Unbounded);
        assert!(validator.validate(&png).is_ok());

        let exe = file("setup.exe", None, 1, SizeLimit::Unbounded);
        assert!(matches!(
            validator.validate(&exe),
            Err(UploadError::InvalidFileType(name)) if name == "setup.exe"
        ));

        assert!(UploadValidator::new().allow_types("(").is_err());
    }

    #[test]
    fn allowed_mime_types() {
        let validator = UploadValidator::new()
            .allow_mime_type(mime::IMAGE_STAR)
            .allow_mime_type(mime::APPLICATION_PDF);

        let png = file("a.png", Some(mime::IMAGE_PNG), 1, SizeLimit::Unbounded);
        assert!(validator.validate(&png).is_ok());

        let pdf = file("a.pdf", Some(mime::APPLICATION_PDF), 1, SizeLimit::Unbounded);
        assert!(validator.validate(&pdf).is_ok());

        let json = file("a.json", Some(mime::APPLICATION_JSON), 1, SizeLimit::Unbounded);
        assert!(validator.validate(&json).is_err());

        let unknown = file("a.png", None, 1, SizeLimit::Unbounded);
        assert!(validator.validate(&unknown).is_err());
    }

    #[test]
    fn file_limit() {
        let validator = UploadValidator::new().file_limit(2);
        let files = vec![
            file("a", None, 1, SizeLimit::Unbounded),
            file("b", None, 1, SizeLimit::Unbounded),
        ];
        assert!(validator.validate_all(&files).is_ok());
        assert!(validator.validate_all(&[]).is_ok());

        let mut files = files;
        files.push(file("c", None, 1, SizeLimit::Unbounded));
        assert!(matches!(
            validator.validate_all(&files),
            Err(UploadError::FileLimitExceeded { limit: 2, count: 3 })
        ));

        let files = [file("big", None, 5, SizeLimit::Bytes(1))];
        assert!(UploadValidator::new().validate_all(&files).is_err());
    }
}
