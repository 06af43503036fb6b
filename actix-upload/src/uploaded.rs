//! Uploaded files, normalized from raw multipart parts.

use std::{
    fmt, fs,
    io::{self, Read},
    path::Path,
};

use bytes::Bytes;
use mime::Mime;
use serde::Deserialize;

use crate::item::{FileContent, FileItem};

/// Maximum size accepted for an uploaded file.
///
/// The limit travels with each [`UploadedFile`]; it is checked by
/// [`UploadValidator`](crate::UploadValidator), not when the file is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeLimit {
    /// Files of any size are accepted.
    #[default]
    Unbounded,

    /// Files larger than this many bytes are rejected.
    Bytes(usize),
}

impl SizeLimit {
    /// Returns the limit in bytes, or `None` if unbounded.
    pub fn bytes(self) -> Option<usize> {
        match self {
            SizeLimit::Unbounded => None,
            SizeLimit::Bytes(limit) => Some(limit),
        }
    }

    /// Returns true if `size` bytes is over this limit.
    pub fn is_exceeded_by(self, size: usize) -> bool {
        self.bytes().is_some_and(|limit| size > limit)
    }
}

impl From<Option<usize>> for SizeLimit {
    fn from(limit: Option<usize>) -> Self {
        limit.map_or(SizeLimit::Unbounded, SizeLimit::Bytes)
    }
}

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeLimit::Unbounded => f.write_str("unbounded"),
            SizeLimit::Bytes(limit) => write!(f, "{limit} bytes"),
        }
    }
}

/// A file chosen by the user and received in a multipart request.
///
/// Only built from parts with a non-blank file name; a file input left empty is "nothing
/// uploaded", never an empty file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    file_name: String,
    content_type: Option<Mime>,
    content: FileContent,
    size: usize,
    size_limit: SizeLimit,
}

impl UploadedFile {
    /// Creates an uploaded file from a part, or `None` if no file was chosen for it.
    pub fn from_item(item: Option<&FileItem>, size_limit: SizeLimit) -> Option<Self> {
        let item = item?;
        let file_name = item.name().filter(|name| !name.trim().is_empty())?;

        Some(Self {
            file_name: file_name.to_owned(),
            content_type: item.content_type().cloned(),
            content: item.content().clone(),
            size: item.size(),
            size_limit,
        })
    }

    /// Creates uploaded files from parts, skipping parts for which no file was chosen.
    pub fn from_items<'a, I>(items: I, size_limit: SizeLimit) -> Vec<Self>
    where
        I: IntoIterator<Item = &'a FileItem>,
    {
        items
            .into_iter()
            .filter_map(|item| Self::from_item(Some(item), size_limit))
            .collect()
    }

    /// The file name given by the client.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The content type given by the client, if any.
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// Size of the file in bytes, as reported by its part.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Size limit configured for the input this file was uploaded through.
    pub fn size_limit(&self) -> SizeLimit {
        self.size_limit
    }

    /// Opens a reader over the file's content.
    pub fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        self.content.open()
    }

    /// Reads the whole content into memory.
    pub fn bytes(&self) -> io::Result<Bytes> {
        self.content.bytes()
    }

    /// Writes the content to `path`, replacing any existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();

        match &self.content {
            FileContent::Memory(data) => fs::write(path, data),
            FileContent::Disk(file) => fs::copy(file.path(), path).map(|_| ()),
        }
    }
}
