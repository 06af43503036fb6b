//! Raw parts of a parsed multipart request.

use std::{
    borrow::Cow,
    fmt, fs,
    io::{self, Read},
    path::Path,
    sync::Arc,
};

use bytes::{Buf as _, Bytes};
use mime::Mime;
use tempfile::NamedTempFile;

/// Storage backing the content of a [`FileItem`].
///
/// Small parts stay in memory; parts over the filter's memory threshold are spooled into a named
/// temporary file. Clones share the same storage and the temporary file is removed when the last
/// clone is dropped.
#[derive(Clone)]
pub enum FileContent {
    /// Content held in memory.
    Memory(Bytes),

    /// Content spooled to a temporary file on disk.
    Disk(Arc<NamedTempFile>),
}

impl FileContent {
    /// Opens a fresh reader positioned at the start of the content.
    pub fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        match self {
            FileContent::Memory(data) => Ok(Box::new(data.clone().reader())),
            FileContent::Disk(file) => Ok(Box::new(file.reopen()?)),
        }
    }

    /// Reads the whole content.
    pub fn bytes(&self) -> io::Result<Bytes> {
        match self {
            FileContent::Memory(data) => Ok(data.clone()),
            FileContent::Disk(file) => fs::read(file.path()).map(Bytes::from),
        }
    }

    /// Path of the temporary file, for disk backed content.
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileContent::Memory(_) => None,
            FileContent::Disk(file) => Some(file.path()),
        }
    }

    /// Returns true if the content was spooled to disk.
    pub fn is_on_disk(&self) -> bool {
        matches!(self, FileContent::Disk(_))
    }
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContent::Memory(data) => f.debug_tuple("Memory").field(&data.len()).finish(),
            FileContent::Disk(file) => f.debug_tuple("Disk").field(&file.path()).finish(),
        }
    }
}

/// One part of a `multipart/form-data` body.
///
/// Parts without a `filename` parameter are plain form fields. A file input left empty by the
/// user is still sent, with an empty `filename`.
#[derive(Debug, Clone)]
pub struct FileItem {
    field_name: String,
    name: Option<String>,
    content_type: Option<Mime>,
    content: FileContent,
    size: usize,
}

impl FileItem {
    /// Constructs a file item from its parts.
    pub fn new(
        field_name: impl Into<String>,
        name: Option<String>,
        content_type: Option<Mime>,
        content: FileContent,
        size: usize,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            name,
            content_type,
            content,
            size,
        }
    }

    /// Constructs an in-memory file item, taking its size from `data`.
    pub fn from_bytes(
        field_name: impl Into<String>,
        name: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        let size = data.len();
        Self::new(field_name, name, None, FileContent::Memory(data), size)
    }

    /// The `name` of the form field this part was submitted for.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The `filename` value in the `content-disposition` header.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The value of the part's `content-type` header.
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// The storage backing this part.
    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if this part is a regular form field rather than a file.
    pub fn is_form_field(&self) -> bool {
        self.name.is_none()
    }

    /// Content of a form field as text, if it is held in memory.
    pub fn string(&self) -> Option<Cow<'_, str>> {
        match &self.content {
            FileContent::Memory(data) => Some(String::from_utf8_lossy(data)),
            FileContent::Disk(_) => None,
        }
    }
}
