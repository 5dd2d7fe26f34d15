//! Access to files uploaded in an inbound form.
//!
//! The builder only needs "give me the file stored under this form field";
//! how the inbound form was parsed is up to the caller.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};

/// A source of uploaded files keyed by form field name.
pub trait FileSource {
    /// Open the file stored under `field`.
    ///
    /// A missing field is reported as `io::ErrorKind::NotFound`. The returned
    /// reader is dropped by the caller as soon as it has been copied.
    fn open_file(&self, field: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// A file extracted from an inbound form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// In-memory `FileSource`.
#[derive(Debug, Clone, Default)]
pub struct FormFiles {
    files: HashMap<String, FormFile>,
}

impl FormFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` under `field`, replacing any previous file.
    pub fn insert(&mut self, field: &str, file_name: &str, content: impl Into<Vec<u8>>) {
        self.files.insert(
            field.to_string(),
            FormFile {
                file_name: file_name.to_string(),
                content: content.into(),
            },
        );
    }

    /// Chaining variant of `insert`.
    pub fn with_file(mut self, field: &str, file_name: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(field, file_name, content);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FormFile> {
        self.files.get(field)
    }
}

impl FileSource for FormFiles {
    fn open_file(&self, field: &str) -> io::Result<Box<dyn Read + '_>> {
        let file = self.files.get(field).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {field}"))
        })?;
        Ok(Box::new(Cursor::new(file.content.as_slice())))
    }
}
