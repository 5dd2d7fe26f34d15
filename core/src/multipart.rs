//! Synchronous `multipart/form-data` encoder.
//!
//! Parts are written straight into the wrapped writer, so the whole body is
//! produced in one pass. The boundary is random per writer.

use std::io::{self, Write};

use uuid::Uuid;

/// Writes a `multipart/form-data` body into `W`.
#[derive(Debug)]
pub struct MultipartWriter<W: Write> {
    inner: W,
    boundary: String,
    has_parts: bool,
}

impl<W: Write> MultipartWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            boundary: Uuid::new_v4().simple().to_string(),
            has_parts: false,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `Content-Type` value declaring this writer's boundary.
    pub fn form_data_content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Start a file part and return the writer its content goes to.
    pub fn create_form_file(&mut self, field: &str, file_name: &str) -> io::Result<&mut W> {
        let disposition = format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            escape_quotes(field),
            escape_quotes(file_name)
        );
        self.write_part_headers(&disposition, Some("application/octet-stream"))?;
        Ok(&mut self.inner)
    }

    /// Write a plain form field.
    pub fn write_field(&mut self, field: &str, value: &str) -> io::Result<()> {
        let disposition = format!("form-data; name=\"{}\"", escape_quotes(field));
        self.write_part_headers(&disposition, None)?;
        self.inner.write_all(value.as_bytes())
    }

    /// Write the closing boundary and hand back the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.has_parts {
            self.inner.write_all(b"\r\n")?;
        }
        write!(self.inner, "--{}--\r\n", self.boundary)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_part_headers(&mut self, disposition: &str, content_type: Option<&str>) -> io::Result<()> {
        if self.has_parts {
            self.inner.write_all(b"\r\n")?;
        }
        self.has_parts = true;
        write!(self.inner, "--{}\r\n", self.boundary)?;
        write!(self.inner, "Content-Disposition: {disposition}\r\n")?;
        if let Some(content_type) = content_type {
            write!(self.inner, "Content-Type: {content_type}\r\n")?;
        }
        self.inner.write_all(b"\r\n")
    }
}

fn escape_quotes(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
