//! XML serialized-body results.
//!
//! The body is built completely in memory and written in one shot with
//! `Content-Type: application/xml`.

use axum::body::Bytes;

use crate::result::ContentResult;

/// Minimal element writer for flat record models.
#[derive(Debug)]
pub struct XmlWriter {
    buf: String,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            buf: String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"),
        }
    }

    pub fn open(&mut self, name: &str) {
        self.buf.push('<');
        self.buf.push_str(name);
        self.buf.push_str(">\n");
    }

    pub fn close(&mut self, name: &str) {
        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push_str(">\n");
    }

    /// Write `<name>text</name>`; absent values are omitted entirely.
    pub fn element(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.buf.push_str("  <");
            self.buf.push_str(name);
            self.buf.push('>');
            escape_into(&mut self.buf, value);
            self.buf.push_str("</");
            self.buf.push_str(name);
            self.buf.push_str(">\n");
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_into(buf: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            '\'' => buf.push_str("&apos;"),
            c => buf.push(c),
        }
    }
}

/// Models that can be written as a single XML element.
pub trait XmlSerialize {
    fn root_name(&self) -> &str;
    fn write_fields(&self, writer: &mut XmlWriter);
}

/// Builds the `application/xml` content result for a model.
pub struct XmlResult;

impl XmlResult {
    pub fn from_model<M: XmlSerialize + ?Sized>(model: &M) -> ContentResult {
        let mut writer = XmlWriter::new();
        writer.open(model.root_name());
        model.write_fields(&mut writer);
        writer.close(model.root_name());
        ContentResult {
            content_type: "application/xml".to_string(),
            body: Bytes::from(writer.finish()),
        }
    }
}
