use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Bytes of the file handed to the header sniffer.
pub const HEAD_SAMPLE_BYTES: usize = 64 * 1024;

/// CSV dialect of a statement export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    pub delimiter: char,
    pub quote: char,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: ',',
            quote: '"',
        }
    }
}

impl Dialect {
    pub(crate) fn validate(&self) -> Result<(u8, u8), ImportError> {
        let byte = |c: char| u8::try_from(c).ok().filter(u8::is_ascii).ok_or(ImportError::InvalidDialect(c));
        Ok((byte(self.delimiter)?, byte(self.quote)?))
    }
}

/// A downloaded statement held in memory.
#[derive(Debug, Clone)]
pub struct StatementFile {
    name: String,
    contents: String,
}

impl StatementFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        StatementFile {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Invalid UTF-8 is replaced rather than rejected. A leading byte-order
    /// mark is dropped.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
        Self::new(name, String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(path.display().to_string(), &bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Everything after the first `skip_lines` lines.
    pub fn body(&self, skip_lines: usize) -> &str {
        let mut rest = self.contents.as_str();
        for _ in 0..skip_lines {
            match rest.find('\n') {
                Some(pos) => rest = &rest[pos + 1..],
                None => return "",
            }
        }
        rest
    }

    /// At most `max_bytes` of the body, cut on a character boundary.
    pub fn head(&self, skip_lines: usize, max_bytes: usize) -> &str {
        let body = self.body(skip_lines);
        if body.len() <= max_bytes {
            return body;
        }
        let mut end = max_bytes;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        &body[..end]
    }

    /// A record reader over the body. Header handling is left to the caller.
    pub fn reader(&self, skip_lines: usize, dialect: &Dialect) -> Result<csv::Reader<&[u8]>, ImportError> {
        let (delimiter, quote) = dialect.validate()?;
        Ok(csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .quote(quote)
            .from_reader(self.body(skip_lines).as_bytes()))
    }
}
