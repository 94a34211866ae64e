use core::fmt;

use memchr::{memchr, memchr3};

/// The quoting style to use when writing CSV data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteStyle {
    /// This puts quotes around every field. Always.
    Always,
    /// This puts quotes around fields only when necessary.
    ///
    /// They are necessary when fields contain a quote, the delimiter, `\n`
    /// or `\r`.
    ///
    /// This is the default.
    Necessary,
    /// This *never* writes quotes, even when they would be necessary.
    ///
    /// Fields are written verbatim, so the output may not parse back into
    /// the same records.
    Never,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Necessary
    }
}

/// A builder for configuring a CSV writer.
///
/// This builder permits specifying the CSV delimiter, quote character and
/// quoting style.
#[derive(Debug, Default)]
pub struct WriterBuilder {
    wtr: Writer,
}

impl WriterBuilder {
    /// Create a new builder for configuring a CSV writer.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration.
    pub fn build(&self) -> Writer {
        let mut wtr = self.wtr.clone();
        wtr.reset();
        wtr
    }

    /// The field delimiter to use when writing CSV.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.wtr.delimiter = delimiter;
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut WriterBuilder {
        self.wtr.quote = quote;
        self
    }

    /// The quoting style to use when writing CSV.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which will only
    /// use quotes when they are necessary to preserve the integrity of data.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.wtr.style = style;
        self
    }
}

/// A writer for CSV data.
///
/// The writer only tracks whether the next field is the first one in its
/// record, so that it knows when to emit a delimiter. Everything is written
/// to a caller provided `core::fmt::Write`.
///
/// # RFC 4180
///
/// This writer is close to RFC 4180 with two exceptions: records are
/// terminated by `\n` instead of `\r\n`, and it doesn't guarantee that all
/// records written are of the same length.
#[derive(Clone, Debug)]
pub struct Writer {
    first_field_in_record: bool,
    delimiter: char,
    quote: char,
    style: QuoteStyle,
}

impl Default for Writer {
    fn default() -> Writer {
        Writer {
            first_field_in_record: true,
            delimiter: ',',
            quote: '"',
            style: QuoteStyle::default(),
        }
    }
}

impl Writer {
    /// Creates a new CSV writer with the default configuration.
    pub fn new() -> Writer {
        Writer::default()
    }

    /// The configured field delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The configured quote character.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// The configured quoting style.
    pub fn quote_style(&self) -> QuoteStyle {
        self.style
    }

    /// Returns true if and only if no field has been written since the last
    /// record terminator.
    pub fn is_record_start(&self) -> bool {
        self.first_field_in_record
    }

    /// Forget any fields written for the current record, so that the next
    /// field starts a new record.
    pub fn reset(&mut self) {
        self.first_field_in_record = true;
    }

    /// Write a single field, preceded by a delimiter if it isn't the first
    /// field in the current record.
    pub fn write_field<W: fmt::Write>(
        &mut self,
        field: &str,
        output: &mut W,
    ) -> fmt::Result {
        if !self.first_field_in_record {
            output.write_char(self.delimiter)?;
        }
        self.first_field_in_record = false;
        if self.should_quote(field) {
            self.write_quoted(field, output)
        } else {
            output.write_str(field)
        }
    }

    /// Write the record terminator and prepare for the next record.
    pub fn write_terminator<W: fmt::Write>(
        &mut self,
        output: &mut W,
    ) -> fmt::Result {
        output.write_char('\n')?;
        self.first_field_in_record = true;
        Ok(())
    }

    /// Returns true if and only if the given field would be quoted by this
    /// writer.
    pub fn should_quote(&self, field: &str) -> bool {
        match self.style {
            QuoteStyle::Always => true,
            QuoteStyle::Never => false,
            QuoteStyle::Necessary => self.needs_quotes(field),
        }
    }

    /// Write the given field wrapped in quotes, doubling every quote inside
    /// of it.
    ///
    /// This ignores the quoting style and the delimiter state.
    pub fn write_quoted<W: fmt::Write>(
        &self,
        field: &str,
        output: &mut W,
    ) -> fmt::Result {
        output.write_char(self.quote)?;
        let mut rest = field;
        while let Some(i) = rest.find(self.quote) {
            let end = i + self.quote.len_utf8();
            output.write_str(&rest[..end])?;
            output.write_char(self.quote)?;
            rest = &rest[end..];
        }
        output.write_str(rest)?;
        output.write_char(self.quote)
    }

    fn needs_quotes(&self, field: &str) -> bool {
        if self.delimiter.is_ascii() && self.quote.is_ascii() {
            // ASCII bytes never occur inside multi-byte UTF-8 sequences, so
            // a byte search is exact.
            let bytes = field.as_bytes();
            memchr3(self.delimiter as u8, self.quote as u8, b'\n', bytes)
                .is_some()
                || memchr(b'\r', bytes).is_some()
        } else {
            field.contains(|c: char| {
                c == self.delimiter || c == self.quote || c == '\n' || c == '\r'
            })
        }
    }
}
