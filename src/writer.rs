use std::io;

use lenient_csv_core::{
    QuoteStyle, Writer as CoreWriter, WriterBuilder as CoreWriterBuilder,
};
use log::{debug, trace};

use crate::dialect::Dialect;
use crate::error::{Error, Result};
#[cfg(feature = "serde")]
use serde::Serialize;

/// Builds a CSV writer with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, the quote
/// character and the quoting style. Once a CSV `Writer` is built, its
/// configuration cannot be changed.
#[derive(Debug, Default)]
pub struct WriterBuilder {
    builder: CoreWriterBuilder,
}

impl WriterBuilder {
    /// Create a new builder for configuring CSV writing.
    ///
    /// To convert a builder into a writer, call `from_writer`.
    ///
    /// # Example
    ///
    /// ```
    /// use lenient_csv::WriterBuilder;
    ///
    /// let mut wtr = WriterBuilder::new().delimiter('\t').from_writer(vec![]);
    /// wtr.write_row(&["a", "b\tc"]).unwrap();
    /// let data = String::from_utf8(wtr.into_inner()).unwrap();
    /// assert_eq!(data, "a\t\"b\tc\"\n");
    /// ```
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration that writes data to `wtr`.
    ///
    /// The writer is *not* buffered. Every row is written to `wtr` with a
    /// single `write_all` call, so wrap `wtr` in an `io::BufWriter` if many
    /// small writes are expensive.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Writer<W> {
        Writer::new(self, wtr)
    }

    /// The field delimiter to use when writing CSV.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.builder.delimiter(delimiter);
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut WriterBuilder {
        self.builder.quote(quote);
        self
    }

    /// Set both the delimiter and the quote character from a dialect.
    pub fn dialect(&mut self, dialect: &Dialect) -> &mut WriterBuilder {
        self.delimiter(dialect.delimiter).quote(dialect.quote)
    }

    /// The quoting style to use when writing CSV.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which only quotes
    /// fields containing the delimiter, the quote character, `\n` or `\r`.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.builder.quote_style(style);
        self
    }
}

/// A CSV writer.
///
/// Fields containing the delimiter, the quote character, `\n` or `\r` are
/// wrapped in quotes, with every quote inside of them doubled. Every other
/// field is written verbatim. Rows end with a single `\n`.
///
/// Each row is assembled in memory and handed to the underlying writer in
/// one `write_all` call once it is complete. Errors from the underlying
/// writer are returned unmodified as `Error::Io`.
///
/// # Example
///
/// ```
/// use lenient_csv::Writer;
///
/// let mut wtr = Writer::from_writer(vec![]);
/// wtr.write_row(&["a", "b,c"]).unwrap();
/// wtr.write_row(&["he said \"hi\"", ""]).unwrap();
///
/// let data = String::from_utf8(wtr.into_inner()).unwrap();
/// assert_eq!(data, "a,\"b,c\"\n\"he said \"\"hi\"\"\",\n");
/// ```
#[derive(Debug)]
pub struct Writer<W> {
    core: CoreWriter,
    wtr: W,
    /// The row being assembled.
    line: String,
    /// The number of rows written so far.
    rows: u64,
}

impl<W: io::Write> Writer<W> {
    fn new(builder: &WriterBuilder, wtr: W) -> Writer<W> {
        let core = builder.builder.build();
        debug!(
            "building CSV writer: delimiter={:?}, quote={:?}, style={:?}",
            core.delimiter(),
            core.quote(),
            core.quote_style(),
        );
        Writer { core, wtr, line: String::new(), rows: 0 }
    }

    /// Create a new CSV writer with a default configuration that writes
    /// to `wtr`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        WriterBuilder::new().from_writer(wtr)
    }

    /// Write a single row.
    ///
    /// The row is given as an iterator of fields, where each field can be
    /// anything that converts to a `&str`. An empty row is written as a bare
    /// `\n`.
    ///
    /// Any fields previously added with `write_field` that haven't been
    /// terminated yet become the start of this row.
    pub fn write_row<I, T>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for field in row {
            self.write_field(field)?;
        }
        self.write_terminator()
    }

    /// Write every row from the given iterator, in order.
    ///
    /// This is equivalent to calling `write_row` for each row. If writing
    /// one of them fails, the rows before it have already been written and
    /// the rows after it are not.
    pub fn write_rows<I, R, T>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Add a single field to the current row.
    ///
    /// Nothing reaches the underlying writer until `write_terminator` is
    /// called.
    pub fn write_field<T: AsRef<str>>(&mut self, field: T) -> Result<()> {
        self.core.write_field(field.as_ref(), &mut self.line).map_err(|_| {
            Error::Serialize("could not format CSV field".to_string())
        })
    }

    /// Terminate the current row and write it to the underlying writer.
    ///
    /// If the underlying writer fails, the row is discarded.
    pub fn write_terminator(&mut self) -> Result<()> {
        let res = self.write_line();
        self.line.clear();
        res
    }

    /// Serialize a single record using Serde.
    ///
    /// The record can be a struct, a tuple, a sequence or a single scalar.
    /// Every scalar becomes one field: numbers and booleans are formatted as
    /// text, `None` and `()` become an empty field and unit enum variants
    /// are written as their name. Nested structs, tuples and sequences are
    /// flattened into the same row.
    ///
    /// Maps and enum variants carrying data other than a single value cannot
    /// be represented as a flat row and result in an error. Header rows are
    /// never written.
    ///
    /// # Example
    ///
    /// ```
    /// use lenient_csv::Writer;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct City<'a> {
    ///     name: &'a str,
    ///     population: Option<u64>,
    ///     area: f64,
    /// }
    ///
    /// let mut wtr = Writer::from_writer(vec![]);
    /// wtr.serialize(City { name: "Boston, MA", population: None, area: 232.1 })
    ///     .unwrap();
    /// wtr.serialize(("Oslo", 709_037, 454.0)).unwrap();
    ///
    /// let data = String::from_utf8(wtr.into_inner()).unwrap();
    /// assert_eq!(data, "\"Boston, MA\",,232.1\nOslo,709037,454.0\n");
    /// ```
    #[cfg(feature = "serde")]
    pub fn serialize<S: Serialize>(&mut self, record: S) -> Result<()> {
        if let Err(err) = crate::serializer::serialize(self, &record) {
            self.discard_row();
            return Err(err);
        }
        self.write_terminator()
    }

    /// Flush the underlying writer.
    ///
    /// Rows are already handed to the underlying writer as they complete,
    /// so this only matters for writers that buffer internally.
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }

    /// Return a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.wtr
    }

    /// Return a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.wtr
    }

    /// Unwrap this CSV writer, returning the underlying writer.
    ///
    /// Fields of an unterminated row are dropped.
    pub fn into_inner(self) -> W {
        self.wtr
    }

    /// Drop any fields added to the current row.
    fn discard_row(&mut self) {
        self.line.clear();
        self.core.reset();
    }

    fn write_line(&mut self) -> Result<()> {
        self.core.write_terminator(&mut self.line).map_err(|_| {
            Error::Serialize("could not format CSV row".to_string())
        })?;
        self.wtr.write_all(self.line.as_bytes())?;
        self.rows += 1;
        trace!("wrote CSV row {} ({} bytes)", self.rows, self.line.len());
        Ok(())
    }
}
