use std::io;

use lenient_csv_core::{
    Action, Input, Reader as CoreReader, ReaderBuilder as CoreReaderBuilder,
};
use log::{debug, trace};

use crate::chars::{CharRead, Utf8Chars};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::row::Row;

/// Builds a CSV reader with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter, the quote
/// character and how quotes in the middle of fields are treated. Once a CSV
/// `Reader` is built, its configuration cannot be changed.
#[derive(Debug, Default)]
pub struct ReaderBuilder {
    builder: CoreReaderBuilder,
}

impl ReaderBuilder {
    /// Create a new builder for configuring CSV parsing.
    ///
    /// To convert a builder into a reader, call one of the methods starting
    /// with `from_`.
    ///
    /// # Example
    ///
    /// ```
    /// use lenient_csv::ReaderBuilder;
    ///
    /// let data = "city;country\nBoston;United States\n";
    /// let mut rdr = ReaderBuilder::new()
    ///     .delimiter(';')
    ///     .from_chars(data.chars());
    /// let rows = rdr.rows().collect::<Result<Vec<_>, _>>().unwrap();
    /// assert_eq!(rows[1], vec!["Boston", "United States"]);
    /// ```
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a CSV reader from this configuration that reads UTF-8 encoded
    /// data from the given `io::Read`.
    ///
    /// The reader is buffered for you automatically.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Reader<Utf8Chars<R>> {
        self.from_chars(Utf8Chars::new(rdr))
    }

    /// Build a CSV reader from this configuration that reads characters
    /// from the given source.
    pub fn from_chars<R: CharRead>(&self, src: R) -> Reader<R> {
        Reader::new(self, src)
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.builder.delimiter(delimiter);
        self
    }

    /// The quote character to use when parsing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut ReaderBuilder {
        self.builder.quote(quote);
        self
    }

    /// Set both the delimiter and the quote character from a dialect.
    pub fn dialect(&mut self, dialect: &Dialect) -> &mut ReaderBuilder {
        self.delimiter(dialect.delimiter).quote(dialect.quote)
    }

    /// Whether a quote character in the middle of an unquoted field opens a
    /// quoted region.
    ///
    /// This is enabled by default, so `ab"cd,e` parses as a single field
    /// `abcd,e` (the quoted region runs to the end of the input). When
    /// disabled, quotes are only special at the start of a field and the
    /// same input parses as the two fields `ab"cd` and `e`.
    pub fn quote_anywhere(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.builder.quote_anywhere(yes);
        self
    }
}

/// A position in the character stream of a CSV reader.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    chars: u64,
    line: u64,
    row: u64,
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

impl Position {
    /// Returns a new position at the start of a stream.
    pub fn new() -> Position {
        Position { chars: 0, line: 1, row: 0 }
    }

    /// The number of characters consumed so far.
    pub fn chars(&self) -> u64 {
        self.chars
    }

    /// The current line, starting at `1`.
    ///
    /// Every `\n` consumed advances the line, including newlines inside of
    /// quoted fields.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The number of rows produced so far.
    pub fn row(&self) -> u64 {
        self.row
    }
}

/// A permissive, streaming CSV reader.
///
/// The reader pulls one character at a time from its source and produces
/// one row per call to [`read_row`](#method.read_row), or through the
/// [`rows`](#method.rows) and [`into_rows`](#method.into_rows) iterators.
///
/// Malformed CSV is never an error. Only `\n` ends a row, `\r` is data,
/// doubled quotes inside a quoted field are a single quote, and a quoted
/// field that is never closed extends to the end of the input. The only
/// errors come from the source itself.
///
/// The sequence of rows is forward-only. Once the end of the input has been
/// reached, the source is never read again and every subsequent read
/// reports the end.
///
/// # Example
///
/// ```
/// use lenient_csv::Reader;
///
/// let data = "a,\"he said \"\"hi\"\"\"\nb,\"line1\nline2\"\n";
/// let mut rdr = Reader::from_chars(data.chars());
/// let rows = rdr.rows().collect::<Result<Vec<_>, _>>().unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0], vec!["a", "he said \"hi\""]);
/// assert_eq!(rows[1], vec!["b", "line1\nline2"]);
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    core: CoreReader,
    src: R,
    pos: Position,
    /// Whether the source has reported the end of its input.
    eof: bool,
    /// Whether the end of the sequence of rows has been reported.
    done: bool,
}

impl<R: io::Read> Reader<Utf8Chars<R>> {
    /// Create a new CSV reader with a default configuration over UTF-8
    /// encoded data from the given `io::Read`.
    pub fn from_reader(rdr: R) -> Reader<Utf8Chars<R>> {
        ReaderBuilder::new().from_reader(rdr)
    }
}

impl<R: CharRead> Reader<R> {
    fn new(builder: &ReaderBuilder, src: R) -> Reader<R> {
        let core = builder.builder.build();
        debug!(
            "building CSV reader: delimiter={:?}, quote={:?}, \
             quote_anywhere={}",
            core.delimiter(),
            core.quote(),
            core.is_quote_anywhere(),
        );
        Reader { core, src, pos: Position::new(), eof: false, done: false }
    }

    /// Create a new CSV reader with a default configuration over the given
    /// character source.
    pub fn from_chars(src: R) -> Reader<R> {
        ReaderBuilder::new().from_chars(src)
    }

    /// Read a single row into the given `Row`, replacing its contents.
    ///
    /// Returns `false` when the end of the input has been reached, in which
    /// case `row` is left empty.
    ///
    /// If the source reports an error, the partially read row is discarded
    /// and the next call starts a new row at the source's current position.
    pub fn read_row(&mut self, row: &mut Row) -> Result<bool> {
        row.clear();
        if self.done {
            return Ok(false);
        }
        loop {
            let input = match self.read_input() {
                Ok(input) => input,
                Err(err) => {
                    self.core.reset();
                    row.clear();
                    return Err(err);
                }
            };
            match self.core.step(input) {
                Action::Skip => {}
                Action::Data(ch) => row.push_char(ch),
                Action::EndField => row.end_field(),
                Action::EndRecord => {
                    row.end_field();
                    self.pos.row += 1;
                    trace!(
                        "read CSV row {} with {} fields",
                        self.pos.row,
                        row.len()
                    );
                    return Ok(true);
                }
                Action::End => {
                    debug!(
                        "end of CSV input after {} rows and {} characters",
                        self.pos.row, self.pos.chars
                    );
                    self.done = true;
                    return Ok(false);
                }
            }
        }
    }

    /// Returns a borrowed iterator over all rows.
    ///
    /// Each item yielded by this iterator is a `Result<Row, Error>`.
    pub fn rows(&mut self) -> RowsIter<'_, R> {
        RowsIter { rdr: self, row: Row::new() }
    }

    /// Returns an owned iterator over all rows.
    ///
    /// This is mostly useful when you want to return a CSV iterator or
    /// store it somewhere.
    pub fn into_rows(self) -> RowsIntoIter<R> {
        RowsIntoIter { rdr: self, row: Row::new() }
    }

    /// Returns true if and only if this reader has reached the end of its
    /// input.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The current position of this reader.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Return a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.src
    }

    /// Return a mutable reference to the underlying source.
    ///
    /// Reading from the source directly will likely corrupt the rows read
    /// by this reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.src
    }

    /// Unwrap this CSV reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.src
    }

    fn read_input(&mut self) -> Result<Input> {
        if self.eof {
            return Ok(Input::End);
        }
        Ok(match self.src.read_char()? {
            None => {
                self.eof = true;
                Input::End
            }
            Some(ch) => {
                self.pos.chars += 1;
                if ch == '\n' {
                    self.pos.line += 1;
                }
                Input::Char(ch)
            }
        })
    }
}

/// A borrowed iterator over rows.
///
/// The lifetime parameter `'r` refers to the lifetime of the underlying CSV
/// `Reader`.
#[derive(Debug)]
pub struct RowsIter<'r, R> {
    rdr: &'r mut Reader<R>,
    row: Row,
}

impl<'r, R: CharRead> RowsIter<'r, R> {
    /// Return a reference to the underlying CSV reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Return a mutable reference to the underlying CSV reader.
    pub fn reader_mut(&mut self) -> &mut Reader<R> {
        &mut self.rdr
    }
}

impl<'r, R: CharRead> Iterator for RowsIter<'r, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Result<Row>> {
        match self.rdr.read_row(&mut self.row) {
            Err(err) => Some(Err(err)),
            Ok(true) => Some(Ok(self.row.clone())),
            Ok(false) => None,
        }
    }
}

/// An owned iterator over rows.
#[derive(Debug)]
pub struct RowsIntoIter<R> {
    rdr: Reader<R>,
    row: Row,
}

impl<R: CharRead> RowsIntoIter<R> {
    /// Return a reference to the underlying CSV reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Return a mutable reference to the underlying CSV reader.
    pub fn reader_mut(&mut self) -> &mut Reader<R> {
        &mut self.rdr
    }

    /// Drop this iterator and return the underlying CSV reader.
    pub fn into_reader(self) -> Reader<R> {
        self.rdr
    }
}

impl<R: CharRead> Iterator for RowsIntoIter<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Result<Row>> {
        match self.rdr.read_row(&mut self.row) {
            Err(err) => Some(Err(err)),
            Ok(true) => Some(Ok(self.row.clone())),
            Ok(false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::chars::CharRead;
    use crate::error::{Error, Result};
    use crate::row::Row;

    use super::{Reader, ReaderBuilder};

    fn rows(data: &str) -> Vec<Vec<String>> {
        rows_with(data, &ReaderBuilder::new())
    }

    fn rows_with(data: &str, builder: &ReaderBuilder) -> Vec<Vec<String>> {
        builder
            .from_chars(data.chars())
            .into_rows()
            .map(|row| row.unwrap().iter().map(|f| f.to_string()).collect())
            .collect()
    }

    macro_rules! parses_to {
        ($name:ident, $csv:expr, $vec:expr) => {
            parses_to!($name, $csv, $vec, |rdr| rdr);
        };
        ($name:ident, $csv:expr, $vec:expr, $config:expr) => {
            #[test]
            fn $name() {
                let mut builder = ReaderBuilder::new();
                $config(&mut builder);
                let got = rows_with($csv, &builder);
                let expected: Vec<Vec<&str>> = $vec;
                assert_eq!(got, expected);
            }
        };
    }

    parses_to!(empty, "", vec![]);
    parses_to!(multi_row, "a,b\nc,d\n", vec![vec!["a", "b"], vec!["c", "d"]]);
    parses_to!(
        embedded_newline,
        "a,\"line1\nline2\"\nb,c\n",
        vec![vec!["a", "line1\nline2"], vec!["b", "c"]]
    );
    parses_to!(
        escaped_quote,
        "a,\"he said \"\"hi\"\"\"\n",
        vec![vec!["a", "he said \"hi\""]]
    );
    parses_to!(empty_trailing_field, "a,\n", vec![vec!["a", ""]]);
    parses_to!(unterminated_quote, "a,\"b", vec![vec!["a", "b"]]);
    parses_to!(no_final_newline, "a,b\nc", vec![vec!["a", "b"], vec!["c"]]);
    parses_to!(
        crlf_keeps_cr,
        "a,b\r\nc\r\n",
        vec![vec!["a", "b\r"], vec!["c\r"]]
    );
    parses_to!(blank_line, "a\n\nb\n", vec![vec!["a"], vec![""], vec!["b"]]);
    parses_to!(stray_quote_mid_field, "ab\"cd,e", vec![vec!["abcd,e"]]);
    parses_to!(
        stray_quote_mid_field_strict,
        "ab\"cd,e",
        vec![vec!["ab\"cd", "e"]],
        |b: &mut ReaderBuilder| {
            b.quote_anywhere(false);
        }
    );
    parses_to!(
        semicolons,
        "a;\"b;c\"\n",
        vec![vec!["a", "b;c"]],
        |b: &mut ReaderBuilder| {
            b.delimiter(';');
        }
    );
    parses_to!(
        single_quotes,
        "'a,b','it''s'\n",
        vec![vec!["a,b", "it's"]],
        |b: &mut ReaderBuilder| {
            b.quote('\'');
        }
    );
    parses_to!(
        dialect,
        "a|'b|c'\n",
        vec![vec!["a", "b|c"]],
        |b: &mut ReaderBuilder| {
            b.dialect(&crate::Dialect::new().delimiter('|').quote('\''));
        }
    );

    #[test]
    fn read_row_reuses_row() {
        let mut rdr = Reader::from_chars("a,b\nc\n".chars());
        let mut row = Row::new();
        assert!(rdr.read_row(&mut row).unwrap());
        assert_eq!(row, vec!["a", "b"]);
        assert!(rdr.read_row(&mut row).unwrap());
        assert_eq!(row, vec!["c"]);
        assert!(!rdr.read_row(&mut row).unwrap());
        assert!(row.is_empty());
        assert!(rdr.is_done());
    }

    /// A source that counts how often it is asked for a character after
    /// reporting the end of its input.
    struct Counting<'a> {
        chars: std::str::Chars<'a>,
        reads_after_end: usize,
        ended: bool,
    }

    impl<'a> CharRead for Counting<'a> {
        fn read_char(&mut self) -> Result<Option<char>> {
            if self.ended {
                self.reads_after_end += 1;
            }
            let ch = self.chars.next();
            self.ended = ch.is_none();
            Ok(ch)
        }
    }

    #[test]
    fn exhausted_stays_exhausted() {
        let src =
            Counting { chars: "a".chars(), reads_after_end: 0, ended: false };
        let mut rdr = Reader::from_chars(src);
        let mut row = Row::new();
        assert!(rdr.read_row(&mut row).unwrap());
        assert!(!rdr.read_row(&mut row).unwrap());
        assert!(!rdr.read_row(&mut row).unwrap());
        assert!(rdr.rows().next().is_none());
        assert_eq!(rdr.get_ref().reads_after_end, 0);
    }

    #[test]
    fn position_tracking() {
        let mut rdr = Reader::from_chars("a,\"x\ny\"\nb\n".chars());
        let mut row = Row::new();
        assert!(rdr.read_row(&mut row).unwrap());
        assert_eq!(rdr.position().line(), 3);
        assert_eq!(rdr.position().row(), 1);
        assert_eq!(rdr.position().chars(), 8);
        assert!(rdr.read_row(&mut row).unwrap());
        assert_eq!(rdr.position().line(), 4);
        assert_eq!(rdr.position().row(), 2);
        assert_eq!(rdr.position().chars(), 10);
    }

    #[test]
    fn from_reader_decodes_utf8() {
        let data = "ñ,\"☃\n𝄞\"\n";
        let rdr = Reader::from_reader(data.as_bytes());
        let rows = rdr.into_rows().collect::<Result<Vec<Row>>>().unwrap();
        assert_eq!(rows, vec![Row::from(vec!["ñ", "☃\n𝄞"])]);
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let data: &[u8] = b"a,\xFF\nb\n";
        let mut rdr = Reader::from_reader(data);
        let mut it = rdr.rows();
        match it.next() {
            Some(Err(Error::Utf8 { err })) => assert_eq!(err.byte(), 2),
            res => panic!("expected UTF-8 error, got {:?}", res),
        }
        // The rest of the broken row is read as a fresh row.
        assert_eq!(it.next().unwrap().unwrap(), vec![""]);
        assert_eq!(it.next().unwrap().unwrap(), vec!["b"]);
        assert!(it.next().is_none());
    }

    struct Failing;

    impl io::Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn io_error_propagates() {
        let mut rdr = Reader::from_reader(Failing);
        match rdr.read_row(&mut Row::new()) {
            Err(Error::Io(err)) => {
                assert_eq!(err.kind(), io::ErrorKind::BrokenPipe)
            }
            res => panic!("expected I/O error, got {:?}", res),
        }
        assert!(!rdr.is_done());
    }

    #[test]
    fn borrowed_then_owned() {
        let mut rdr = Reader::from_chars("a\nb\nc\n".chars());
        let first = rdr.rows().next().unwrap().unwrap();
        assert_eq!(first, vec!["a"]);
        let rest: Vec<Row> =
            rdr.into_rows().collect::<Result<_>>().unwrap();
        assert_eq!(rest, vec![Row::from(vec!["b"]), Row::from(vec!["c"])]);
    }

    #[test]
    fn many_rows() {
        let data = "x,y\n".repeat(1000);
        assert_eq!(rows(&data).len(), 1000);
    }
}
