/*!
The `lenient-csv` crate provides a permissive, streaming CSV reader and a
CSV writer, with optional Serde support for writing records.

# Reading

A [`Reader`](struct.Reader.html) pulls characters one at a time from a
[`CharRead`](trait.CharRead.html) source and produces one
[`Row`](struct.Row.html) at a time. Parsing never fails: unterminated
quotes run to the end of the input, stray quotes are resolved, and `\r` is
kept as data. Only errors from the source itself (I/O failures, invalid
UTF-8) are reported.

```
use lenient_csv::Reader;

let data = "a,b\nc,\"d,e\"\n";
let mut rdr = Reader::from_reader(data.as_bytes());
for result in rdr.rows() {
    let row = result.unwrap();
    assert_eq!(row.len(), 2);
}
```

# Writing

A [`Writer`](struct.Writer.html) quotes fields that contain the delimiter,
the quote character, `\n` or `\r`, doubling quotes inside of them, and ends
every row with `\n`.

```
use lenient_csv::Writer;

let mut wtr = Writer::from_writer(vec![]);
wtr.write_row(&["a", "b,c"]).unwrap();
assert_eq!(wtr.into_inner(), b"a,\"b,c\"\n");
```

# Configuration

Both ends are configured through builders, or with a shared
[`Dialect`](struct.Dialect.html):

```
use lenient_csv::{Dialect, ReaderBuilder, WriterBuilder};

let dialect = Dialect::new().delimiter(';').quote('\'');

let mut wtr = WriterBuilder::new().dialect(&dialect).from_writer(vec![]);
wtr.write_row(&["x;y", "z"]).unwrap();
let data = String::from_utf8(wtr.into_inner()).unwrap();
assert_eq!(data, "'x;y';z\n");

let mut rdr = ReaderBuilder::new().dialect(&dialect).from_chars(data.chars());
let row = rdr.rows().next().unwrap().unwrap();
assert_eq!(row, vec!["x;y", "z"]);
```
*/

#![deny(missing_docs)]

pub use lenient_csv_core::QuoteStyle;

pub use crate::chars::{CharRead, Utf8Chars};
pub use crate::dialect::Dialect;
pub use crate::error::{Error, Result, Utf8Error};
pub use crate::reader::{
    Position, Reader, ReaderBuilder, RowsIntoIter, RowsIter,
};
pub use crate::row::{Row, RowIter};
pub use crate::writer::{Writer, WriterBuilder};

mod chars;
mod dialect;
mod error;
mod reader;
mod row;
#[cfg(feature = "serde")]
mod serializer;
mod writer;
