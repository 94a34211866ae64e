/*!
`lenient-csv-core` provides the permissive, character level CSV state machine
and the field escaping logic that power the `lenient-csv` crate. It does no
I/O and never allocates, so it can be used in `no_std` environments.

# Reading

The [`Reader`](struct.Reader.html) in this crate is a finite state machine.
It consumes one [`Input`](enum.Input.html) at a time (either a character or
the end of the input) and reports an [`Action`](enum.Action.html) telling
the caller what to do with its field buffer. The caller owns the buffer, so
the machine can be driven from any character source.

The parser never fails. Unterminated quotes, stray quotes and carriage
returns are all resolved to *some* parse:

* Only `\n` terminates a record. `\r` is ordinary data.
* A doubled quote inside a quoted field yields a single quote.
* A quoted field that is never closed runs until the end of the input.
* By default, a quote anywhere outside of a quoted region opens one, even
  in the middle of a field. This can be restricted to the start of fields
  with [`ReaderBuilder::quote_anywhere`](struct.ReaderBuilder.html#method.quote_anywhere).

```
use lenient_csv_core::{Action, Input, Reader};

let mut rdr = Reader::new();
let mut fields = vec![];
let mut field = String::new();
for ch in "a,\"b,c\"\n".chars() {
    match rdr.step(Input::Char(ch)) {
        Action::Data(ch) => field.push(ch),
        Action::EndField | Action::EndRecord => {
            fields.push(std::mem::replace(&mut field, String::new()));
        }
        Action::Skip | Action::End => {}
    }
}
assert_eq!(fields, vec!["a", "b,c"]);
```

# Writing

The [`Writer`](struct.Writer.html) writes fields and record terminators to
any `core::fmt::Write` implementation, quoting fields when they contain the
delimiter, the quote character, `\n` or `\r`.

```
use lenient_csv_core::Writer;

let mut wtr = Writer::new();
let mut out = String::new();
wtr.write_field("a", &mut out).unwrap();
wtr.write_field("b,c", &mut out).unwrap();
wtr.write_terminator(&mut out).unwrap();
assert_eq!(out, "a,\"b,c\"\n");
```
*/

#![deny(missing_docs)]
#![no_std]

pub use crate::reader::{Action, Input, Reader, ReaderBuilder, State};
pub use crate::writer::{QuoteStyle, Writer, WriterBuilder};

mod reader;
mod writer;
