/// A single unit of input to the CSV state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Input {
    /// The next character of the source.
    Char(char),
    /// The source has no more characters.
    End,
}

/// What the caller should do after feeding one `Input` to the reader.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// The input carried no data. Nothing to do.
    Skip,
    /// Append this character to the current field.
    Data(char),
    /// The current field is complete. More fields follow in this record.
    EndField,
    /// The current field is complete and so is the current record.
    EndRecord,
    /// The input is exhausted and no record was started. This is the end of
    /// the sequence of records and never accompanies any data.
    End,
}

/// The state of the CSV state machine between two inputs.
///
/// Every state other than `StartRecord` means that a record has been
/// started, so reaching the end of the input in that state still produces a
/// record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// Nothing has been consumed for the current record.
    StartRecord,
    /// A delimiter was just consumed.
    StartField,
    /// Inside an unquoted field.
    InField,
    /// Inside a quoted region. Everything but the quote is literal.
    InQuotedField,
    /// A quote was consumed inside a quoted region. The next input decides
    /// whether it was an escaped quote or the end of the quoted region.
    QuoteInQuotedField,
}

impl State {
    /// Returns true if and only if a record has been started in this state.
    pub fn in_record(&self) -> bool {
        *self != State::StartRecord
    }

    /// Returns true if and only if this state is inside a quoted region.
    pub fn in_quotes(&self) -> bool {
        match *self {
            State::InQuotedField | State::QuoteInQuotedField => true,
            _ => false,
        }
    }
}

impl Default for State {
    fn default() -> State {
        State::StartRecord
    }
}

/// A permissive CSV parser, driven one character at a time.
///
/// The reader never returns an error and always finds *a* parse. Callers
/// own the field buffer and apply the [`Action`](enum.Action.html) returned
/// for each input.
///
/// The parsing logic itself lives in
/// [`transition`](struct.Reader.html#method.transition), which is a pure
/// function of the configuration, the current state and the input. `step`
/// is the stateful convenience wrapper around it.
#[derive(Clone, Debug)]
pub struct Reader {
    /// The current state.
    state: State,
    /// The delimiter that separates fields.
    delimiter: char,
    /// The quotation character.
    quote: char,
    /// Whether a quote in the middle of an unquoted field opens a quoted
    /// region.
    quote_anywhere: bool,
}

impl Default for Reader {
    fn default() -> Reader {
        Reader {
            state: State::StartRecord,
            delimiter: ',',
            quote: '"',
            quote_anywhere: true,
        }
    }
}

/// Builds a CSV reader with various configuration knobs.
///
/// Once a `Reader` is built, its configuration cannot be changed.
#[derive(Debug, Default)]
pub struct ReaderBuilder {
    rdr: Reader,
}

impl ReaderBuilder {
    /// Create a new builder.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a CSV parser from this configuration.
    pub fn build(&self) -> Reader {
        let mut rdr = self.rdr.clone();
        rdr.reset();
        rdr
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `','`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.rdr.delimiter = delimiter;
        self
    }

    /// The quote character to use when parsing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut ReaderBuilder {
        self.rdr.quote = quote;
        self
    }

    /// Whether a quote character in the middle of an unquoted field opens a
    /// quoted region.
    ///
    /// When enabled (the default), `ab"cd,e"` parses as the single field
    /// `abcd,e`. When disabled, a quote is only special as the first
    /// character of a field, so `ab"cd,e` parses as the two fields `ab"cd`
    /// and `e`.
    pub fn quote_anywhere(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.rdr.quote_anywhere = yes;
        self
    }
}

impl Reader {
    /// Create a new CSV reader with a default configuration.
    pub fn new() -> Reader {
        ReaderBuilder::new().build()
    }

    /// Reset the reader so that it starts a new record.
    ///
    /// The configuration is left untouched.
    pub fn reset(&mut self) {
        self.state = State::StartRecord;
    }

    /// The current state of this reader.
    pub fn state(&self) -> State {
        self.state
    }

    /// The configured field delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The configured quote character.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// Whether mid-field quotes open a quoted region.
    pub fn is_quote_anywhere(&self) -> bool {
        self.quote_anywhere
    }

    /// Feed a single input to this reader and return what the caller
    /// should do with it.
    ///
    /// After `Action::EndRecord` or `Action::End`, the reader is ready to
    /// parse a new record.
    #[inline]
    pub fn step(&mut self, input: Input) -> Action {
        let (state, action) = self.transition(self.state, input);
        self.state = state;
        action
    }

    /// Compute the next state and action from the given state and input,
    /// using this reader's configuration.
    ///
    /// This does not read or modify the reader's own state.
    #[inline]
    pub fn transition(&self, state: State, input: Input) -> (State, Action) {
        use self::State::*;

        let c = match input {
            Input::Char(c) => c,
            Input::End if state.in_record() => {
                return (StartRecord, Action::EndRecord);
            }
            Input::End => return (StartRecord, Action::End),
        };
        match state {
            StartRecord | StartField | InField => {
                if self.quote == c && (self.quote_anywhere || state != InField)
                {
                    (InQuotedField, Action::Skip)
                } else {
                    self.transition_unquoted(c)
                }
            }
            InQuotedField => {
                if self.quote == c {
                    (QuoteInQuotedField, Action::Skip)
                } else {
                    (InQuotedField, Action::Data(c))
                }
            }
            QuoteInQuotedField => {
                if self.quote == c {
                    (InQuotedField, Action::Data(c))
                } else {
                    self.transition_unquoted(c)
                }
            }
        }
    }

    /// The transition for a character that is known not to open a quoted
    /// region.
    #[inline(always)]
    fn transition_unquoted(&self, c: char) -> (State, Action) {
        if self.delimiter == c {
            (State::StartField, Action::EndField)
        } else if c == '\n' {
            (State::StartRecord, Action::EndRecord)
        } else {
            (State::InField, Action::Data(c))
        }
    }
}

#[cfg(test)]
mod tests {
    use arrayvec::{ArrayString, ArrayVec};

    use super::{Action, Input, Reader, ReaderBuilder, State};

    type Csv = ArrayVec<Row, 10>;
    type Row = ArrayVec<Field, 10>;
    type Field = ArrayString<32>;

    macro_rules! csv {
        ($([$($field:expr),*]),*) => {{
            #[allow(unused_mut)]
            fn x() -> Csv {
                let mut csv = Csv::new();
                $(
                    let mut row = Row::new();
                    $(
                        row.push(Field::from($field).unwrap());
                    )*
                    csv.push(row);
                )*
                csv
            }
            x()
        }}
    }

    macro_rules! parses_to {
        ($name:ident, $data:expr, $expected:expr) => {
            parses_to!($name, $data, $expected, |builder| builder);
        };
        ($name:ident, $data:expr, $expected:expr, $config:expr) => {
            #[test]
            fn $name() {
                let mut builder = ReaderBuilder::new();
                $config(&mut builder);
                let mut rdr = builder.build();
                let got = parse(&mut rdr, $data);
                let expected = $expected;
                assert_eq!(expected, got);
            }
        };
    }

    fn parse(rdr: &mut Reader, data: &str) -> Csv {
        let mut csv = Csv::new();
        let mut row = Row::new();
        let mut field = Field::new();
        let mut inputs = data.chars().map(Input::Char).chain(Some(Input::End));
        loop {
            let input = inputs.next().unwrap_or(Input::End);
            match rdr.step(input) {
                Action::Skip => {}
                Action::Data(c) => field.push(c),
                Action::EndField => {
                    row.push(field);
                    field = Field::new();
                }
                Action::EndRecord => {
                    row.push(field);
                    field = Field::new();
                    csv.push(row);
                    row = Row::new();
                }
                Action::End => {
                    assert!(field.is_empty());
                    assert!(row.is_empty());
                    return csv;
                }
            }
        }
    }

    parses_to!(empty, "", csv![]);
    parses_to!(one_row_one_field, "a", csv![["a"]]);
    parses_to!(one_row_many_fields, "a,b,c", csv![["a", "b", "c"]]);
    parses_to!(one_row_trailing_comma, "a,b,", csv![["a", "b", ""]]);
    parses_to!(one_row_one_field_lf, "a\n", csv![["a"]]);
    parses_to!(one_row_many_fields_lf, "a,b,c\n", csv![["a", "b", "c"]]);
    parses_to!(one_row_trailing_comma_lf, "a,\n", csv![["a", ""]]);
    parses_to!(one_row_only_comma, ",", csv![["", ""]]);

    parses_to!(many_rows_one_field, "a\nb", csv![["a"], ["b"]]);
    parses_to!(
        many_rows_many_fields_lf,
        "a,b\nc,d\n",
        csv![["a", "b"], ["c", "d"]]
    );
    parses_to!(
        many_rows_trailing_comma,
        "a,b,\nx,y,",
        csv![["a", "b", ""], ["x", "y", ""]]
    );

    // Empty lines are not skipped. Each one is a record with one empty
    // field.
    parses_to!(empty_line, "\n", csv![[""]]);
    parses_to!(empty_lines, "\n\n", csv![[""], [""]]);
    parses_to!(empty_lines_interspersed, "a\n\nb\n", csv![["a"], [""], ["b"]]);

    // Carriage returns are data.
    parses_to!(cr_is_data, "a\r\nb\r", csv![["a\r"], ["b\r"]]);
    parses_to!(cr_only, "a\rb", csv![["a\rb"]]);

    parses_to!(quote_empty, "\"\"", csv![[""]]);
    parses_to!(quote_empty_lf, "\"\"\n", csv![[""]]);
    parses_to!(quote_lone, "\"", csv![[""]]);
    parses_to!(quote_space, "\" \"", csv![[" "]]);
    parses_to!(quote_delimiter, "a,\"b,c\"", csv![["a", "b,c"]]);
    parses_to!(
        quote_newline,
        "a,\"line1\nline2\"\nb,c\n",
        csv![["a", "line1\nline2"], ["b", "c"]]
    );
    parses_to!(
        quote_escaped,
        "a,\"he said \"\"hi\"\"\"\n",
        csv![["a", "he said \"hi\""]]
    );
    parses_to!(quote_only_escaped, "\"\"\"\"", csv![["\""]]);
    parses_to!(quote_unterminated, "a,\"b", csv![["a", "b"]]);
    parses_to!(quote_unterminated_lf, "a,\"b\nc", csv![["a", "b\nc"]]);
    parses_to!(quote_then_data, "\"ab\"cd,e", csv![["abcd", "e"]]);
    parses_to!(quote_then_lf, "\"a\"\nb", csv![["a"], ["b"]]);
    parses_to!(quote_then_delimiter_end, "\"a\",", csv![["a", ""]]);

    parses_to!(quote_mid_field, "ab\"cd,e\"", csv![["abcd,e"]]);
    parses_to!(quote_mid_field_open, "ab\"cd,e", csv![["abcd,e"]]);
    parses_to!(
        quote_mid_field_strict,
        "ab\"cd,e",
        csv![["ab\"cd", "e"]],
        |b: &mut ReaderBuilder| {
            b.quote_anywhere(false);
        }
    );
    parses_to!(
        quote_after_quoted_strict,
        "\"ab\"c\"d,e",
        csv![["abc\"d", "e"]],
        |b: &mut ReaderBuilder| {
            b.quote_anywhere(false);
        }
    );
    parses_to!(
        quote_start_strict,
        "a,\"b,c\"",
        csv![["a", "b,c"]],
        |b: &mut ReaderBuilder| {
            b.quote_anywhere(false);
        }
    );

    parses_to!(
        delimiter_tabs,
        "a\tb",
        csv![["a", "b"]],
        |b: &mut ReaderBuilder| {
            b.delimiter('\t');
        }
    );
    parses_to!(
        delimiter_unicode,
        "a§b§\"c§d\"",
        csv![["a", "b", "c§d"]],
        |b: &mut ReaderBuilder| {
            b.delimiter('§');
        }
    );
    parses_to!(
        quote_change,
        "'a,b','it''s'",
        csv![["a,b", "it's"]],
        |b: &mut ReaderBuilder| {
            b.quote('\'');
        }
    );
    parses_to!(
        quote_double_quote_is_data,
        "'a\"b'",
        csv![["a\"b"]],
        |b: &mut ReaderBuilder| {
            b.quote('\'');
        }
    );

    #[test]
    fn transition_is_pure() {
        let rdr = Reader::new();
        assert_eq!(
            rdr.transition(State::InQuotedField, Input::Char(',')),
            (State::InQuotedField, Action::Data(','))
        );
        assert_eq!(
            rdr.transition(State::QuoteInQuotedField, Input::Char('"')),
            (State::InQuotedField, Action::Data('"'))
        );
        assert_eq!(
            rdr.transition(State::QuoteInQuotedField, Input::Char('\n')),
            (State::StartRecord, Action::EndRecord)
        );
        assert_eq!(
            rdr.transition(State::QuoteInQuotedField, Input::End),
            (State::StartRecord, Action::EndRecord)
        );
        assert_eq!(
            rdr.transition(State::StartRecord, Input::End),
            (State::StartRecord, Action::End)
        );
        assert_eq!(
            rdr.transition(State::StartField, Input::End),
            (State::StartRecord, Action::EndRecord)
        );
        assert_eq!(rdr.state(), State::StartRecord);
    }

    #[test]
    fn end_is_repeatable() {
        let mut rdr = Reader::new();
        assert_eq!(rdr.step(Input::Char('a')), Action::Data('a'));
        assert_eq!(rdr.step(Input::End), Action::EndRecord);
        assert_eq!(rdr.step(Input::End), Action::End);
        assert_eq!(rdr.step(Input::End), Action::End);
    }

    #[test]
    fn reset_works() {
        let mut rdr = Reader::new();
        assert_eq!(rdr.step(Input::Char('"')), Action::Skip);
        assert!(rdr.state().in_quotes());
        rdr.reset();
        assert_eq!(rdr.state(), State::StartRecord);
        assert_eq!(rdr.step(Input::Char(',')), Action::EndField);
    }

    #[test]
    fn state_flags() {
        assert!(!State::StartRecord.in_record());
        assert!(State::StartField.in_record());
        assert!(State::QuoteInQuotedField.in_quotes());
        assert!(!State::InField.in_quotes());
    }
}
