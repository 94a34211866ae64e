/// The delimiter and quote character shared by a reader and a writer.
///
/// Both [`ReaderBuilder`](struct.ReaderBuilder.html) and
/// [`WriterBuilder`](struct.WriterBuilder.html) accept a dialect, so one
/// value can configure both ends of a pipeline. With the `serde` feature
/// enabled, a dialect can also be loaded from a configuration file. Missing
/// keys take their default values.
///
/// ```
/// use lenient_csv::Dialect;
///
/// let d = Dialect::new().delimiter(';');
/// assert_eq!(d.delimiter, ';');
/// assert_eq!(d.quote, '"');
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Dialect {
    /// The field delimiter. The default is `','`.
    pub delimiter: char,
    /// The quote character. The default is `'"'`.
    pub quote: char,
}

impl Default for Dialect {
    fn default() -> Dialect {
        Dialect { delimiter: ',', quote: '"' }
    }
}

impl Dialect {
    /// The default dialect: comma delimited, double quoted.
    pub fn new() -> Dialect {
        Dialect::default()
    }

    /// Tab separated values, double quoted.
    pub fn tsv() -> Dialect {
        Dialect { delimiter: '\t', ..Dialect::default() }
    }

    /// Return this dialect with a different delimiter.
    pub fn delimiter(self, delimiter: char) -> Dialect {
        Dialect { delimiter, ..self }
    }

    /// Return this dialect with a different quote character.
    pub fn quote(self, quote: char) -> Dialect {
        Dialect { quote, ..self }
    }
}
