use std::fmt;
use std::iter::FromIterator;
use std::ops::{self, Range};

/// A single CSV row: an ordered sequence of fields.
///
/// All fields are stored contiguously in one `String`, along with the end
/// offset of every field. This means a row can be reused across reads
/// without allocating once it has grown large enough.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct Row {
    /// All fields in this row, stored contiguously.
    fields: String,
    /// The ending offset of each field. Always on a char boundary.
    ends: Vec<usize>,
}

impl Row {
    /// Create a new empty `Row`.
    pub fn new() -> Row {
        Row::default()
    }

    /// Create a new empty `Row` with room for `buffer` bytes of field data
    /// and `fields` fields.
    pub fn with_capacity(buffer: usize, fields: usize) -> Row {
        Row {
            fields: String::with_capacity(buffer),
            ends: Vec::with_capacity(fields),
        }
    }

    /// Returns the number of fields in this row.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Returns true if and only if this row has no fields.
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.range(i).map(|range| &self.fields[range])
    }

    /// Returns an iterator over all fields in this row.
    pub fn iter(&self) -> RowIter<'_> {
        RowIter { row: self, front: 0, back: self.len() }
    }

    /// Add a new field to the end of this row.
    pub fn push_field(&mut self, field: &str) {
        self.fields.push_str(field);
        self.ends.push(self.fields.len());
    }

    /// Clear this row so that it has zero fields.
    ///
    /// The allocated capacity is kept.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.ends.clear();
    }

    /// Return the text of all fields concatenated, without any separators.
    pub fn as_str(&self) -> &str {
        &self.fields
    }

    /// Append a character to the field that is currently being built.
    ///
    /// The field only becomes visible once `end_field` is called.
    #[inline]
    pub(crate) fn push_char(&mut self, ch: char) {
        self.fields.push(ch);
    }

    /// Close the field that is currently being built.
    #[inline]
    pub(crate) fn end_field(&mut self) {
        self.ends.push(self.fields.len());
    }

    fn range(&self, i: usize) -> Option<Range<usize>> {
        let end = *self.ends.get(i)?;
        let start = match i.checked_sub(1) {
            None => 0,
            Some(j) => self.ends[j],
        };
        Some(start..end)
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row(")?;
        f.debug_list().entries(self.iter()).finish()?;
        write!(f, ")")
    }
}

impl ops::Index<usize> for Row {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        match self.get(i) {
            Some(field) => field,
            None => panic!(
                "index out of bounds: the row has {} fields but the index \
                 is {}",
                self.len(),
                i
            ),
        }
    }
}

impl<T: AsRef<str>> PartialEq<[T]> for Row {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| {
                let b: &str = b.as_ref();
                a == b
            })
    }
}

impl<'a, T: AsRef<str>> PartialEq<&'a [T]> for Row {
    fn eq(&self, other: &&'a [T]) -> bool {
        self == *other
    }
}

impl<T: AsRef<str>> PartialEq<Vec<T>> for Row {
    fn eq(&self, other: &Vec<T>) -> bool {
        self == other.as_slice()
    }
}

impl<T: AsRef<str>> From<Vec<T>> for Row {
    fn from(fields: Vec<T>) -> Row {
        Row::from_iter(fields)
    }
}

impl<'a, T: AsRef<str>> From<&'a [T]> for Row {
    fn from(fields: &'a [T]) -> Row {
        Row::from_iter(fields)
    }
}

impl<T: AsRef<str>> FromIterator<T> for Row {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Row {
        let mut row = Row::new();
        row.extend(iter);
        row
    }
}

impl<T: AsRef<str>> Extend<T> for Row {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for field in iter {
            self.push_field(field.as_ref());
        }
    }
}

impl<'r> IntoIterator for &'r Row {
    type IntoIter = RowIter<'r>;
    type Item = &'r str;

    fn into_iter(self) -> RowIter<'r> {
        self.iter()
    }
}

/// An iterator over the fields in a row.
///
/// The `'r` lifetime variable refers to the lifetime of the `Row` that is
/// being iterated over.
#[derive(Clone, Debug)]
pub struct RowIter<'r> {
    row: &'r Row,
    /// The index of the next field yielded from the front.
    front: usize,
    /// One past the index of the next field yielded from the back.
    back: usize,
}

impl<'r> Iterator for RowIter<'r> {
    type Item = &'r str;

    fn next(&mut self) -> Option<&'r str> {
        if self.front == self.back {
            return None;
        }
        let field = self.row.get(self.front);
        self.front += 1;
        field
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<'r> DoubleEndedIterator for RowIter<'r> {
    fn next_back(&mut self) -> Option<&'r str> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.row.get(self.back)
    }
}

impl<'r> ExactSizeIterator for RowIter<'r> {}
