use std::io;
use std::str;

use serde::ser::{
    Error as SerdeError, Serialize, SerializeMap, SerializeSeq,
    SerializeStruct, SerializeStructVariant, SerializeTuple,
    SerializeTupleStruct, SerializeTupleVariant, Serializer,
};

use crate::error::{Error, Result};
use crate::writer::Writer;

/// Serialize the given value as the fields of the current row of `wtr`.
///
/// This does not terminate the row.
pub(crate) fn serialize<S: Serialize + ?Sized, W: io::Write>(
    wtr: &mut Writer<W>,
    value: &S,
) -> Result<()> {
    value.serialize(&mut SeRecord { wtr })
}

struct SeRecord<'w, W: io::Write> {
    wtr: &'w mut Writer<W>,
}

impl<'a, 'w, W: io::Write> Serializer for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<()> {
        if v {
            self.wtr.write_field("true")
        } else {
            self.wtr.write_field("false")
        }
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.wtr.write_field(itoa::Buffer::new().format(v))
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.wtr.write_field(ryu::Buffer::new().format(v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.wtr.write_field(ryu::Buffer::new().format(v))
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.wtr.write_field(v.encode_utf8(&mut [0; 4]))
    }

    fn serialize_str(self, value: &str) -> Result<()> {
        self.wtr.write_field(value)
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<()> {
        match str::from_utf8(value) {
            Ok(s) => self.wtr.write_field(s),
            Err(err) => Err(Error::custom(format!(
                "byte field is not valid UTF-8: {}",
                err
            ))),
        }
    }

    fn serialize_none(self) -> Result<()> {
        self.wtr.write_field("")
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        None::<()>.serialize(self)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        self.wtr.write_field(name)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.wtr.write_field(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self> {
        Err(Error::custom(format!(
            "cannot serialize enum tuple variant {}::{} as a CSV row",
            name, variant
        )))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self> {
        Err(Error::custom("cannot serialize a map as a CSV row"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self> {
        Err(Error::custom(format!(
            "cannot serialize enum struct variant {}::{} as a CSV row",
            name, variant
        )))
    }
}

impl<'a, 'w, W: io::Write> SerializeSeq for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'w, W: io::Write> SerializeTuple for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'w, W: io::Write> SerializeTupleStruct for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

// Tuple variants, maps and struct variants are rejected before any of their
// parts reach these impls.

impl<'a, 'w, W: io::Write> SerializeTupleVariant for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _value: &T,
    ) -> Result<()> {
        unreachable!()
    }

    fn end(self) -> Result<()> {
        unreachable!()
    }
}

impl<'a, 'w, W: io::Write> SerializeMap for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, _key: &T) -> Result<()> {
        unreachable!()
    }

    fn serialize_value<T: ?Sized + Serialize>(
        &mut self,
        _value: &T,
    ) -> Result<()> {
        unreachable!()
    }

    fn end(self) -> Result<()> {
        unreachable!()
    }
}

impl<'a, 'w, W: io::Write> SerializeStruct for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'w, W: io::Write> SerializeStructVariant
    for &'a mut SeRecord<'w, W>
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<()> {
        unreachable!()
    }

    fn end(self) -> Result<()> {
        unreachable!()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;

    use crate::error::Error;
    use crate::writer::Writer;
    use crate::Dialect;

    fn serialize<S: Serialize>(record: S) -> String {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.serialize(record).unwrap();
        String::from_utf8(wtr.into_inner()).unwrap()
    }

    fn serialize_err<S: Serialize>(record: S) -> Error {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.serialize(record).unwrap_err()
    }

    #[derive(Serialize)]
    enum Color {
        Red,
    }

    #[derive(Serialize)]
    struct Meters(f64);

    #[derive(Serialize)]
    struct Record {
        name: String,
        note: Option<String>,
        count: u32,
        delta: i64,
        ratio: f32,
        ok: bool,
        color: Color,
        length: Meters,
        initial: char,
    }

    #[test]
    fn scalars() {
        assert_eq!(serialize(5u8), "5\n");
        assert_eq!(serialize(-5i64), "-5\n");
        let big = u128::max_value();
        assert_eq!(serialize(big), format!("{}\n", big));
        assert_eq!(serialize(1.5f64), "1.5\n");
        assert_eq!(serialize(true), "true\n");
        assert_eq!(serialize("a,b"), "\"a,b\"\n");
        assert_eq!(serialize(None::<u8>), "\n");
        assert_eq!(serialize(()), "\n");
    }

    #[test]
    fn struct_record() {
        let rec = Record {
            name: "he said \"hi\"".to_string(),
            note: None,
            count: 3,
            delta: -7,
            ratio: 0.25,
            ok: false,
            color: Color::Red,
            length: Meters(2.0),
            initial: '☃',
        };
        assert_eq!(
            serialize(rec),
            "\"he said \"\"hi\"\"\",,3,-7,0.25,false,Red,2.0,☃\n"
        );
    }

    #[test]
    fn tuples_and_sequences() {
        assert_eq!(serialize(("a", 1, Some(2.5))), "a,1,2.5\n");
        assert_eq!(serialize(vec!["x", "y\nz"]), "x,\"y\nz\"\n");
        assert_eq!(serialize(("a", ("b", "c"))), "a,b,c\n");
    }

    #[test]
    fn dialect_as_record() {
        assert_eq!(serialize(Dialect::default()), "\",\",\"\"\"\"\n");
    }

    #[test]
    fn bytes() {
        assert_eq!(serialize(serde_bytes_like(b"abc")), "abc\n");
        match serialize_err(serde_bytes_like(b"\xFF")) {
            Error::Serialize(msg) => assert!(msg.contains("UTF-8")),
            err => panic!("expected serialize error, got {:?}", err),
        }
    }

    #[test]
    fn map_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        match serialize_err(map) {
            Error::Serialize(msg) => assert!(msg.contains("map")),
            err => panic!("expected serialize error, got {:?}", err),
        }
    }

    #[derive(Serialize)]
    enum Shape {
        Point(i32, i32),
        Circle { r: f64 },
    }

    #[test]
    fn data_variants_are_rejected() {
        assert!(matches!(
            serialize_err(Shape::Point(1, 2)),
            Error::Serialize(_)
        ));
        assert!(matches!(
            serialize_err(Shape::Circle { r: 1.0 }),
            Error::Serialize(_)
        ));
    }

    #[test]
    fn failed_record_leaves_no_partial_row() {
        let mut wtr = Writer::from_writer(vec![]);
        let mut map = BTreeMap::new();
        map.insert("k", "v");
        assert!(wtr.serialize(("a", map)).is_err());
        wtr.serialize(("b", "c")).unwrap();
        assert_eq!(String::from_utf8(wtr.into_inner()).unwrap(), "b,c\n");
    }

    /// A value that serializes itself as raw bytes.
    struct Bytes<'a>(&'a [u8]);

    impl<'a> Serialize for Bytes<'a> {
        fn serialize<S: serde::Serializer>(
            &self,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            s.serialize_bytes(self.0)
        }
    }

    fn serde_bytes_like(bytes: &[u8]) -> Bytes<'_> {
        Bytes(bytes)
    }
}
