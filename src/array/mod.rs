//! element types and the [`Array`] implementations for the buffers a mesh is made of
//!
//! Scalars are written from `[NUM]` slices (or `Vec`s), point coordinates from a [`Vector3`]
//! where every entry becomes one 3-component tuple.

use crate::prelude::*;
use crate::write_vtk::{close_inline_array_header, write_inline_array_header};

use num_traits::ToBytes;
use quick_xml::events::{BytesText, Event};

/// size of the `UInt64` byte count in front of every binary block
pub const HEADER_BYTES: usize = std::mem::size_of::<u64>();

/// The `type` attribute of a `DataArray`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Precision {
    #[display(fmt = "Float32")]
    Float32,
    #[display(fmt = "Float64")]
    Float64,
    #[display(fmt = "UInt8")]
    UInt8,
    #[display(fmt = "Int64")]
    Int64,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::UInt8 => "UInt8",
            Self::Int64 => "Int64",
        }
    }
}

/// A number that can be stored in a `DataArray`
pub trait Numeric: Copy + ToBytes {
    const SIZE: usize;

    fn as_precision() -> Precision;

    /// append the ascii form of the number to `buffer`
    fn push_ascii(&self, buffer: &mut String);

    fn extend_le_bytes(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(self.to_le_bytes().as_ref());
    }

    fn write_le_bytes<W: Write>(&self, writer: &mut W) -> Result<(), std::io::Error> {
        writer.write_all(self.to_le_bytes().as_ref())
    }
}

macro_rules! float_numeric {
    ($type:ty, $precision:ident) => {
        impl Numeric for $type {
            const SIZE: usize = std::mem::size_of::<$type>();

            fn as_precision() -> Precision {
                Precision::$precision
            }

            fn push_ascii(&self, buffer: &mut String) {
                let mut ryu_buffer = ryu::Buffer::new();
                buffer.push_str(ryu_buffer.format(*self));
            }
        }
    };
}

macro_rules! int_numeric {
    ($type:ty, $precision:ident) => {
        impl Numeric for $type {
            const SIZE: usize = std::mem::size_of::<$type>();

            fn as_precision() -> Precision {
                Precision::$precision
            }

            fn push_ascii(&self, buffer: &mut String) {
                use std::fmt::Write as _;
                // writing to a String cannot fail
                let _ = write!(buffer, "{self}");
            }
        }
    };
}

float_numeric!(f32, Float32);
float_numeric!(f64, Float64);
int_numeric!(u8, UInt8);
int_numeric!(i64, Int64);

fn write_ascii_values<'a, W, NUM, I>(
    writer: &mut Writer<W>,
    name: &str,
    components: usize,
    values: I,
) -> Result<(), Error>
where
    W: Write,
    NUM: Numeric + 'a,
    I: Iterator<Item = &'a NUM>,
{
    write_inline_array_header(
        writer,
        Encoding::Ascii,
        name,
        components,
        NUM::as_precision(),
    )?;

    let mut data = String::new();
    for value in values {
        value.push_ascii(&mut data);
        data.push(' ');
    }

    let data = Event::Text(BytesText::new(data.trim_end()));
    writer.write_event(data)?;

    close_inline_array_header(writer)?;

    Ok(())
}

fn write_base64_values<'a, W, NUM, I>(
    writer: &mut Writer<W>,
    name: &str,
    components: usize,
    length: usize,
    values: I,
) -> Result<(), Error>
where
    W: Write,
    NUM: Numeric + 'a,
    I: Iterator<Item = &'a NUM>,
{
    write_inline_array_header(
        writer,
        Encoding::Base64,
        name,
        components,
        NUM::as_precision(),
    )?;

    let payload = length * NUM::SIZE;
    let mut byte_data: Vec<u8> = Vec::with_capacity(HEADER_BYTES + payload);

    // the block starts with its length in bytes, encoded along with the data
    byte_data.extend_from_slice(&(payload as u64).to_le_bytes());

    values.for_each(|value| value.extend_le_bytes(&mut byte_data));

    let data = base64::encode(byte_data.as_slice());

    let characters = Event::Text(BytesText::new(&data));
    writer.write_event(characters)?;

    close_inline_array_header(writer)?;

    Ok(())
}

fn write_binary_values<'a, W, NUM, I>(
    writer: &mut Writer<W>,
    length: usize,
    values: I,
) -> Result<(), Error>
where
    W: Write,
    NUM: Numeric + 'a,
    I: Iterator<Item = &'a NUM>,
{
    let writer = writer.inner();

    let payload = (length * NUM::SIZE) as u64;
    writer.write_all(&payload.to_le_bytes())?;

    for value in values {
        value.write_le_bytes(writer)?;
    }

    Ok(())
}

impl<NUM> Array for [NUM]
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        write_ascii_values(writer, name, 1, self.iter())
    }

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        write_base64_values(writer, name, 1, self.len(), self.iter())
    }

    fn write_binary<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        write_binary_values(writer, self.len(), self.iter())
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }

    fn size_of_elem(&self) -> usize {
        NUM::SIZE
    }
}

/// A run of 3-component tuples, such as point coordinates
#[derive(Debug, Clone, Default, PartialEq, Deref, From, Into, Constructor)]
pub struct Vector3<NUM>(Vec<[NUM; 3]>);

impl<NUM> Array for Vector3<NUM>
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        write_ascii_values(writer, name, 3, self.iter().flatten())
    }

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        write_base64_values(writer, name, 3, self.length(), self.iter().flatten())
    }

    fn write_binary<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        write_binary_values(writer, self.length(), self.iter().flatten())
    }

    fn length(&self) -> usize {
        3 * self.len()
    }

    fn components(&self) -> usize {
        3
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }

    fn size_of_elem(&self) -> usize {
        NUM::SIZE
    }
}

impl<NUM> Array for Vec<NUM>
where
    NUM: Numeric,
{
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        self.as_slice().write_ascii(writer, name)
    }

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
        self.as_slice().write_base64(writer, name)
    }

    fn write_binary<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        self.as_slice().write_binary(writer)
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn precision(&self) -> Precision {
        NUM::as_precision()
    }

    fn size_of_elem(&self) -> usize {
        NUM::SIZE
    }
}
