//! # Traits
//!
//! The traits used to write a [`Mesh`](crate::Mesh) to a VTK XML file. They split the file
//! into the part describing the geometry ([`Domain`]: the `Points` and `Cells` sections) and the
//! part holding the per-cell values ([`DataArray`]: the `CellData` section). Both are generic
//! over an encoding marker ([`Ascii`](crate::Ascii), [`Base64`](crate::Base64) or
//! [`Binary`](crate::Binary)) implementing [`Encode`].
//!
//! With the binary encoding the headers only carry an `offset` into the appended section, and
//! the raw bytes are written once every header is out:
//!
//! ```ignore
//! <?xml version="1.0" encoding="UTF-8"?>
//! <VTKFile type="UnstructuredGrid" version="1.0" byte_order="LittleEndian" header_type="UInt64">
//!   <UnstructuredGrid>
//!     <Piece NumberOfPoints="64" NumberOfCells="8">
//!       <Points>
//!         <DataArray type="Float64" NumberOfComponents="3" Name="Points" format="appended" offset="0"/>
//!       </Points>
//!       <Cells>
//!         <DataArray type="Int64" NumberOfComponents="1" Name="connectivity" format="appended" offset="1544"/>
//!         <DataArray type="Int64" NumberOfComponents="1" Name="offsets" format="appended" offset="2064"/>
//!         <DataArray type="UInt8" NumberOfComponents="1" Name="types" format="appended" offset="2136"/>
//!       </Cells>
//!       <CellData>
//!         <DataArray type="Float64" NumberOfComponents="1" Name="PORO" format="appended" offset="2152"/>
//!       </CellData>
//!     </Piece>
//!   </UnstructuredGrid>
//!   <AppendedData encoding="raw">
//!     _binary data here
//!   </AppendedData>
//! </VTKFile>
//! ```

use crate::prelude::*;

/// Describes how to write the per-cell values of a mesh.
///
/// If the encoding is base64 or ascii, `write_array_header` writes the data inside each
/// element and `write_array_appended` does nothing. If the encoding is binary, the header
/// only records the offset of each array and the bytes are written by `write_array_appended`.
pub trait DataArray<Encoding> {
    /// Write all the arrays in the `<CellData>` section of the file
    ///
    /// `starting_offset` is the offset (in bytes, from the `_` marker) of the first array's
    /// block in the appended section.
    fn write_array_header<W: Write>(
        &self,
        writer: &mut Writer<W>,
        starting_offset: i64,
    ) -> Result<(), Error>;

    /// If the encoding is binary, write all of the binary information to the appended
    /// section of the file (raw bytes)
    fn write_array_appended<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error>;
}

/// A flat run of numbers that can be written as a single `DataArray` element
pub trait Array {
    fn write_ascii<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error>;

    fn write_base64<W: Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<(), Error>;

    /// write the data to the appended section in binary form, preceded by its `UInt64` byte
    /// count
    ///
    /// You must ensure that you have called `write_appended_dataarray_header` with
    /// the correct offset before calling this function.
    fn write_binary<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error>;

    /// total number of scalar values (tuples times components)
    fn length(&self) -> usize;

    fn components(&self) -> usize {
        1
    }

    fn precision(&self) -> Precision;

    fn size_of_elem(&self) -> usize;

    /// number of bytes this array takes in the appended section, header included
    fn appended_bytes(&self) -> usize {
        crate::array::HEADER_BYTES + self.length() * self.size_of_elem()
    }
}

/// Describes how to write the geometry and topology of a mesh
pub trait Domain<Encoding> {
    /// Write the `<Points>` and `<Cells>` sections of the file
    ///
    /// If the encoding is base64 or ascii, this function should write the data in the element.
    /// If the encoding is binary, then this function will only write information about the length
    /// and offset of the arrays and `write_mesh_appended` will handle writing the binary data.
    fn write_mesh_header<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error>;

    /// If writing binary encoded data, this function writes raw binary information to the writer.
    ///
    /// If the encoding is base64 / ascii, this function does nothing.
    fn write_mesh_appended<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error>;

    /// number of raw bytes (not encoded in base64 / ascii) that are contained in this mesh
    fn mesh_bytes(&self) -> usize;

    fn num_points(&self) -> usize;

    fn num_cells(&self) -> usize;
}

/// Implemented by the encoding marker types
pub trait Encode {
    fn encoding() -> Encoding;

    fn is_binary() -> bool {
        Self::encoding() == Encoding::Binary
    }
}
