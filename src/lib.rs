#![doc = include_str!("../README.md")]

pub mod array;
pub mod deck;
pub mod geometry;
mod grid;
pub mod mesh;
pub mod parse;
pub mod prelude;
mod traits;
mod utils;
mod write_vtk;

pub use deck::{Deck, DeckBuilder, GridDimensions};

pub use geometry::{cell, reconstruct, Cell, CellIndex, CornerPointGeometry};

pub use grid::Grid;

pub use mesh::{assemble, build_mesh, CellArray, CellData, HexGrid, Mesh, MeshDiagnostics};

pub use parse::{
    expand_scalars, load_cell_data, load_cell_data_file, parse_grdecl, read_grdecl, ParseError,
};

pub use traits::{Array, DataArray, Domain, Encode};
pub use utils::to_flat;
pub use write_vtk::{export_vtu, write_appended_dataarray_header, write_dataarray, write_vtk};

pub use ndarray;

pub use quick_xml::writer::Writer;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error while reading the grid description: {0}")]
    Parse(#[from] parse::ParseError),
    #[error("The grid is not defined: SPECGRID, COORD and ZCORN are all required")]
    GridNotDefined,
    #[error("Could not attach cell data: {0}")]
    PropertySizeMismatch(parse::SizeMismatch),
    #[error("Could not attach cell data: the name {name} is already used by the mesh")]
    ReservedArrayName { name: String },
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
}

/// The encoding of the data arrays in an exported file, picked at runtime.
///
/// The marker types [`Ascii`], [`Base64`] and [`Binary`] are the compile time equivalents
/// used with [`write_vtk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// whitespace separated numbers inside each `DataArray`
    Ascii,
    /// base64 encoded little endian bytes inside each `DataArray`
    Base64,
    /// raw little endian bytes in a trailing `AppendedData` section
    #[default]
    Binary,
}

impl Encoding {
    /// value of the `format` attribute of a `DataArray` written with this encoding
    pub(crate) fn format(&self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Base64 => "binary",
            Self::Binary => "appended",
        }
    }
}

/// Binary encoding marker type
#[derive(Debug, Clone, PartialEq)]
pub struct Binary;

/// base64 encoding marker type
#[derive(Debug, Clone)]
pub struct Base64;

/// ascii encoding marker type
#[derive(Debug, Clone, PartialEq)]
pub struct Ascii;

impl traits::Encode for Binary {
    fn encoding() -> Encoding {
        Encoding::Binary
    }
}

impl traits::Encode for Ascii {
    fn encoding() -> Encoding {
        Encoding::Ascii
    }
}

impl traits::Encode for Base64 {
    fn encoding() -> Encoding {
        Encoding::Base64
    }
}
