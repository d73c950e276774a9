//! Common traits and types that are useful for working with `grdecl`
#![allow(unused_imports)]

pub use crate::deck::{Deck, GridDimensions};
pub use crate::mesh::Mesh;
pub use crate::traits::{Array, DataArray, Domain, Encode};
pub use crate::{Ascii, Base64, Binary, Encoding};

pub(crate) use crate::array::{Numeric, Precision};
pub(crate) use crate::parse::ParseError;
pub(crate) use crate::Error;

pub(crate) use std::io::{BufRead, Write};

pub(crate) use derive_more::{Constructor, Deref, Display, From, Into};

pub(crate) use quick_xml::Writer;
