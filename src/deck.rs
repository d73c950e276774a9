//! # Deck
//!
//! A [`Deck`] is the parsed and validated in-memory form of a GRDECL grid description: the
//! grid dimensions, the pillar lines from `COORD`, the corner depths from `ZCORN`, an optional
//! `ACTNUM` mask and any number of per-cell properties. It also keeps the keywords the parser
//! encountered so callers can report what was (and was not) understood.
//!
//! Decks are only ever built through a [`DeckBuilder`], which checks every section against
//! the grid dimensions before storing it. Once built a deck is read-only; the geometry
//! reconstruction and mesh assembly steps only borrow it.

use crate::parse::SizeMismatch;
use crate::prelude::*;

use ndarray::ArrayView3;
use std::collections::BTreeMap;
use std::fmt;

/// length of a per-cell section
pub const CELLS_FORMULA: &str = "NX*NY*NZ";
/// length of the `COORD` section
pub const COORD_FORMULA: &str = "6*(NX+1)*(NY+1)";
/// length of the `ZCORN` section
pub const ZCORN_FORMULA: &str = "2*NX*2*NY*2*NZ";

/// Logical size of a corner-point grid. All three extents are strictly positive and every
/// section length derived from them fits in a `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl GridDimensions {
    /// Returns `None` if any extent is zero or the `COORD` / `ZCORN` lengths overflow
    pub fn new(nx: usize, ny: usize, nz: usize) -> Option<Self> {
        if nx == 0 || ny == 0 || nz == 0 {
            return None;
        }

        nx.checked_mul(ny)?.checked_mul(nz)?.checked_mul(8)?;
        nx.checked_add(1)?
            .checked_mul(ny.checked_add(1)?)?
            .checked_mul(6)?;

        Some(Self { nx, ny, nz })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn nz(&self) -> usize {
        self.nz
    }

    /// `NX * NY * NZ`
    pub fn num_cells(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// number of pillars in the `(NX+1) x (NY+1)` pillar lattice
    pub fn num_pillars(&self) -> usize {
        (self.nx + 1) * (self.ny + 1)
    }

    /// required length of the `COORD` section
    pub fn coord_len(&self) -> usize {
        6 * self.num_pillars()
    }

    /// required length of the `ZCORN` section
    pub fn zcorn_len(&self) -> usize {
        8 * self.num_cells()
    }

    /// flat index of the cell `(i, j, k)`
    #[inline]
    pub fn to_flat(&self, i: usize, j: usize, k: usize) -> usize {
        crate::to_flat(i, j, k, self.nx, self.ny, self.nz)
    }

    /// flat index of the pillar at lattice position `(pi, pj)`
    #[inline]
    pub fn pillar_index(&self, pi: usize, pj: usize) -> usize {
        crate::to_flat(pi, pj, 0, self.nx + 1, self.ny + 1, 1)
    }

    /// flat index into `ZCORN` of a position on the doubled `(2NX, 2NY, 2NZ)` depth grid
    #[inline]
    pub fn depth_index(&self, i: usize, j: usize, k: usize) -> usize {
        crate::to_flat(i, j, k, 2 * self.nx, 2 * self.ny, 2 * self.nz)
    }
}

impl fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} x {}", self.nx, self.ny, self.nz)
    }
}

/// A straight reference line given by its top and bottom point. Cell corners are placed on
/// pillars by interpolating along them with the corner's depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pillar {
    pub top: [f64; 3],
    pub bottom: [f64; 3],
}

/// The `COORD` section: six floats `x_top y_top z_top x_bot y_bot z_bot` per pillar.
#[derive(Deref, Into, Debug, Clone, PartialEq)]
pub struct Pillars(Vec<f64>);

impl Pillars {
    /// Fetch the pillar with the flat lattice index `index`
    ///
    /// ## Panics
    ///
    /// if `index` is outside of the pillar lattice
    #[inline]
    pub fn pillar(&self, index: usize) -> Pillar {
        let p = &self.0[6 * index..6 * index + 6];

        Pillar {
            top: [p[0], p[1], p[2]],
            bottom: [p[3], p[4], p[5]],
        }
    }

    /// number of pillars stored
    pub fn num_pillars(&self) -> usize {
        self.0.len() / 6
    }
}

/// The `ZCORN` section: eight depth values per cell laid out over the doubled grid.
#[derive(Deref, Into, Debug, Clone, PartialEq)]
pub struct DepthField(Vec<f64>);

/// Parsed GRDECL grid description. See the [module documentation](self).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    dims: Option<GridDimensions>,
    pillars: Option<Pillars>,
    depths: Option<DepthField>,
    active: Option<Vec<bool>>,
    properties: BTreeMap<String, Vec<f64>>,
    keywords: Vec<String>,
    unrecognized: Vec<String>,
}

impl Deck {
    pub fn dimensions(&self) -> Option<GridDimensions> {
        self.dims
    }

    pub fn pillars(&self) -> Option<&Pillars> {
        self.pillars.as_ref()
    }

    pub fn depths(&self) -> Option<&DepthField> {
        self.depths.as_ref()
    }

    /// `ACTNUM` as booleans (`true` = active), if the deck had one
    pub fn active_mask(&self) -> Option<&[bool]> {
        self.active.as_deref()
    }

    /// A stored per-cell property, looked up by its keyword name
    pub fn property(&self, name: &str) -> Option<&[f64]> {
        self.properties.get(name).map(Vec::as_slice)
    }

    /// All per-cell properties, ordered by name
    pub fn properties(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.properties
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Value of property `name` for the cell with flat index `cell`
    pub fn cell_property(&self, name: &str, cell: usize) -> Option<f64> {
        self.property(name).and_then(|values| values.get(cell).copied())
    }

    /// A property viewed as a 3D array with shape `(NZ, NY, NX)`
    pub fn property_view(&self, name: &str) -> Option<ArrayView3<'_, f64>> {
        let dims = self.dims?;
        let values = self.property(name)?;
        ArrayView3::from_shape((dims.nz, dims.ny, dims.nx), values).ok()
    }

    /// The active mask viewed as a 3D array with shape `(NZ, NY, NX)`
    pub fn active_view(&self) -> Option<ArrayView3<'_, bool>> {
        let dims = self.dims?;
        let active = self.active_mask()?;
        ArrayView3::from_shape((dims.nz, dims.ny, dims.nx), active).ok()
    }

    /// Recognized keywords in the order they were first seen across all included files
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Keywords the parser did not understand, each listed once
    pub fn unrecognized_keywords(&self) -> &[String] {
        &self.unrecognized
    }

    /// `true` once dimensions, `COORD` and `ZCORN` are all present
    pub fn is_grid_defined(&self) -> bool {
        self.dims.is_some() && self.pillars.is_some() && self.depths.is_some()
    }

    /// Borrow everything the geometry reconstruction needs, or fail with
    /// [`Error::GridNotDefined`]
    pub fn corner_point_grid(&self) -> Result<(GridDimensions, &Pillars, &DepthField), Error> {
        match (self.dims, &self.pillars, &self.depths) {
            (Some(dims), Some(pillars), Some(depths)) => Ok((dims, pillars, depths)),
            _ => Err(Error::GridNotDefined),
        }
    }

    pub(crate) fn record_keyword(&mut self, keyword: &str) {
        if !self.keywords.iter().any(|k| k == keyword) {
            self.keywords.push(keyword.to_string());
        }
    }
}

/// Mutable state threaded through a parse (including every nested `INCLUDE`).
///
/// Each setter validates the section length against the grid dimensions, so a
/// [`Deck`] produced by [`finish`](DeckBuilder::finish) always satisfies the length invariants.
#[derive(Debug, Default)]
pub struct DeckBuilder {
    deck: Deck,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> Option<GridDimensions> {
        self.deck.dims
    }

    /// Dimensions may only be set once per deck
    pub fn set_dimensions(&mut self, dims: GridDimensions) -> Result<(), ParseError> {
        if self.deck.dims.is_some() {
            return Err(ParseError::DuplicateDimensions);
        }

        self.deck.dims = Some(dims);
        Ok(())
    }

    /// The dimensions a size-dependent `keyword` is checked against
    pub fn require_dimensions(&self, keyword: &str) -> Result<GridDimensions, ParseError> {
        self.deck
            .dims
            .ok_or_else(|| ParseError::DimensionsNotYetDefined {
                keyword: keyword.to_string(),
            })
    }

    pub fn set_pillars(&mut self, coord: Vec<f64>) -> Result<(), ParseError> {
        let dims = self.require_dimensions("COORD")?;
        check_len("COORD", COORD_FORMULA, dims.coord_len(), coord.len())?;
        self.deck.pillars = Some(Pillars(coord));
        Ok(())
    }

    pub fn set_depths(&mut self, zcorn: Vec<f64>) -> Result<(), ParseError> {
        let dims = self.require_dimensions("ZCORN")?;
        check_len("ZCORN", ZCORN_FORMULA, dims.zcorn_len(), zcorn.len())?;
        self.deck.depths = Some(DepthField(zcorn));
        Ok(())
    }

    /// Any non-zero entry marks the cell as active
    pub fn set_active(&mut self, actnum: Vec<i64>) -> Result<(), ParseError> {
        let dims = self.require_dimensions("ACTNUM")?;
        check_len("ACTNUM", CELLS_FORMULA, dims.num_cells(), actnum.len())?;
        self.deck.active = Some(actnum.into_iter().map(|flag| flag != 0).collect());
        Ok(())
    }

    /// Store a per-cell property, replacing an earlier section with the same name
    pub fn insert_property(&mut self, name: &str, values: Vec<f64>) -> Result<(), ParseError> {
        let dims = self.require_dimensions(name)?;
        check_len(name, CELLS_FORMULA, dims.num_cells(), values.len())?;
        self.deck.properties.insert(name.to_string(), values);
        Ok(())
    }

    /// Remember a recognized keyword; repeats keep their first position
    pub fn record_keyword(&mut self, keyword: &str) {
        self.deck.record_keyword(keyword);
    }

    /// Remember an unrecognized keyword once
    pub fn record_unrecognized(&mut self, keyword: &str) -> bool {
        if self.deck.unrecognized.iter().any(|k| k == keyword) {
            return false;
        }

        self.deck.unrecognized.push(keyword.to_string());
        true
    }

    pub fn finish(self) -> Deck {
        self.deck
    }
}

fn check_len(
    keyword: &str,
    formula: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ParseError> {
    if expected != actual {
        let mismatch = SizeMismatch::new(keyword.to_string(), formula, expected, actual);
        return Err(ParseError::SectionSizeMismatch(mismatch));
    }

    Ok(())
}
