//! # Corner-point geometry
//!
//! Turns the sparse pillar + depth description of a [`Deck`] into explicit coordinates for
//! the eight corners of every cell.
//!
//! Cell `(i, j)` is bounded by the pillars at lattice positions `(i, j)`, `(i+1, j)`,
//! `(i, j+1)` and `(i+1, j+1)`, called p0..p3. Its corner depths live on the doubled
//! `(2NX, 2NY, 2NZ)` grid: z0..z3 on layer `2k` and z4..z7 on layer `2k+1`, each layer in the
//! same p0..p3 order. Corner `c` sits on pillar `c % 4` at depth `zc`:
//!
//! ```text
//!    6 --------- 7
//!   /|  bottom  /|
//!  / |  face   / |
//! 4 --------- 5  |
//! |  |        |  |
//! |  2 -------|- 3
//! | /   top   | /
//! |/    face  |/
//! 0 --------- 1
//! ```
//!
//! Pillars whose top and bottom depth coincide are "collapsed". Such a pillar is taken to be
//! vertical: every corner on it uses the top `(x, y)` unchanged.

use crate::deck::{DepthField, Pillar, Pillars};
use crate::prelude::*;

use tracing::info;

/// Absolute depth difference below which a pillar counts as collapsed
pub const COINCIDENCE_TOLERANCE: f64 = 2.2204e-14;

impl Pillar {
    /// `true` when top and bottom are at the same depth
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        (self.bottom[2] - self.top[2]).abs() < COINCIDENCE_TOLERANCE
    }

    /// The point on this pillar at `depth`. The returned `z` is `depth` itself.
    #[inline]
    pub fn point_at_depth(&self, depth: f64) -> [f64; 3] {
        let [xt, yt, zt] = self.top;
        let [xb, yb, zb] = self.bottom;

        let t = if self.is_collapsed() {
            0.0
        } else {
            (depth - zt) / (zb - zt)
        };

        [xt + t * (xb - xt), yt + t * (yb - yt), depth]
    }
}

/// logical position of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl CellIndex {
    pub fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }

    /// inverse of [`GridDimensions::to_flat`]
    pub fn from_flat(flat: usize, dims: GridDimensions) -> Self {
        let layer = dims.nx() * dims.ny();

        Self {
            i: flat % dims.nx(),
            j: (flat % layer) / dims.nx(),
            k: flat / layer,
        }
    }
}

/// A single cell with its corners in the 0..7 order of the [module docs](self)
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub index: CellIndex,
    pub flat: usize,
    pub corners: [[f64; 3]; 8],
    pub active: bool,
}

impl Cell {
    /// this cell's value of a deck property
    pub fn property(&self, deck: &Deck, name: &str) -> Option<f64> {
        deck.cell_property(name, self.flat)
    }
}

/// Reconstructed corner coordinates for a whole grid
#[derive(Debug, Clone, PartialEq)]
pub struct CornerPointGeometry {
    dims: GridDimensions,
    points: Vec<[f64; 3]>,
    collapsed_pillars: usize,
}

impl CornerPointGeometry {
    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// `8 * num_cells` points, cell by cell
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn num_cells(&self) -> usize {
        self.points.len() / 8
    }

    /// the eight corners of the cell with flat index `cell`
    pub fn cell_corners(&self, cell: usize) -> &[[f64; 3]] {
        &self.points[8 * cell..8 * cell + 8]
    }

    /// Number of corner placements that fell on a collapsed pillar. A pillar shared by
    /// several corners is counted once for each of them.
    pub fn collapsed_pillars(&self) -> usize {
        self.collapsed_pillars
    }

    pub fn into_points(self) -> Vec<[f64; 3]> {
        self.points
    }
}

/// Compute the corners of every cell in the deck.
///
/// Fails with [`Error::GridNotDefined`] unless the deck has dimensions, `COORD` and `ZCORN`.
pub fn reconstruct(deck: &Deck) -> Result<CornerPointGeometry, Error> {
    let (dims, pillars, depths) = deck.corner_point_grid()?;

    let mut points = vec![[0.0; 3]; 8 * dims.num_cells()];
    let collapsed_pillars = fill_points(dims, pillars, depths, &mut points);

    info!(
        cells = dims.num_cells(),
        collapsed_pillars, "reconstructed corner point geometry"
    );

    Ok(CornerPointGeometry {
        dims,
        points,
        collapsed_pillars,
    })
}

#[cfg(not(feature = "parallel"))]
fn fill_points(
    dims: GridDimensions,
    pillars: &Pillars,
    depths: &DepthField,
    points: &mut [[f64; 3]],
) -> usize {
    points
        .chunks_exact_mut(8)
        .enumerate()
        .map(|(flat, corners)| {
            let index = CellIndex::from_flat(flat, dims);
            cell_corners_into(dims, pillars, depths, index, corners)
        })
        .sum()
}

#[cfg(feature = "parallel")]
fn fill_points(
    dims: GridDimensions,
    pillars: &Pillars,
    depths: &DepthField,
    points: &mut [[f64; 3]],
) -> usize {
    use rayon::prelude::*;

    points
        .par_chunks_exact_mut(8)
        .enumerate()
        .map(|(flat, corners)| {
            let index = CellIndex::from_flat(flat, dims);
            cell_corners_into(dims, pillars, depths, index, corners)
        })
        .sum()
}

/// Compute a single cell on demand.
///
/// ## Panics
///
/// if `(i, j, k)` lies outside of the grid
pub fn cell(deck: &Deck, i: usize, j: usize, k: usize) -> Result<Cell, Error> {
    let (dims, pillars, depths) = deck.corner_point_grid()?;

    assert!(
        i < dims.nx() && j < dims.ny() && k < dims.nz(),
        "cell ({i}, {j}, {k}) is outside of a {dims} grid"
    );

    let index = CellIndex::new(i, j, k);
    let flat = dims.to_flat(i, j, k);

    let mut corners = [[0.0; 3]; 8];
    cell_corners_into(dims, pillars, depths, index, &mut corners);

    let active = deck
        .active_mask()
        .map(|mask| mask[flat])
        .unwrap_or(true);

    Ok(Cell {
        index,
        flat,
        corners,
        active,
    })
}

/// the four pillars p0..p3 bounding column `(i, j)`
fn cell_pillars(dims: GridDimensions, pillars: &Pillars, i: usize, j: usize) -> [Pillar; 4] {
    [
        pillars.pillar(dims.pillar_index(i, j)),
        pillars.pillar(dims.pillar_index(i + 1, j)),
        pillars.pillar(dims.pillar_index(i, j + 1)),
        pillars.pillar(dims.pillar_index(i + 1, j + 1)),
    ]
}

/// the depths z0..z7 of cell `index`
fn cell_depths(dims: GridDimensions, depths: &DepthField, index: CellIndex) -> [f64; 8] {
    let CellIndex { i, j, k } = index;
    let (i, j, k) = (2 * i, 2 * j, 2 * k);

    [
        depths[dims.depth_index(i, j, k)],
        depths[dims.depth_index(i + 1, j, k)],
        depths[dims.depth_index(i, j + 1, k)],
        depths[dims.depth_index(i + 1, j + 1, k)],
        depths[dims.depth_index(i, j, k + 1)],
        depths[dims.depth_index(i + 1, j, k + 1)],
        depths[dims.depth_index(i, j + 1, k + 1)],
        depths[dims.depth_index(i + 1, j + 1, k + 1)],
    ]
}

/// write the corners of `index` into `out`, returning how many of them sit on a collapsed pillar
fn cell_corners_into(
    dims: GridDimensions,
    pillars: &Pillars,
    depths: &DepthField,
    index: CellIndex,
    out: &mut [[f64; 3]],
) -> usize {
    let pillars = cell_pillars(dims, pillars, index.i, index.j);
    let zs = cell_depths(dims, depths, index);

    let mut collapsed = 0;

    for (corner, (point, depth)) in out.iter_mut().zip(zs).enumerate() {
        let pillar = &pillars[corner % 4];

        if pillar.is_collapsed() {
            collapsed += 1;
        }

        *point = pillar.point_at_depth(depth);
    }

    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::DeckBuilder;

    /// 1 x 1 x 1 cell between slanted pillars that shift by +1 in x over 10 units of depth
    fn slanted_deck(zcorn: Vec<f64>) -> Deck {
        let mut builder = DeckBuilder::new();
        builder
            .set_dimensions(GridDimensions::new(1, 1, 1).unwrap())
            .unwrap();

        #[rustfmt::skip]
        let coord = vec![
            0.0, 0.0, 0.0,   1.0, 0.0, 10.0,
            1.0, 0.0, 0.0,   2.0, 0.0, 10.0,
            0.0, 1.0, 0.0,   1.0, 1.0, 10.0,
            1.0, 1.0, 0.0,   2.0, 1.0, 10.0,
        ];
        builder.set_pillars(coord).unwrap();
        builder.set_depths(zcorn).unwrap();
        builder.finish()
    }

    #[test]
    fn missing_grid() {
        let deck = DeckBuilder::new().finish();
        assert!(matches!(reconstruct(&deck), Err(Error::GridNotDefined)));
    }

    #[test]
    fn interpolates_along_pillars() {
        let zcorn = vec![0.0, 0.0, 0.0, 0.0, 5.0, 5.0, 5.0, 10.0];
        let geometry = reconstruct(&slanted_deck(zcorn)).unwrap();

        assert_eq!(geometry.num_cells(), 1);
        assert_eq!(geometry.collapsed_pillars(), 0);

        let corners = geometry.cell_corners(0);
        assert_eq!(corners[0], [0.0, 0.0, 0.0]);
        assert_eq!(corners[1], [1.0, 0.0, 0.0]);
        assert_eq!(corners[2], [0.0, 1.0, 0.0]);
        assert_eq!(corners[3], [1.0, 1.0, 0.0]);
        assert_eq!(corners[4], [0.5, 0.0, 5.0]);
        assert_eq!(corners[5], [1.5, 0.0, 5.0]);
        assert_eq!(corners[6], [0.5, 1.0, 5.0]);
        assert_eq!(corners[7], [2.0, 1.0, 10.0]);
    }

    #[test]
    fn collapsed_pillar_counts_every_corner() {
        let mut builder = DeckBuilder::new();
        builder
            .set_dimensions(GridDimensions::new(1, 1, 1).unwrap())
            .unwrap();

        // p1 is collapsed: top and bottom both at z = 3 but displaced in x
        #[rustfmt::skip]
        let coord = vec![
            0.0, 0.0, 0.0,   0.0, 0.0, 10.0,
            1.0, 0.0, 3.0,   9.0, 0.0, 3.0,
            0.0, 1.0, 0.0,   0.0, 1.0, 10.0,
            1.0, 1.0, 0.0,   1.0, 1.0, 10.0,
        ];
        builder.set_pillars(coord).unwrap();
        builder
            .set_depths(vec![2.0, 2.0, 2.0, 2.0, 8.0, 8.0, 8.0, 8.0])
            .unwrap();
        let deck = builder.finish();

        let geometry = reconstruct(&deck).unwrap();
        // p1 carries corners 1 and 5
        assert_eq!(geometry.collapsed_pillars(), 2);

        let corners = geometry.cell_corners(0);
        assert_eq!(corners[1], [1.0, 0.0, 2.0]);
        assert_eq!(corners[5], [1.0, 0.0, 8.0]);
    }

    #[test]
    fn pillar_order_is_preserved() {
        // 2 x 2 x 1 grid of unit columns; corner x/y must come from the right lattice pillars
        let mut builder = DeckBuilder::new();
        let dims = GridDimensions::new(2, 2, 1).unwrap();
        builder.set_dimensions(dims).unwrap();

        let mut coord = Vec::new();
        for pj in 0..3 {
            for pi in 0..3 {
                let (x, y) = (pi as f64, pj as f64);
                coord.extend([x, y, 0.0, x, y, 1.0]);
            }
        }
        builder.set_pillars(coord).unwrap();
        builder.set_depths(vec![0.0; 16].into_iter().chain(vec![1.0; 16]).collect()).unwrap();
        let deck = builder.finish();

        let geometry = reconstruct(&deck).unwrap();
        let last = geometry.cell_corners(3);
        assert_eq!(last[0], [1.0, 1.0, 0.0]);
        assert_eq!(last[1], [2.0, 1.0, 0.0]);
        assert_eq!(last[2], [1.0, 2.0, 0.0]);
        assert_eq!(last[3], [2.0, 2.0, 0.0]);
        assert_eq!(last[7], [2.0, 2.0, 1.0]);

        let single = cell(&deck, 1, 1, 0).unwrap();
        assert_eq!(single.flat, 3);
        assert_eq!(single.corners.as_slice(), last);
        assert!(single.active);
    }

    #[test]
    fn flat_index_inverse() {
        let dims = GridDimensions::new(3, 4, 5).unwrap();

        for flat in 0..dims.num_cells() {
            let CellIndex { i, j, k } = CellIndex::from_flat(flat, dims);
            assert_eq!(dims.to_flat(i, j, k), flat);
        }
    }

    #[test]
    #[should_panic]
    fn cell_out_of_range() {
        let deck = slanted_deck(vec![0.0; 8]);
        let _ = cell(&deck, 1, 0, 0);
    }
}
