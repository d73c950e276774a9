//! # Mesh Assembly
//!
//! A [`Mesh`] is the unstructured form of a corner-point grid that is handed to the VTK writer:
//! every cell becomes an independent hexahedron with its own eight points (corners shared by
//! neighbouring cells are not merged, so faults stay visible), together with the per-cell arrays
//! of the deck.
//!
//! Cells are never removed. When the deck carries an `ACTNUM` mask, inactive cells are kept
//! and flagged in a `vtkGhostType` array so viewers can hide them.
//!
//! [`HexGrid`] implements [`Domain`](crate::Domain) and [`CellData`] implements
//! [`DataArray`](crate::DataArray), so a mesh can be written with any of the encodings.

use crate::array::Vector3;
use crate::geometry::{self, CornerPointGeometry};
use crate::parse::SizeMismatch;
use crate::prelude::*;
use crate::write_vtk::write_dataarray;

use tracing::info;

/// VTK cell type id of a linear hexahedron
pub const VTK_HEXAHEDRON: u8 = 12;

/// `vtkGhostType` flag for a cell that should not be shown
pub const DUPLICATE_CELL: u8 = 1;

/// Maps the corner order of a cell to the node order of a `VTK_HEXAHEDRON`: corners 2/3 and
/// 6/7 are swapped so that each face is walked around its edge
pub const HEXAHEDRON_NODE_ORDER: [usize; 8] = [0, 1, 3, 2, 4, 5, 7, 6];

/// name of the ghost array in the exported file
pub const GHOST_ARRAY_NAME: &str = "vtkGhostType";

/// Points and hexahedral connectivity
#[derive(Debug, Clone, PartialEq)]
pub struct HexGrid {
    points: Vector3<f64>,
    connectivity: Vec<i64>,
    offsets: Vec<i64>,
    types: Vec<u8>,
}

impl HexGrid {
    /// Build the hexahedra for points laid out 8 per cell in corner order
    pub fn from_cell_points(points: Vec<[f64; 3]>) -> Self {
        let num_cells = points.len() / 8;

        let connectivity = (0..num_cells)
            .flat_map(|cell| {
                HEXAHEDRON_NODE_ORDER
                    .iter()
                    .map(move |corner| (8 * cell + corner) as i64)
            })
            .collect();

        let offsets = (1..=num_cells).map(|cell| 8 * cell as i64).collect();

        Self {
            points: Vector3::new(points),
            connectivity,
            offsets,
            types: vec![VTK_HEXAHEDRON; num_cells],
        }
    }

    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// point indices of every cell, 8 per cell in VTK node order
    pub fn connectivity(&self) -> &[i64] {
        &self.connectivity
    }

    /// end of every cell's run in [`connectivity`](Self::connectivity)
    pub fn offsets(&self) -> &[i64] {
        &self.offsets
    }

    pub fn cell_types(&self) -> &[u8] {
        &self.types
    }

    /// the point indices of cell `cell`, in VTK node order
    pub fn cell_nodes(&self, cell: usize) -> &[i64] {
        &self.connectivity[8 * cell..8 * cell + 8]
    }
}

impl<E: Encode> Domain<E> for HexGrid {
    fn write_mesh_header<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        use quick_xml::events::{BytesEnd, BytesStart, Event};

        let encoding = E::encoding();
        let mut offset = 0;

        writer.write_event(Event::Start(BytesStart::new("Points")))?;
        write_dataarray(writer, &self.points, "Points", encoding, &mut offset)?;
        writer.write_event(Event::End(BytesEnd::new("Points")))?;

        writer.write_event(Event::Start(BytesStart::new("Cells")))?;
        write_dataarray(writer, &self.connectivity, "connectivity", encoding, &mut offset)?;
        write_dataarray(writer, &self.offsets, "offsets", encoding, &mut offset)?;
        write_dataarray(writer, &self.types, "types", encoding, &mut offset)?;
        writer.write_event(Event::End(BytesEnd::new("Cells")))?;

        Ok(())
    }

    fn write_mesh_appended<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        if !E::is_binary() {
            return Ok(());
        }

        self.points.write_binary(writer)?;
        self.connectivity.write_binary(writer)?;
        self.offsets.write_binary(writer)?;
        self.types.write_binary(writer)?;

        Ok(())
    }

    fn mesh_bytes(&self) -> usize {
        self.points.appended_bytes()
            + self.connectivity.appended_bytes()
            + self.offsets.appended_bytes()
            + self.types.appended_bytes()
    }

    fn num_points(&self) -> usize {
        self.points.len()
    }

    fn num_cells(&self) -> usize {
        self.types.len()
    }
}

/// A named array with one value per cell
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct CellArray {
    pub name: String,
    pub values: Vec<f64>,
}

/// Everything written to the `CellData` section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    actnum: Option<Vec<u8>>,
    arrays: Vec<CellArray>,
    ghost: Option<Vec<u8>>,
}

impl CellData {
    /// the `ACTNUM` mask as 0 / 1 flags
    pub fn actnum(&self) -> Option<&[u8]> {
        self.actnum.as_deref()
    }

    /// `DUPLICATE_CELL` for inactive cells and 0 for the rest
    pub fn ghost(&self) -> Option<&[u8]> {
        self.ghost.as_deref()
    }

    pub fn arrays(&self) -> &[CellArray] {
        &self.arrays
    }

    pub fn array(&self, name: &str) -> Option<&[f64]> {
        self.arrays
            .iter()
            .find(|array| array.name == name)
            .map(|array| array.values.as_slice())
    }

    /// Add an array, replacing one with the same name
    fn insert(&mut self, array: CellArray) {
        match self.arrays.iter_mut().find(|a| a.name == array.name) {
            Some(existing) => *existing = array,
            None => self.arrays.push(array),
        }
    }
}

impl<E: Encode> DataArray<E> for CellData {
    fn write_array_header<W: Write>(
        &self,
        writer: &mut Writer<W>,
        starting_offset: i64,
    ) -> Result<(), Error> {
        let encoding = E::encoding();
        let mut offset = starting_offset;

        if let Some(actnum) = &self.actnum {
            write_dataarray(writer, actnum, "ACTNUM", encoding, &mut offset)?;
        }

        for array in &self.arrays {
            write_dataarray(writer, &array.values, &array.name, encoding, &mut offset)?;
        }

        if let Some(ghost) = &self.ghost {
            write_dataarray(writer, ghost, GHOST_ARRAY_NAME, encoding, &mut offset)?;
        }

        Ok(())
    }

    fn write_array_appended<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), Error> {
        if !E::is_binary() {
            return Ok(());
        }

        if let Some(actnum) = &self.actnum {
            actnum.write_binary(writer)?;
        }

        for array in &self.arrays {
            array.values.write_binary(writer)?;
        }

        if let Some(ghost) = &self.ghost {
            ghost.write_binary(writer)?;
        }

        Ok(())
    }
}

/// Counts reported alongside an assembled mesh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshDiagnostics {
    /// corner placements that fell on a collapsed pillar
    pub collapsed_pillars: usize,
    pub active_cells: usize,
    pub inactive_cells: usize,
}

/// An unstructured hexahedral mesh with its cell arrays. See the [module documentation](self).
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    grid: HexGrid,
    cell_data: CellData,
    diagnostics: MeshDiagnostics,
}

impl Mesh {
    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn cell_data(&self) -> &CellData {
        &self.cell_data
    }

    pub fn diagnostics(&self) -> MeshDiagnostics {
        self.diagnostics
    }

    pub fn num_cells(&self) -> usize {
        self.grid.types.len()
    }

    pub fn num_points(&self) -> usize {
        self.grid.points.len()
    }

    /// A cell array by its (uppercase) name
    pub fn cell_array(&self, name: &str) -> Option<&[f64]> {
        self.cell_data.array(name)
    }

    /// Attach an array that did not come from the deck. The name is stored uppercased and
    /// replaces an array of the same name. `ACTNUM` and `vtkGhostType` are written from the
    /// mask and can't be attached.
    pub fn attach_cell_data(&mut self, name: &str, values: Vec<f64>) -> Result<(), Error> {
        check_attachable(name)?;
        let name = name.to_uppercase();

        if values.len() != self.num_cells() {
            let mismatch = SizeMismatch::new(name, "NX*NY*NZ", self.num_cells(), values.len());
            return Err(Error::PropertySizeMismatch(mismatch));
        }

        self.cell_data.insert(CellArray::new(name, values));
        Ok(())
    }
}

/// Fails for names that collide with the arrays built from the `ACTNUM` mask
pub(crate) fn check_attachable(name: &str) -> Result<(), Error> {
    let upper = name.to_uppercase();
    if upper == "ACTNUM" || upper == GHOST_ARRAY_NAME.to_uppercase() {
        return Err(Error::ReservedArrayName {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Turn reconstructed geometry into a mesh, attaching the deck's `ACTNUM` mask and properties
pub fn assemble(deck: &Deck, geometry: CornerPointGeometry) -> Mesh {
    let collapsed_pillars = geometry.collapsed_pillars();
    let grid = HexGrid::from_cell_points(geometry.into_points());
    let num_cells = grid.types.len();

    let mut cell_data = CellData::default();

    let mut diagnostics = MeshDiagnostics {
        collapsed_pillars,
        active_cells: num_cells,
        inactive_cells: 0,
    };

    if let Some(mask) = deck.active_mask() {
        let actnum: Vec<u8> = mask.iter().map(|active| u8::from(*active)).collect();
        let ghost = actnum
            .iter()
            .map(|flag| if *flag == 0 { DUPLICATE_CELL } else { 0 })
            .collect();

        diagnostics.inactive_cells = actnum.iter().filter(|flag| **flag == 0).count();
        diagnostics.active_cells = num_cells - diagnostics.inactive_cells;

        cell_data.actnum = Some(actnum);
        cell_data.ghost = Some(ghost);
    }

    for (name, values) in deck.properties() {
        cell_data.insert(CellArray::new(name.to_uppercase(), values.to_vec()));
    }

    info!(
        cells = num_cells,
        active = diagnostics.active_cells,
        inactive = diagnostics.inactive_cells,
        "assembled mesh"
    );

    Mesh {
        grid,
        cell_data,
        diagnostics,
    }
}

/// Reconstruct the geometry of `deck` and assemble it into a mesh in one go
pub fn build_mesh(deck: &Deck) -> Result<Mesh, Error> {
    let geometry = geometry::reconstruct(deck)?;
    Ok(assemble(deck, geometry))
}
