use crate::prelude::*;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::info;

const STARTING_OFFSET: i64 = 0;

/// Write a mesh as a VTK XML `UnstructuredGrid` to a `Writer`
///
/// The encoding of every array is picked with the marker type `E`:
///
/// ```no_run
/// let deck = grdecl::read_grdecl("dome.grdecl")?;
/// let mesh = grdecl::build_mesh(&deck)?;
///
/// let file = std::fs::File::create("dome.vtu")?;
/// grdecl::write_vtk::<grdecl::Base64, _>(std::io::BufWriter::new(file), &mesh)?;
/// # Ok::<(), grdecl::Error>(())
/// ```
pub fn write_vtk<E, W>(writer: W, mesh: &Mesh) -> Result<(), Error>
where
    E: Encode,
    W: Write,
{
    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut vtk_file = BytesStart::new("VTKFile");
    vtk_file.push_attribute(("type", "UnstructuredGrid"));
    vtk_file.push_attribute(("version", "1.0"));
    vtk_file.push_attribute(("byte_order", "LittleEndian"));
    vtk_file.push_attribute(("header_type", "UInt64"));
    writer.write_event(Event::Start(vtk_file))?;

    writer.write_event(Event::Start(BytesStart::new("UnstructuredGrid")))?;

    let grid = mesh.grid();
    let num_points = Domain::<E>::num_points(grid).to_string();
    let num_cells = Domain::<E>::num_cells(grid).to_string();

    let mut piece = BytesStart::new("Piece");
    piece.push_attribute(("NumberOfPoints", num_points.as_str()));
    piece.push_attribute(("NumberOfCells", num_cells.as_str()));
    writer.write_event(Event::Start(piece))?;

    // write the mesh information out
    Domain::<E>::write_mesh_header(grid, &mut writer)?;

    // either write the cell arrays inline here or write only the headers w/ offsets
    // and write the data as binary after the mesh
    let starting_offset = if E::is_binary() {
        Domain::<E>::mesh_bytes(grid) as i64
    } else {
        STARTING_OFFSET
    };

    writer.write_event(Event::Start(BytesStart::new("CellData")))?;
    DataArray::<E>::write_array_header(mesh.cell_data(), &mut writer, starting_offset)?;
    writer.write_event(Event::End(BytesEnd::new("CellData")))?;

    writer.write_event(Event::End(BytesEnd::new("Piece")))?;
    writer.write_event(Event::End(BytesEnd::new("UnstructuredGrid")))?;

    if E::is_binary() {
        appended_binary_header_start(&mut writer)?;

        // implementations will do nothing if they are not responsible for writing any binary
        // information
        Domain::<E>::write_mesh_appended(grid, &mut writer)?;
        DataArray::<E>::write_array_appended(mesh.cell_data(), &mut writer)?;

        appended_binary_header_end(&mut writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    Ok(())
}

/// Write `mesh` to the file at `path` with a runtime choice of encoding
pub fn export_vtu<P: AsRef<Path>>(path: P, mesh: &Mesh, encoding: Encoding) -> Result<(), Error> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);

    match encoding {
        Encoding::Ascii => write_vtk::<Ascii, _>(writer, mesh)?,
        Encoding::Base64 => write_vtk::<Base64, _>(writer, mesh)?,
        Encoding::Binary => write_vtk::<Binary, _>(writer, mesh)?,
    }

    info!(path = %path.display(), ?encoding, "wrote unstructured grid");

    Ok(())
}

pub(crate) fn appended_binary_header_start<W: Write>(
    writer: &mut Writer<W>,
) -> Result<(), std::io::Error> {
    let inner = writer.inner();
    inner.write_all(b"\n  <AppendedData encoding=\"raw\">\n    _")?;
    Ok(())
}

pub(crate) fn appended_binary_header_end<W: Write>(
    writer: &mut Writer<W>,
) -> Result<(), std::io::Error> {
    let inner = writer.inner();
    inner.write_all(b"\n  </AppendedData>")?;
    Ok(())
}

pub(crate) fn write_inline_array_header<W: Write>(
    writer: &mut Writer<W>,
    format: Encoding,
    name: &str,
    components: usize,
    precision: Precision,
) -> Result<(), Error> {
    let components = components.to_string();

    let mut array = BytesStart::new("DataArray");
    array.push_attribute(("type", precision.as_str()));
    array.push_attribute(("NumberOfComponents", components.as_str()));
    array.push_attribute(("Name", name));
    array.push_attribute(("format", format.format()));
    writer.write_event(Event::Start(array))?;

    Ok(())
}

pub(crate) fn close_inline_array_header<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    writer.write_event(Event::End(BytesEnd::new("DataArray")))?;

    Ok(())
}

/// Write the `DataArray` element for a single array.
///
/// With [`Encoding::Ascii`] and [`Encoding::Base64`] the values are written inline. With
/// [`Encoding::Binary`] only the header is written, pointing at `offset`, and `offset` is
/// advanced past the block the array will take up in the appended section. The caller is then
/// responsible for writing the arrays with [`Array::write_binary`] in the same order.
pub fn write_dataarray<W, A>(
    writer: &mut Writer<W>,
    data: &A,
    name: &str,
    encoding: Encoding,
    offset: &mut i64,
) -> Result<(), Error>
where
    W: Write,
    A: Array + ?Sized,
{
    match encoding {
        Encoding::Ascii => data.write_ascii(writer, name)?,
        Encoding::Base64 => data.write_base64(writer, name)?,
        Encoding::Binary => {
            write_appended_dataarray_header(
                writer,
                name,
                *offset,
                data.components(),
                data.precision(),
            )?;
            *offset += data.appended_bytes() as i64;
        }
    };

    Ok(())
}

/// write the header for an appended data array that will later be written in the appended
/// section of the vtk.
///
/// if you call this function you are also responsible for calling
/// [`Array::write_binary`] with the data in the correct order
#[inline]
pub fn write_appended_dataarray_header<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    offset: i64,
    components: usize,
    precision: Precision,
) -> Result<(), Error> {
    let components = components.to_string();
    let offset = offset.to_string();

    let mut array = BytesStart::new("DataArray");
    array.push_attribute(("type", precision.as_str()));
    array.push_attribute(("NumberOfComponents", components.as_str()));
    array.push_attribute(("Name", name));
    array.push_attribute(("format", Encoding::Binary.format()));
    array.push_attribute(("offset", offset.as_str()));
    writer.write_event(Event::Empty(array))?;

    Ok(())
}
