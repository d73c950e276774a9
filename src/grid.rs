//! the [`Grid`] workflow: open a deck, build its mesh, attach extra data and export it

use crate::prelude::*;
use crate::write_vtk::export_vtu;
use crate::{load_cell_data_file, mesh, read_grdecl};

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

/// directory, next to the deck, that exported files are written to
pub const RESULTS_DIR: &str = "Results";

/// A GRDECL deck together with the mesh built from it.
///
/// ```no_run
/// use grdecl::{Encoding, Grid};
///
/// let mut grid = Grid::open("tests/data/dome.grdecl")?;
/// grid.process_grid()?;
/// grid.load_cell_data("tests/data/dome_Temperature.txt", "TEMP")?;
///
/// // writes tests/data/Results/dome.vtu
/// let path = grid.export_data(Encoding::Binary)?;
/// println!("{grid}\nwrote {}", path.display());
/// # Ok::<(), grdecl::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    path: PathBuf,
    deck: Deck,
    mesh: Option<Mesh>,
    extra: Vec<(String, Vec<f64>)>,
}

impl Grid {
    /// Read the deck at `path` and every file it includes
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let deck = read_grdecl(&path)?;

        Ok(Self {
            path,
            deck,
            mesh: None,
            extra: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// the mesh, once [`process_grid`](Self::process_grid) has run
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Reconstruct the geometry and assemble the mesh, attaching any data loaded so far
    pub fn process_grid(&mut self) -> Result<&Mesh, Error> {
        let mut mesh = mesh::build_mesh(&self.deck)?;

        for (name, values) in &self.extra {
            mesh.attach_cell_data(name, values.clone())?;
        }

        Ok(self.mesh.insert(mesh))
    }

    /// Read a per-cell property from its own file and attach it as `name` (uppercased).
    ///
    /// The grid has to be defined; `name` is added to the deck's keyword list. Loading the same
    /// name again replaces the earlier values.
    pub fn load_cell_data<P: AsRef<Path>>(&mut self, path: P, name: &str) -> Result<(), Error> {
        let (dims, _, _) = self.deck.corner_point_grid()?;
        mesh::check_attachable(name)?;

        let name = name.to_uppercase();
        let values = load_cell_data_file(path, &name, dims)?;
        self.deck.record_keyword(&name);

        if let Some(mesh) = self.mesh.as_mut() {
            mesh.attach_cell_data(&name, values.clone())?;
        }

        match self.extra.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = values,
            None => self.extra.push((name, values)),
        }

        Ok(())
    }

    /// Where [`export_data`](Self::export_data) writes: `Results/<deck stem>.vtu` next to the
    /// deck
    pub fn export_path(&self) -> PathBuf {
        let dir = self.path.parent().unwrap_or_else(|| Path::new(""));
        let stem = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "grid".to_string());

        dir.join(RESULTS_DIR).join(format!("{stem}.vtu"))
    }

    /// Write the mesh to [`export_path`](Self::export_path), building it first if needed.
    /// Returns the path written.
    pub fn export_data(&mut self, encoding: Encoding) -> Result<PathBuf, Error> {
        if self.mesh.is_none() {
            self.process_grid()?;
        }

        let path = self.export_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        if let Some(mesh) = &self.mesh {
            export_vtu(&path, mesh, encoding)?;
        }

        info!(path = %path.display(), "exported grid");
        Ok(path)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = "-".repeat(78);

        let dims = self
            .deck
            .dimensions()
            .map(|dims| dims.to_string())
            .unwrap_or_else(|| "undefined".to_string());
        let num_cells = self
            .deck
            .dimensions()
            .map(|dims| dims.num_cells())
            .unwrap_or(0);

        writeln!(f, "{header}")?;
        writeln!(f, "{:<35} value", "keywords")?;
        writeln!(f, "{header}")?;
        writeln!(f, "{:<35} {}", "cart_dims", dims)?;
        writeln!(f, "{:<35} {}", "num_cell", num_cells)?;
        writeln!(f, "{:<35} {}", "keywords", self.deck.keywords().join(", "))?;
        writeln!(
            f,
            "{:<35} {}",
            "unrec",
            self.deck.unrecognized_keywords().join(", ")
        )?;

        if let Some(mesh) = &self.mesh {
            let diagnostics = mesh.diagnostics();
            writeln!(f, "{:<35} {}", "collapsed_pillars", diagnostics.collapsed_pillars)?;
            writeln!(f, "{:<35} {}", "inactive_cells", diagnostics.inactive_cells)?;
        }

        write!(f, "{header}")
    }
}
