use grdecl::{Deck, Grid, GridDimensions};

use std::path::Path;

const DOME: &str = "tests/data/dome.grdecl";

fn assert_close(actual: [f64; 3], expected: [f64; 3]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
    }
}

fn dome() -> Deck {
    grdecl::read_grdecl(DOME).unwrap()
}

#[test]
fn deck_follows_includes() {
    let deck = dome();

    assert_eq!(deck.dimensions(), GridDimensions::new(20, 20, 4));
    assert_eq!(deck.pillars().unwrap().num_pillars(), 21 * 21);
    assert_eq!(deck.depths().unwrap().len(), 8 * 1600);

    assert_eq!(
        deck.keywords(),
        [
            "SPECGRID", "COORDSYS", "INCLUDE", "COORD", "ZCORN", "ACTNUM", "PORO", "PERMX",
            "PERMY", "PERMZ", "SO"
        ]
    );
    assert_eq!(deck.unrecognized_keywords(), ["MAPAXES"]);

    for name in ["PORO", "PERMX", "PERMY", "PERMZ", "SO"] {
        assert_eq!(deck.property(name).map(<[f64]>::len), Some(1600), "{name}");
    }
}

#[test]
fn property_layers() {
    let deck = dome();
    let poro = deck.property_view("PORO").unwrap();

    assert_eq!(poro.shape(), &[4, 20, 20]);
    assert_eq!(poro[[0, 5, 5]], 0.20);
    assert_eq!(poro[[2, 19, 0]], 0.25);
    assert_eq!(poro[[3, 0, 19]], 0.18);

    let active = deck.active_view().unwrap();
    assert!(active[[3, 18, 7]]);
    assert!(!active[[3, 19, 7]]);
}

#[test]
fn collapsed_pillar_count() {
    let deck = dome();
    let geometry = grdecl::reconstruct(&deck).unwrap();

    assert_eq!(geometry.num_cells(), 1600);
    assert_eq!(geometry.points().len(), 8 * 1600);
    // 17 zero-height interior pillars, each carrying 32 corners
    assert_eq!(geometry.collapsed_pillars(), 544);
}

#[test]
fn corners_lie_on_their_pillars() {
    let deck = dome();

    // pillar (0, 0) runs from (0, 0, 1000) to (0, 0, 1200); depth 1040 + 60 at the corner
    let first = grdecl::cell(&deck, 0, 0, 0).unwrap();
    assert_close(first.corners[0], [0.0, 0.0, 1100.0]);

    // pillar (1, 1) runs from (50, 50, 1000) to (50.1, 50.1, 1200); bottom depth 1108.6
    let t = (1108.6 - 1000.0) / 200.0;
    assert_close(first.corners[7], [50.0 + 0.1 * t, 50.0 + 0.1 * t, 1108.6]);

    // pillar (2, 10) has zero height: its corners keep the top x / y
    let collapsed = grdecl::cell(&deck, 2, 10, 1).unwrap();
    assert_close(collapsed.corners[0], [100.0, 500.0, 1079.2]);
    assert_close(collapsed.corners[4], [100.0, 500.0, 1099.2]);

    let geometry = grdecl::reconstruct(&deck).unwrap();
    let flat = deck.dimensions().unwrap().to_flat(2, 10, 1);
    assert_eq!(geometry.cell_corners(flat), collapsed.corners.as_slice());
}

#[test]
fn cell_properties() {
    let deck = dome();
    let cell = grdecl::cell(&deck, 7, 19, 3).unwrap();

    assert!(!cell.active);
    assert_eq!(cell.flat, 1587);
    assert_eq!(cell.property(&deck, "SO"), Some(0.8));
    assert_eq!(cell.property(&deck, "PERMZ"), Some(10.0));
    assert_eq!(cell.property(&deck, "NTG"), None);
}

#[test]
fn mesh_diagnostics() {
    let mesh = grdecl::build_mesh(&dome()).unwrap();
    let diagnostics = mesh.diagnostics();

    assert_eq!(mesh.num_cells(), 1600);
    assert_eq!(mesh.num_points(), 12800);
    assert_eq!(diagnostics.collapsed_pillars, 544);
    assert_eq!(diagnostics.inactive_cells, 20);
    assert_eq!(diagnostics.active_cells, 1580);

    let ghost = mesh.cell_data().ghost().unwrap();
    assert_eq!(ghost.iter().filter(|flag| **flag == 1).count(), 20);
    assert_eq!(ghost[1579], 0);
    assert_eq!(ghost[1580], 1);

    let names: Vec<_> = mesh
        .cell_data()
        .arrays()
        .iter()
        .map(|array| array.name.as_str())
        .collect();
    assert_eq!(names, ["PERMX", "PERMY", "PERMZ", "PORO", "SO"]);
}

#[test]
fn grid_workflow() {
    let mut grid = Grid::open(DOME).unwrap();
    grid.load_cell_data("tests/data/dome_Temperature.txt", "TEMP")
        .unwrap();

    assert_eq!(grid.deck().keywords().last().map(String::as_str), Some("TEMP"));

    let mesh = grid.process_grid().unwrap();
    let temp = mesh.cell_array("TEMP").unwrap();
    assert_eq!(temp.len(), 1600);
    assert!(temp.iter().all(|t| *t == 75.5));

    let summary = grid.to_string();
    assert!(summary.contains("20 x 20 x 4"));
    assert!(summary.contains("MAPAXES"));
    assert!(summary.contains("544"));
}

#[test]
fn reload_cell_data_after_processing() {
    let mut grid = Grid::open(DOME).unwrap();
    grid.process_grid().unwrap();

    grid.load_cell_data("tests/data/dome_Temperature.txt", "TEMP")
        .unwrap();
    assert_eq!(grid.mesh().unwrap().cell_array("TEMP").unwrap()[0], 75.5);

    let warmer = std::env::temp_dir().join("grdecl_dome_warmer_temperature.txt");
    std::fs::write(&warmer, "TEMP\n1600*80 /\n").unwrap();
    grid.load_cell_data(&warmer, "temp").unwrap();

    let temp_keywords = grid
        .deck()
        .keywords()
        .iter()
        .filter(|keyword| *keyword == "TEMP")
        .count();
    assert_eq!(temp_keywords, 1);

    let mesh = grid.mesh().unwrap();
    let temp_arrays = mesh
        .cell_data()
        .arrays()
        .iter()
        .filter(|array| array.name == "TEMP")
        .count();
    assert_eq!(temp_arrays, 1);

    let temp = mesh.cell_array("TEMP").unwrap();
    assert_eq!(temp.len(), 1600);
    assert!(temp.iter().all(|t| *t == 80.0));

    // rebuilding the mesh keeps the latest values
    let mesh = grid.process_grid().unwrap();
    assert!(mesh.cell_array("TEMP").unwrap().iter().all(|t| *t == 80.0));
    assert_eq!(mesh.cell_data().arrays().len(), 6);
}

#[test]
fn mask_names_are_not_loadable() {
    let mut grid = Grid::open(DOME).unwrap();
    let err = grid
        .load_cell_data("tests/data/dome_Temperature.txt", "actnum")
        .unwrap_err();

    assert!(matches!(err, grdecl::Error::ReservedArrayName { .. }));
    assert!(!grid.deck().keywords().iter().any(|k| k == "actnum"));
}

#[test]
fn load_cell_data_needs_a_grid() {
    let deck = "SPECGRID\n20 20 4 /\n";
    let path = std::env::temp_dir().join("grdecl_specgrid_only.grdecl");
    std::fs::write(&path, deck).unwrap();

    let mut grid = Grid::open(&path).unwrap();
    let err = grid
        .load_cell_data("tests/data/dome_Temperature.txt", "TEMP")
        .unwrap_err();

    assert!(matches!(err, grdecl::Error::GridNotDefined));
    assert!(matches!(grid.process_grid(), Err(grdecl::Error::GridNotDefined)));
}

#[test]
fn export_path_is_next_to_deck() {
    let grid = Grid::open(DOME).unwrap();
    assert_eq!(
        grid.export_path(),
        Path::new("tests/data").join("Results").join("dome.vtu")
    );
}
