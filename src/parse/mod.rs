//! reading and parsing GRDECL decks
//!
//! The loader scans a deck line by line. Lines starting with a keyword are dispatched on the
//! [`Keyword`] they hold; everything else between keywords is skipped. Sections belonging to
//! known keywords are read with the [section reader](section) and validated against the
//! grid dimensions before they are stored in a [`DeckBuilder`].
//!
//! `INCLUDE` files are parsed recursively into the same builder, so dimensions declared in one
//! file apply to sections in another, and [`Deck::keywords`] lists keywords in the order they
//! were met across the whole include tree.

mod error;
mod keyword;
pub mod section;

pub use error::{ParseError, SizeMismatch};
pub use keyword::Keyword;
pub use section::{expand_scalars, read_section, read_values, LineSource};

use crate::deck::{DeckBuilder, CELLS_FORMULA, COORD_FORMULA, ZCORN_FORMULA};
use crate::prelude::*;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Read an entire GRDECL deck from `path`, following any `INCLUDE`d files
pub fn read_grdecl<P: AsRef<Path>>(path: P) -> Result<Deck, ParseError> {
    let mut builder = DeckBuilder::new();
    read_grdecl_into(path.as_ref(), &mut builder)?;
    Ok(builder.finish())
}

/// Parse a GRDECL deck from any reader. `INCLUDE` paths are resolved relative to `base_dir`.
pub fn parse_grdecl<R: BufRead>(reader: R, base_dir: &Path) -> Result<Deck, ParseError> {
    let mut builder = DeckBuilder::new();
    parse_into(LineSource::new(reader), base_dir, &mut builder)?;
    Ok(builder.finish())
}

/// Parse the deck at `path` into an existing builder. This is how `INCLUDE`d files share the
/// dimensions and keyword lists of the deck including them.
pub fn read_grdecl_into(path: &Path, builder: &mut DeckBuilder) -> Result<(), ParseError> {
    let file = open(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    parse_into(LineSource::new(BufReader::new(file)), base_dir, builder)
}

fn open(path: &Path) -> Result<File, ParseError> {
    File::open(path).map_err(|source| ParseError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_into<R: BufRead>(
    mut source: LineSource<R>,
    base_dir: &Path,
    builder: &mut DeckBuilder,
) -> Result<(), ParseError> {
    while let Some(line) = source.next_line()? {
        let keyword = match Keyword::from_line(&line) {
            Some(keyword) => keyword,
            None => continue,
        };

        match &keyword {
            Keyword::SpecGrid => {
                if builder.dimensions().is_some() {
                    return Err(ParseError::DuplicateDimensions);
                }

                debug!(keyword = %keyword, "reading keyword");
                builder.record_keyword(keyword.name());

                let line = next_line_for(&mut source, &keyword)?;
                builder.set_dimensions(parse_dimensions(&line)?)?;
            }
            Keyword::Dimens => {
                return Err(ParseError::UnsupportedGridType {
                    keyword: keyword.name().to_string(),
                });
            }
            Keyword::Include => {
                debug!(keyword = %keyword, "reading keyword");
                builder.record_keyword(keyword.name());

                let line = next_line_for(&mut source, &keyword)?;
                let include = include_path(base_dir, &line)?;

                debug!("--> {}", include.display());
                read_grdecl_into(&include, builder)?;
                debug!("<-- {}", include.display());
            }
            Keyword::Coord => {
                let dims = builder.require_dimensions(keyword.name())?;
                debug!(keyword = %keyword, "reading keyword");
                builder.record_keyword(keyword.name());

                let coord =
                    read_values(&mut source, keyword.name(), dims.coord_len(), COORD_FORMULA)?;
                builder.set_pillars(coord)?;
            }
            Keyword::Zcorn => {
                let dims = builder.require_dimensions(keyword.name())?;
                debug!(keyword = %keyword, "reading keyword");
                builder.record_keyword(keyword.name());

                let zcorn =
                    read_values(&mut source, keyword.name(), dims.zcorn_len(), ZCORN_FORMULA)?;
                builder.set_depths(zcorn)?;
            }
            Keyword::Actnum => {
                let dims = builder.require_dimensions(keyword.name())?;
                debug!(keyword = %keyword, "reading keyword");
                builder.record_keyword(keyword.name());

                let actnum =
                    read_values(&mut source, keyword.name(), dims.num_cells(), CELLS_FORMULA)?;
                builder.set_active(actnum)?;
            }
            Keyword::Poro | Keyword::PermX | Keyword::PermY | Keyword::PermZ | Keyword::So => {
                let dims = builder.require_dimensions(keyword.name())?;
                debug!(keyword = %keyword, "reading keyword");
                builder.record_keyword(keyword.name());

                let values =
                    read_values(&mut source, keyword.name(), dims.num_cells(), CELLS_FORMULA)?;
                builder.insert_property(keyword.name(), values)?;
            }
            Keyword::CoordSys => {
                builder.record_keyword(keyword.name());
            }
            Keyword::Unrecognized(name) => {
                // the body (if any) is left in place, data lines never look like keywords
                if builder.record_unrecognized(name) {
                    warn!(keyword = %name, line = source.line_number(), "unrecognized keyword");
                }
            }
        }
    }

    Ok(())
}

fn next_line_for<R: BufRead>(
    source: &mut LineSource<R>,
    keyword: &Keyword,
) -> Result<String, ParseError> {
    source
        .next_line()?
        .ok_or_else(|| ParseError::UnexpectedEndOfInput {
            keyword: keyword.name().to_string(),
        })
}

/// `NX NY NZ` are the first three runs of digits on the line following `SPECGRID`
fn parse_dimensions(line: &str) -> Result<GridDimensions, ParseError> {
    let invalid = || ParseError::InvalidDimensions {
        line: line.to_string(),
    };

    let mut runs = line
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(|run| run.parse::<usize>());

    let mut next = || -> Result<usize, ParseError> {
        runs.next().and_then(Result::ok).ok_or_else(invalid)
    };

    let (nx, ny, nz) = (next()?, next()?, next()?);

    GridDimensions::new(nx, ny, nz).ok_or_else(invalid)
}

/// resolve the single-quoted file name of an `INCLUDE` against the including file's directory
fn include_path(base_dir: &Path, line: &str) -> Result<PathBuf, ParseError> {
    match line.split('\'').nth(1) {
        Some(name) if !name.trim().is_empty() => Ok(base_dir.join(name.trim())),
        _ => Err(ParseError::MalformedInclude {
            line: line.to_string(),
        }),
    }
}

/// Read a single per-cell property section that is not part of a deck.
///
/// Leading blank or comment lines are skipped, as is one leading keyword line, so both bare
/// data files and files written as `NAME` followed by a section are accepted. The section has
/// to hold exactly one value per cell.
pub fn load_cell_data<R: BufRead>(
    reader: R,
    name: &str,
    dims: GridDimensions,
) -> Result<Vec<f64>, ParseError> {
    let mut source = LineSource::new(reader);

    while let Some(line) = source.next_line()? {
        if section::is_blank_or_comment(&line) {
            continue;
        }

        if keyword::keyword_prefix(&line).is_none() {
            source.push_back(line);
        }
        break;
    }

    debug!(keyword = %name, "reading keyword");
    let values: Vec<f64> = read_values(&mut source, name, dims.num_cells(), CELLS_FORMULA)
        .map_err(|err| match err {
            ParseError::SectionSizeMismatch(mismatch) => ParseError::PropertySizeMismatch(mismatch),
            err => err,
        })?;

    if values.len() != dims.num_cells() {
        let mismatch = SizeMismatch::new(
            name.to_string(),
            CELLS_FORMULA,
            dims.num_cells(),
            values.len(),
        );
        return Err(ParseError::PropertySizeMismatch(mismatch));
    }

    Ok(values)
}

/// [`load_cell_data`] for a file on disk
pub fn load_cell_data_file<P: AsRef<Path>>(
    path: P,
    name: &str,
    dims: GridDimensions,
) -> Result<Vec<f64>, ParseError> {
    let file = open(path.as_ref())?;
    load_cell_data(BufReader::new(file), name, dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(deck: &str) -> Result<Deck, ParseError> {
        parse_grdecl(deck.as_bytes(), Path::new("."))
    }

    // 2 x 1 x 1 grid with vertical pillars 0..2 in x, 0..1 in y
    const SMALL: &str = "\
-- a tiny corner point grid
SPECGRID
2 1 1 1 F /

COORD
0 0 0 0 0 10
1 0 0 1 0 10
2 0 0 2 0 10
0 1 0 0 1 10
1 1 0 1 1 10
2 1 0 2 1 10
/

ZCORN
8*0
8*10 /

ACTNUM
1 0 /
PORO
0.1 0.2 /
PERMX
2*100 /
";

    #[test]
    fn small_deck() {
        let deck = parse(SMALL).unwrap();

        let dims = deck.dimensions().unwrap();
        assert_eq!((dims.nx(), dims.ny(), dims.nz()), (2, 1, 1));
        assert_eq!(deck.pillars().unwrap().len(), 36);
        assert_eq!(deck.depths().unwrap().len(), 16);
        assert_eq!(deck.active_mask().unwrap(), [true, false]);
        assert_eq!(deck.property("PORO").unwrap(), [0.1, 0.2]);
        assert_eq!(deck.property("PERMX").unwrap(), [100.0, 100.0]);
        assert_eq!(
            deck.keywords(),
            ["SPECGRID", "COORD", "ZCORN", "ACTNUM", "PORO", "PERMX"]
        );
        assert!(deck.unrecognized_keywords().is_empty());
    }

    #[test]
    fn unrecognized_keywords_are_collected_once() {
        let deck = parse("ECHO\nSPECGRID\n1 1 1 /\nNOECHO\nECHO\nCOORDSYS\n").unwrap();

        assert_eq!(deck.keywords(), ["SPECGRID", "COORDSYS"]);
        assert_eq!(deck.unrecognized_keywords(), ["ECHO", "NOECHO"]);
    }

    #[test]
    fn coord_before_specgrid() {
        let err = parse("COORD\n0 0 0 0 0 1 /\n").unwrap_err();

        match err {
            ParseError::DimensionsNotYetDefined { keyword } => assert_eq!(keyword, "COORD"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn coord_keyword_not_recorded_on_failure() {
        let mut builder = DeckBuilder::new();
        let source = LineSource::new("COORD\n0 0 0 0 0 1 /\n".as_bytes());

        assert!(parse_into(source, Path::new("."), &mut builder).is_err());
        assert!(builder.finish().keywords().is_empty());
    }

    #[test]
    fn duplicate_specgrid() {
        let err = parse("SPECGRID\n1 1 1 /\nSPECGRID\n2 2 2 /\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateDimensions));
    }

    #[test]
    fn dimens_is_rejected() {
        let err = parse("DIMENS\n10 10 3 /\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedGridType { keyword } if keyword == "DIMENS"));
    }

    #[test]
    fn coord_size_mismatch() {
        let err = parse("SPECGRID\n1 1 1 /\nCOORD\n5*0 /\n").unwrap_err();

        assert!(matches!(err, ParseError::SectionSizeMismatch(_)));
        assert_eq!(err.mismatched_keyword(), Some("COORD"));
    }

    #[test]
    fn zcorn_size_mismatch() {
        let err = parse("SPECGRID\n1 1 1 /\nZCORN\n7*1 /\n").unwrap_err();
        assert_eq!(err.mismatched_keyword(), Some("ZCORN"));
    }

    #[test]
    fn bad_dimensions() {
        assert!(matches!(
            parse("SPECGRID\n10 10 /\n").unwrap_err(),
            ParseError::InvalidDimensions { .. }
        ));
        assert!(matches!(
            parse("SPECGRID\n10 0 3 /\n").unwrap_err(),
            ParseError::InvalidDimensions { .. }
        ));
        assert!(matches!(
            parse("SPECGRID").unwrap_err(),
            ParseError::UnexpectedEndOfInput { .. }
        ));
    }

    #[test]
    fn dimension_line_reads_digit_runs() {
        let dims = parse_dimensions("  20   20 4  1  F /").unwrap();
        assert_eq!((dims.nx(), dims.ny(), dims.nz()), (20, 20, 4));
    }

    #[test]
    fn include_paths() {
        let base = Path::new("data");
        assert_eq!(
            include_path(base, "'PSY/PORO.INC' /").unwrap(),
            Path::new("data/PSY/PORO.INC")
        );
        assert!(matches!(
            include_path(base, "PORO.INC /").unwrap_err(),
            ParseError::MalformedInclude { .. }
        ));
    }

    #[test]
    fn missing_include() {
        let err = parse("INCLUDE\n'does/not/exist.inc' /\n").unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound { .. }));
    }

    #[test]
    fn out_of_band_property() {
        let dims = GridDimensions::new(2, 2, 1).unwrap();

        let values = load_cell_data("-- temperature\nTEMP\n4*75.5 /\n".as_bytes(), "TEMP", dims)
            .unwrap();
        assert_eq!(values, [75.5; 4]);

        let bare = load_cell_data("1 2\n3 4 /\n".as_bytes(), "TEMP", dims).unwrap();
        assert_eq!(bare, [1.0, 2.0, 3.0, 4.0]);

        let err = load_cell_data("TEMP\n3*75.5 /\n".as_bytes(), "TEMP", dims).unwrap_err();
        assert!(matches!(err, ParseError::PropertySizeMismatch(_)));
        assert_eq!(err.mismatched_keyword(), Some("TEMP"));
    }
}
