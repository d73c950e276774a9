use std::fmt;

/// longest keyword name the GRDECL format allows
pub const MAX_KEYWORD_LEN: usize = 8;

/// A GRDECL keyword the loader knows how to handle, or the name of one it does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Keyword {
    SpecGrid,
    /// cartesian dimensions, rejected
    Dimens,
    Coord,
    Zcorn,
    Actnum,
    Poro,
    PermX,
    PermY,
    PermZ,
    So,
    Include,
    /// recognized, carries no data we use
    CoordSys,
    Unrecognized(String),
}

impl Keyword {
    /// Classify a line of a deck. Returns `None` for lines that do not start with a keyword.
    ///
    /// A keyword is an uppercase letter followed by at most seven more uppercase letters or
    /// digits at the very start of the line. Anything after those (such as a `/`) is ignored.
    ///
    /// ```
    /// use grdecl::parse::Keyword;
    ///
    /// assert_eq!(Keyword::from_line("COORD"), Some(Keyword::Coord));
    /// assert_eq!(Keyword::from_line("PORO/"), Some(Keyword::Poro));
    /// assert_eq!(Keyword::from_line("1 2 3 /"), None);
    /// ```
    pub fn from_line(line: &str) -> Option<Self> {
        keyword_prefix(line).map(Self::from)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::SpecGrid => "SPECGRID",
            Self::Dimens => "DIMENS",
            Self::Coord => "COORD",
            Self::Zcorn => "ZCORN",
            Self::Actnum => "ACTNUM",
            Self::Poro => "PORO",
            Self::PermX => "PERMX",
            Self::PermY => "PERMY",
            Self::PermZ => "PERMZ",
            Self::So => "SO",
            Self::Include => "INCLUDE",
            Self::CoordSys => "COORDSYS",
            Self::Unrecognized(name) => name,
        }
    }

    /// `true` for the keywords holding one float per cell
    pub fn is_cell_property(&self) -> bool {
        matches!(
            self,
            Self::Poro | Self::PermX | Self::PermY | Self::PermZ | Self::So
        )
    }
}

impl From<&str> for Keyword {
    fn from(name: &str) -> Self {
        match name {
            "SPECGRID" => Self::SpecGrid,
            "DIMENS" => Self::Dimens,
            "COORD" => Self::Coord,
            "ZCORN" => Self::Zcorn,
            "ACTNUM" => Self::Actnum,
            "PORO" => Self::Poro,
            "PERMX" => Self::PermX,
            "PERMY" => Self::PermY,
            "PERMZ" => Self::PermZ,
            "SO" => Self::So,
            "INCLUDE" => Self::Include,
            "COORDSYS" => Self::CoordSys,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// the keyword at the start of `line`, if there is one
pub(crate) fn keyword_prefix(line: &str) -> Option<&str> {
    let bytes = line.as_bytes();

    if !bytes.first()?.is_ascii_uppercase() {
        return None;
    }

    let len = bytes
        .iter()
        .take(MAX_KEYWORD_LEN)
        .take_while(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        .count();

    Some(&line[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_rules() {
        assert_eq!(keyword_prefix("SPECGRID"), Some("SPECGRID"));
        assert_eq!(keyword_prefix("ZCORN  -- depths"), Some("ZCORN"));
        assert_eq!(keyword_prefix("PERMX/"), Some("PERMX"));
        assert_eq!(keyword_prefix("A1B2"), Some("A1B2"));
        // only the first eight characters can belong to a keyword
        assert_eq!(keyword_prefix("COORDSYSTEM"), Some("COORDSYS"));

        assert_eq!(keyword_prefix(" COORD"), None);
        assert_eq!(keyword_prefix("-- COORD"), None);
        assert_eq!(keyword_prefix("2*0.25 /"), None);
        assert_eq!(keyword_prefix("coord"), None);
        assert_eq!(keyword_prefix(""), None);
    }

    #[test]
    fn classify() {
        assert_eq!(Keyword::from_line("SPECGRID"), Some(Keyword::SpecGrid));
        assert_eq!(Keyword::from_line("DIMENS"), Some(Keyword::Dimens));
        assert_eq!(
            Keyword::from_line("MAPAXES"),
            Some(Keyword::Unrecognized("MAPAXES".into()))
        );
        assert!(Keyword::So.is_cell_property());
        assert!(!Keyword::Actnum.is_cell_property());
        assert_eq!(Keyword::PermZ.to_string(), "PERMZ");
    }
}
