use std::{fmt, str::FromStr};

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// A signed `(row, col)` cell coordinate.
///
/// Row 0 is the floor and rows grow upward. Coordinates may lie outside the
/// grid while a piece is being tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

/// Number of cells in every piece.
pub const PIECE_CELLS: usize = 4;

/// Offsets of the four cells from the pivot for one orientation.
pub type Offsets = [Coord; PIECE_CELLS];

/// Static rotation data for one piece type.
///
/// Every entry lives in a process-lifetime table, so pieces refer to it by
/// [`PieceKind`] instead of holding a reference.
#[derive(Debug)]
pub struct PieceData {
    kind: PieceKind,
    id: u8,
    orientations: &'static [Offsets],
}

impl PieceData {
    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Cell id written into the grid when this piece locks.
    #[must_use]
    pub fn id(&self) -> u8 {
        self.id
    }

    #[must_use]
    pub fn num_orientations(&self) -> u8 {
        #[expect(clippy::cast_possible_truncation)]
        let n = self.orientations.len() as u8;
        n
    }

    #[must_use]
    pub fn offsets(&self, orientation: u8) -> &'static Offsets {
        &self.orientations[usize::from(orientation)]
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// L-piece (spawns with its foot below the left end).
    L = 0,
    /// J-piece (spawns with its foot below the right end).
    J = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// I-piece.
    I = 4,
    /// T-piece (spawns pointing down).
    T = 5,
    /// O-piece.
    O = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::I,
        PieceKind::T,
        PieceKind::O,
    ];

    #[must_use]
    pub fn data(self) -> &'static PieceData {
        &PIECE_TABLE[self as usize]
    }

    #[must_use]
    pub fn id(self) -> u8 {
        self.data().id
    }

    #[must_use]
    pub fn num_orientations(self) -> u8 {
        self.data().num_orientations()
    }

    /// Returns the piece kind whose cells carry `id` in the grid.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrace_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::L => 'L',
            PieceKind::J => 'J',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::I => 'I',
            PieceKind::T => 'T',
            PieceKind::O => 'O',
        }
    }

    /// Parses a piece kind from a single character (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrace_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('t'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'L' => Some(PieceKind::L),
            'J' => Some(PieceKind::J),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'I' => Some(PieceKind::I),
            'T' => Some(PieceKind::T),
            'O' => Some(PieceKind::O),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece kind: {input:?}")]
pub struct ParsePieceKindError {
    input: String,
}

impl FromStr for PieceKind {
    type Err = ParsePieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PieceKind::from_char(c),
            _ => None,
        }
        .ok_or_else(|| ParsePieceKindError {
            input: s.to_owned(),
        })
    }
}

/// A piece instance: a kind, a pivot ("center") and an orientation.
///
/// The absolute cell coordinates are derived from the pivot and the kind's
/// offset table and kept in sync by every mutator. None of the mutators check
/// for collisions; the caller tests the new cells against a
/// [`Grid`](super::grid::Grid) and reverts if needed.
///
/// # Example
///
/// ```
/// use tetrace_engine::{Coord, Piece, PieceKind};
///
/// let mut piece = Piece::new(PieceKind::T);
/// piece.set_position(19, 5, 0);
/// piece.rotate(-1);
/// assert_eq!(piece.orientation(), 3);
/// piece.translate(-1, 2);
/// assert_eq!(piece.center(), Coord::new(18, 7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    center: Coord,
    orientation: u8,
    coords: Offsets,
}

impl Piece {
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self::at(kind, 0, 0, 0)
    }

    #[must_use]
    pub fn at(kind: PieceKind, row: i32, col: i32, orientation: u8) -> Self {
        let mut piece = Self {
            kind,
            center: Coord::new(row, col),
            orientation,
            coords: [Coord::new(row, col); PIECE_CELLS],
        };
        piece.set_position(row, col, orientation);
        piece
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn data(&self) -> &'static PieceData {
        self.kind.data()
    }

    #[must_use]
    pub fn center(&self) -> Coord {
        self.center
    }

    #[must_use]
    pub fn orientation(&self) -> u8 {
        self.orientation
    }

    /// Absolute cell coordinates for the current pivot and orientation.
    #[must_use]
    pub fn coords(&self) -> &Offsets {
        &self.coords
    }

    /// Moves the pivot and sets the orientation, recomputing all cells.
    ///
    /// `orientation` must be below the kind's orientation count.
    pub fn set_position(&mut self, row: i32, col: i32, orientation: u8) {
        let data = self.data();
        debug_assert!(
            orientation < data.num_orientations(),
            "orientation {orientation} out of range for {} ({} orientations)",
            self.kind,
            data.num_orientations()
        );
        self.center = Coord::new(row, col);
        self.orientation = orientation;
        for (cell, offset) in self.coords.iter_mut().zip(data.offsets(orientation)) {
            *cell = self.center.offset(offset.row, offset.col);
        }
    }

    /// Rotates by `turns` steps (negative turns rotate the other way), keeping
    /// the pivot fixed.
    pub fn rotate(&mut self, turns: i32) {
        let n = i32::from(self.kind.num_orientations());
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let orientation = (i32::from(self.orientation) + turns).rem_euclid(n) as u8;
        self.set_position(self.center.row, self.center.col, orientation);
    }

    pub fn translate(&mut self, d_row: i32, d_col: i32) {
        self.set_position(
            self.center.row + d_row,
            self.center.col + d_col,
            self.orientation,
        );
    }
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#orientation@row,col" (e.g., "T#2@19,5")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.orientation,
            self.center.row,
            self.center.col
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| {
            D::Error::custom(format!(
                "missing '#' in format 'kind#orientation@row,col', got '{s}'"
            ))
        })?;
        let kind = kind_str.parse::<PieceKind>().map_err(D::Error::custom)?;

        let (orientation_str, position_str) = rest.split_once('@').ok_or_else(|| {
            D::Error::custom(format!(
                "missing '@' in format 'kind#orientation@row,col', got '{s}'"
            ))
        })?;
        let orientation = orientation_str.parse::<u8>().map_err(|e| {
            D::Error::custom(format!("invalid orientation: {orientation_str} ({e})"))
        })?;
        if orientation >= kind.num_orientations() {
            return Err(D::Error::custom(format!(
                "orientation for {kind} must be below {}, got {orientation}",
                kind.num_orientations()
            )));
        }

        let (row_str, col_str) = position_str.split_once(',').ok_or_else(|| {
            D::Error::custom(format!(
                "missing ',' in format 'kind#orientation@row,col', got '{s}'"
            ))
        })?;
        let row = row_str
            .parse::<i32>()
            .map_err(|e| D::Error::custom(format!("invalid row: {row_str} ({e})")))?;
        let col = col_str
            .parse::<i32>()
            .map_err(|e| D::Error::custom(format!("invalid column: {col_str} ({e})")))?;

        Ok(Piece::at(kind, row, col, orientation))
    }
}

const fn o(row: i32, col: i32) -> Coord {
    Coord::new(row, col)
}

static PIECE_TABLE: [PieceData; PieceKind::LEN] = [
    PieceData {
        kind: PieceKind::L,
        id: 1,
        orientations: &[
            [o(0, 0), o(0, 1), o(0, -1), o(-1, -1)],
            [o(0, 0), o(-1, 0), o(1, 0), o(1, -1)],
            [o(0, 0), o(0, -1), o(0, 1), o(1, 1)],
            [o(0, 0), o(1, 0), o(-1, 0), o(-1, 1)],
        ],
    },
    PieceData {
        kind: PieceKind::J,
        id: 2,
        orientations: &[
            [o(0, 0), o(0, -1), o(0, 1), o(-1, 1)],
            [o(0, 0), o(1, 0), o(-1, 0), o(-1, -1)],
            [o(0, 0), o(0, 1), o(0, -1), o(1, -1)],
            [o(0, 0), o(-1, 0), o(1, 0), o(1, 1)],
        ],
    },
    PieceData {
        kind: PieceKind::S,
        id: 3,
        orientations: &[
            [o(0, 0), o(0, 1), o(-1, -1), o(-1, 0)],
            [o(0, 0), o(1, 0), o(0, 1), o(-1, 1)],
        ],
    },
    PieceData {
        kind: PieceKind::Z,
        id: 4,
        orientations: &[
            [o(0, 0), o(0, -1), o(-1, 0), o(-1, 1)],
            [o(0, 0), o(-1, 0), o(0, 1), o(1, 1)],
        ],
    },
    PieceData {
        kind: PieceKind::I,
        id: 5,
        orientations: &[
            [o(0, 0), o(0, -2), o(0, -1), o(0, 1)],
            [o(0, 0), o(2, 0), o(1, 0), o(-1, 0)],
        ],
    },
    PieceData {
        kind: PieceKind::T,
        id: 6,
        orientations: &[
            [o(0, 0), o(-1, 0), o(0, 1), o(0, -1)],
            [o(0, 0), o(0, -1), o(-1, 0), o(1, 0)],
            [o(0, 0), o(1, 0), o(0, -1), o(0, 1)],
            [o(0, 0), o(0, 1), o(1, 0), o(-1, 0)],
        ],
    },
    PieceData {
        kind: PieceKind::O,
        id: 7,
        orientations: &[[o(0, 0), o(-1, 0), o(-1, -1), o(0, -1)]],
    },
];
