use std::fmt;

use arrayvec::ArrayVec;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum number of sub-cells in a shape's bounding box.
pub const MAX_SHAPE_CELLS: usize = 16;

/// A rectangular boolean matrix describing which sub-cells of a piece's
/// bounding box are occupied.
///
/// Shapes are values: [`Shape::rotated`] returns a new matrix and never
/// touches the original, so catalog templates stay intact.
///
/// # Example
///
/// ```
/// use blockfall_engine::Shape;
///
/// let t: Shape = ".#.\n###".parse().unwrap();
/// assert_eq!((t.width(), t.height()), (3, 2));
///
/// let rotated = t.rotated();
/// assert_eq!((rotated.width(), rotated.height()), (2, 3));
/// assert_eq!(rotated.to_string(), "#.\n##\n#.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    width: u8,
    height: u8,
    cells: ArrayVec<bool, MAX_SHAPE_CELLS>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("shape has no occupied cells")]
    Empty,
    #[display("shape row {row} has {width} cells, expected {expected}")]
    Ragged {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[display("shape bounding box has {_0} cells, at most {MAX_SHAPE_CELLS} allowed")]
    TooLarge(#[error(not(source))] usize),
    #[display("invalid shape character {_0:?}")]
    InvalidChar(#[error(not(source))] char),
}

impl Shape {
    /// Builds a shape from rows of booleans.
    ///
    /// Rows must all have the same length, the matrix must fit in
    /// [`MAX_SHAPE_CELLS`] and at least one cell must be occupied.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, ShapeError>
    where
        R: AsRef<[bool]>,
    {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if width * height > MAX_SHAPE_CELLS {
            return Err(ShapeError::TooLarge(width * height));
        }
        let mut cells = ArrayVec::new();
        for (row, cols) in rows.iter().enumerate() {
            let cols = cols.as_ref();
            if cols.len() != width {
                return Err(ShapeError::Ragged {
                    row,
                    width: cols.len(),
                    expected: width,
                });
            }
            cells.extend(cols.iter().copied());
        }
        if !cells.contains(&true) {
            return Err(ShapeError::Empty);
        }
        // Both dimensions are at most MAX_SHAPE_CELLS here.
        let width = u8::try_from(width).map_err(|_| ShapeError::TooLarge(width))?;
        let height = u8::try_from(height).map_err(|_| ShapeError::TooLarge(height))?;
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Builds a catalog template from a row-major bit pattern.
    fn template(width: u8, bits: &[u8]) -> Self {
        debug_assert!(bits.len() <= MAX_SHAPE_CELLS);
        debug_assert_eq!(bits.len() % usize::from(width), 0);
        let height = bits.len() / usize::from(width);
        Self {
            width,
            height: u8::try_from(height).unwrap_or(u8::MAX),
            cells: bits.iter().map(|&b| b != 0).collect(),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(self.height)
    }

    /// Returns whether the sub-cell at column `x`, row `y` is occupied.
    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height() && self.cells[y * self.width() + x]
    }

    /// Returns the `(x, y)` offsets of the occupied sub-cells, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width();
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .map(move |(i, _)| (i % width, i / width))
    }

    /// Like [`Self::occupied_cells`], with signed offsets ready to add to a piece origin.
    pub(crate) fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let width = self.width;
        (0..self.height)
            .flat_map(move |y| (0..width).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.is_occupied(usize::from(x), usize::from(y)))
            .map(|(x, y)| (i32::from(x), i32::from(y)))
    }

    /// Returns this shape rotated 90° clockwise.
    ///
    /// A `height × width` matrix becomes `width × height`; the sub-cell at
    /// row `y`, column `x` moves to row `x`, column `height - 1 - y`.
    #[must_use]
    pub fn rotated(&self) -> Self {
        let (width, height) = (self.width(), self.height());
        let mut cells = ArrayVec::new();
        for new_y in 0..width {
            for new_x in 0..height {
                cells.push(self.is_occupied(new_y, height - 1 - new_x));
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cells,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.width() {
                let c = if self.is_occupied(x, y) { '#' } else { '.' };
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Shape {
    type Err = ShapeError;

    /// Parses `#`/`.` rows separated by newlines or `/`, e.g. `".#./###"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .split(['\n', '/'])
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        '#' => Ok(true),
                        '.' => Ok(false),
                        _ => Err(ShapeError::InvalidChar(c)),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(&rows)
    }
}

/// One of the seven standard tetromino templates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[repr(u8)]
pub enum ShapeKind {
    I = 0,
    O = 1,
    T = 2,
    S = 3,
    Z = 4,
    J = 5,
    L = 6,
}

impl ShapeKind {
    /// Number of shape kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [ShapeKind; Self::LEN] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::J,
        ShapeKind::L,
    ];

    /// Returns the spawn orientation of this kind as a minimal bounding-box matrix.
    ///
    /// ```
    /// use blockfall_engine::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::I.template().to_string(), "####");
    /// assert_eq!(ShapeKind::O.template().to_string(), "##\n##");
    /// assert_eq!(ShapeKind::T.template().to_string(), ".#.\n###");
    /// ```
    #[must_use]
    pub fn template(self) -> Shape {
        match self {
            ShapeKind::I => Shape::template(4, &[1, 1, 1, 1]),
            ShapeKind::O => Shape::template(2, &[1, 1, 1, 1]),
            ShapeKind::T => Shape::template(3, &[0, 1, 0, 1, 1, 1]),
            ShapeKind::S => Shape::template(3, &[0, 1, 1, 1, 1, 0]),
            ShapeKind::Z => Shape::template(3, &[1, 1, 0, 0, 1, 1]),
            ShapeKind::J => Shape::template(3, &[1, 0, 0, 1, 1, 1]),
            ShapeKind::L => Shape::template(3, &[0, 0, 1, 1, 1, 1]),
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            ShapeKind::I => 'I',
            ShapeKind::O => 'O',
            ShapeKind::T => 'T',
            ShapeKind::S => 'S',
            ShapeKind::Z => 'Z',
            ShapeKind::J => 'J',
            ShapeKind::L => 'L',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(ShapeKind::I),
            'O' => Some(ShapeKind::O),
            'T' => Some(ShapeKind::T),
            'S' => Some(ShapeKind::S),
            'Z' => Some(ShapeKind::Z),
            'J' => Some(ShapeKind::J),
            'L' => Some(ShapeKind::L),
            _ => None,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("catalog must contain at least one shape kind")]
pub struct EmptyCatalogError;

/// The set of shape kinds new pieces are drawn from, uniformly at random.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Catalog, ShapeKind};
///
/// let catalog = Catalog::from_kinds([ShapeKind::I, ShapeKind::I, ShapeKind::O]).unwrap();
/// assert_eq!(catalog.kinds(), &[ShapeKind::I, ShapeKind::O]);
/// assert!(Catalog::from_kinds([]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    kinds: ArrayVec<ShapeKind, { ShapeKind::LEN }>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// All seven tetrominoes.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            kinds: ShapeKind::ALL.into_iter().collect(),
        }
    }

    /// The reduced set of a straight line, a square and a T.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            kinds: [ShapeKind::I, ShapeKind::O, ShapeKind::T].into_iter().collect(),
        }
    }

    /// Builds a catalog from the given kinds, ignoring duplicates.
    pub fn from_kinds<I>(kinds: I) -> Result<Self, EmptyCatalogError>
    where
        I: IntoIterator<Item = ShapeKind>,
    {
        let mut unique = ArrayVec::new();
        for kind in kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        if unique.is_empty() {
            return Err(EmptyCatalogError);
        }
        Ok(Self { kinds: unique })
    }

    #[must_use]
    pub fn kinds(&self) -> &[ShapeKind] {
        &self.kinds
    }

    /// Picks a kind uniformly at random.
    pub fn sample<R>(&self, rng: &mut R) -> ShapeKind
    where
        R: Rng + ?Sized,
    {
        self.kinds[rng.random_range(0..self.kinds.len())]
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn shape(s: &str) -> Shape {
        s.parse().unwrap()
    }

    #[test]
    fn test_rotate_line() {
        let line = ShapeKind::I.template();
        let vertical = line.rotated();
        assert_eq!((vertical.width(), vertical.height()), (1, 4));
        assert_eq!(vertical.to_string(), "#\n#\n#\n#");
        assert_eq!(vertical.rotated(), line);
    }

    #[test]
    fn test_rotate_clockwise() {
        let l = shape("..#/###");
        assert_eq!(l.rotated(), shape("#./#./##"));
        assert_eq!(l.rotated().rotated(), shape("###/#.."));
        assert_eq!(l.rotated().rotated().rotated(), shape("##/.#/.#"));
    }

    #[test]
    fn test_rotate_four_times_is_identity() {
        for kind in ShapeKind::ALL {
            let template = kind.template();
            let mut shape = template.clone();
            for _ in 0..4 {
                shape = shape.rotated();
            }
            assert_eq!(shape, template, "{kind} did not survive four rotations");
        }
    }

    #[test]
    fn test_rotate_keeps_cell_count() {
        for kind in ShapeKind::ALL {
            let template = kind.template();
            assert_eq!(template.occupied_cells().count(), 4);
            assert_eq!(template.rotated().occupied_cells().count(), 4);
        }
    }

    #[test]
    fn test_square_rotation_invariant() {
        let square = ShapeKind::O.template();
        assert_eq!(square.rotated(), square);
    }

    #[test]
    fn test_rotation_leaves_template_untouched() {
        let before = ShapeKind::T.template();
        let _ = before.rotated();
        assert_eq!(before, ShapeKind::T.template());
    }

    #[test]
    fn test_occupied_cells_and_offsets_agree() {
        for kind in ShapeKind::ALL {
            let shape = kind.template().rotated();
            let cells = shape
                .occupied_cells()
                .map(|(x, y)| (i32::try_from(x).unwrap(), i32::try_from(y).unwrap()))
                .collect::<Vec<_>>();
            let offsets = shape.offsets().collect::<Vec<_>>();
            assert_eq!(cells, offsets);
        }
    }

    #[test]
    fn test_from_rows_errors() {
        let empty: [[bool; 2]; 0] = [];
        assert_eq!(Shape::from_rows(&empty), Err(ShapeError::Empty));
        assert_eq!(
            Shape::from_rows(&[[false, false]]),
            Err(ShapeError::Empty)
        );
        assert_eq!(
            Shape::from_rows(&[vec![true, true], vec![true]]),
            Err(ShapeError::Ragged {
                row: 1,
                width: 1,
                expected: 2
            })
        );
        assert_eq!(
            Shape::from_rows(&[[true; 17]]),
            Err(ShapeError::TooLarge(17))
        );
        assert_eq!("#x".parse::<Shape>(), Err(ShapeError::InvalidChar('x')));
    }

    #[test]
    fn test_kind_char_conversion() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_char(kind.as_char()), Some(kind));
            assert_eq!(kind.to_string(), kind.as_char().to_string());
        }
        assert_eq!(ShapeKind::from_char('X'), None);
    }

    #[test]
    fn test_catalog_sample_stays_in_catalog() {
        let catalog = Catalog::minimal();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            assert!(catalog.kinds().contains(&catalog.sample(&mut rng)));
        }
    }

    #[test]
    fn test_single_kind_catalog_is_deterministic() {
        let catalog = Catalog::from_kinds([ShapeKind::I]).unwrap();
        let mut rng = Pcg32::seed_from_u64(42);
        assert!((0..50).all(|_| catalog.sample(&mut rng) == ShapeKind::I));
    }

    #[test]
    fn test_standard_catalog_samples_every_kind() {
        let catalog = Catalog::standard();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut seen = [false; ShapeKind::LEN];
        for _ in 0..500 {
            seen[catalog.sample(&mut rng) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
