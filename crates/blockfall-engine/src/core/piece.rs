use serde::{Deserialize, Serialize};

use super::{
    board::BOARD_WIDTH,
    shape::{Shape, ShapeKind},
};

/// The falling piece: a shape placed at an origin on the board.
///
/// The origin is the top-left corner of the shape's bounding box. Pieces are
/// values; [`Piece::translated`] and [`Piece::rotated`] return new pieces.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Piece, PiecePosition, ShapeKind};
///
/// let piece = Piece::new(ShapeKind::I);
/// assert_eq!(piece.position(), PiecePosition::SPAWN);
///
/// let cells = piece.occupied_positions().collect::<Vec<_>>();
/// assert_eq!(cells, [(5, 0), (6, 0), (7, 0), (8, 0)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: ShapeKind,
    shape: Shape,
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "T#1@4,18")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
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
        let malformed = || D::Error::custom(format!("expected 'kind#rotation@x,y', got '{s}'"));

        let (kind_str, rest) = s.split_once('#').ok_or_else(malformed)?;
        let (rotation_str, position_str) = rest.split_once('@').ok_or_else(malformed)?;
        let (x_str, y_str) = position_str.split_once(',').ok_or_else(malformed)?;

        let mut kind_chars = kind_str.chars();
        let kind = match (kind_chars.next(), kind_chars.next()) {
            (Some(c), None) => ShapeKind::from_char(c)
                .ok_or_else(|| D::Error::custom(format!("invalid shape kind: {c}")))?,
            _ => return Err(malformed()),
        };

        let rotation = rotation_str
            .parse::<u8>()
            .ok()
            .filter(|r| *r < 4)
            .ok_or_else(|| D::Error::custom(format!("rotation must be 0-3, got {rotation_str}")))?;

        let x = x_str
            .parse::<i32>()
            .map_err(|e| D::Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse::<i32>()
            .map_err(|e| D::Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        let mut piece = Piece::with_position(kind, PiecePosition::new(x, y));
        for _ in 0..rotation {
            piece = piece.rotated();
        }
        Ok(piece)
    }
}

impl Piece {
    /// Creates a piece of the given kind in spawn orientation at [`PiecePosition::SPAWN`].
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self::with_position(kind, PiecePosition::SPAWN)
    }

    /// Creates a piece of the given kind in spawn orientation at `position`.
    #[must_use]
    pub fn with_position(kind: ShapeKind, position: PiecePosition) -> Self {
        Self {
            position,
            rotation: PieceRotation::default(),
            kind,
            shape: kind.template(),
        }
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the board coordinates covered by this piece.
    ///
    /// Coordinates may lie outside the board for pieces that have not been
    /// validated against one.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .offsets()
            .map(move |(dx, dy)| (self.position.x + dx, self.position.y + dy))
    }

    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            position: self.position.offset(dx, dy),
            ..self.clone()
        }
    }

    /// Returns this piece with its shape turned 90° clockwise about the same origin.
    #[must_use]
    pub fn rotated(&self) -> Self {
        self.with_shape(self.shape.rotated())
    }

    pub(crate) fn with_shape(&self, shape: Shape) -> Self {
        Self {
            position: self.position,
            rotation: self.rotation.rotated_right(),
            kind: self.kind,
            shape,
        }
    }
}

/// Origin of a piece on the board.
///
/// - (0, 0) is the top-left cell of the board
/// - X increases rightward (columns)
/// - Y increases downward (rows)
///
/// Coordinates are signed so that candidate positions past the left or top
/// edge can be represented and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    /// Where new pieces appear: horizontally centered, top row.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const SPAWN: Self = Self::new(BOARD_WIDTH as i32 / 2, 0);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Number of clockwise quarter turns applied since spawn, modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn quarter_turns(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_position() {
        assert_eq!(PiecePosition::SPAWN, PiecePosition::new(5, 0));
        let piece = Piece::new(ShapeKind::O);
        assert_eq!(piece.position(), PiecePosition::SPAWN);
        assert_eq!(piece.rotation().quarter_turns(), 0);
    }

    #[test]
    fn test_translated_moves_every_cell() {
        let piece = Piece::with_position(ShapeKind::T, PiecePosition::new(2, 3));
        let moved = piece.translated(-1, 2);
        assert_eq!(moved.position(), PiecePosition::new(1, 5));
        let before = piece.occupied_positions().collect::<Vec<_>>();
        let after = moved.occupied_positions().collect::<Vec<_>>();
        for ((x0, y0), (x1, y1)) in before.into_iter().zip(after) {
            assert_eq!((x1 - x0, y1 - y0), (-1, 2));
        }
        assert_eq!(moved.shape(), piece.shape());
    }

    #[test]
    fn test_rotated_keeps_origin_and_counts_turns() {
        let piece = Piece::with_position(ShapeKind::I, PiecePosition::new(3, 0));
        let rotated = piece.rotated();
        assert_eq!(rotated.position(), piece.position());
        assert_eq!(rotated.rotation().quarter_turns(), 1);
        assert_eq!(
            rotated.occupied_positions().collect::<Vec<_>>(),
            [(3, 0), (3, 1), (3, 2), (3, 3)]
        );
        let back = rotated.rotated().rotated().rotated();
        assert_eq!(back, piece);
    }

    #[test]
    fn test_piece_serialization() {
        let piece = Piece::with_position(ShapeKind::S, PiecePosition::new(4, 18)).rotated();

        let serialized = serde_json::to_string(&piece).unwrap();
        assert_eq!(serialized, "\"S#1@4,18\"");

        let deserialized: Piece = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, piece);
        assert_eq!(deserialized.shape(), &ShapeKind::S.template().rotated());
    }

    #[test]
    fn test_piece_serialization_negative_position() {
        let piece = Piece::with_position(ShapeKind::J, PiecePosition::new(-1, -2));
        let serialized = serde_json::to_string(&piece).unwrap();
        assert_eq!(serialized, "\"J#0@-1,-2\"");
        assert_eq!(serde_json::from_str::<Piece>(&serialized).unwrap(), piece);
    }

    #[test]
    fn test_piece_deserialization_error_cases() {
        assert!(serde_json::from_str::<Piece>("\"S1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1#4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1@4\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"X#1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"SS#1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#4@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1@abc,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1@4,xyz\"").is_err());
    }
}
