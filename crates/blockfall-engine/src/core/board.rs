use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows on the board.
pub const BOARD_HEIGHT: usize = 20;

/// State of a single board cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, derive_more::IsVariant,
)]
#[repr(u8)]
pub enum Cell {
    /// Nothing occupies the cell.
    #[default]
    Empty,
    /// Occupied by the falling piece.
    Active,
    /// Occupied by a piece that has settled.
    Locked,
}

impl Cell {
    /// Returns the character used in the board's text form.
    ///
    /// ```
    /// use blockfall_engine::Cell;
    ///
    /// assert_eq!(Cell::Empty.as_char(), '.');
    /// assert_eq!(Cell::Active.as_char(), '@');
    /// assert_eq!(Cell::Locked.as_char(), '#');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Active => '@',
            Cell::Locked => '#',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Cell::Empty),
            '@' => Some(Cell::Active),
            '#' => Some(Cell::Locked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoardRow {
    cells: [Cell; BOARD_WIDTH],
}

impl BoardRow {
    const EMPTY: Self = BoardRow {
        cells: [Cell::Empty; BOARD_WIDTH],
    };

    fn is_filled(&self) -> bool {
        self.cells.iter().all(|c| c.is_locked())
    }
}

/// The playing field: a fixed `BOARD_WIDTH × BOARD_HEIGHT` grid of [`Cell`]s.
///
/// Row `0` is the top of the board and `x` grows to the right.
///
/// The board has a plain-text form used by tests and headless hosts: one line
/// per row, `.` for empty, `@` for active and `#` for locked cells. Parsing
/// accepts fewer than `BOARD_HEIGHT` lines and aligns them to the bottom.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Cell};
///
/// let board: Board = "##########\n#########.".parse().unwrap();
/// assert_eq!(board.cell(0, 19), Some(Cell::Locked));
/// assert_eq!(board.cell(9, 19), Some(Cell::Empty));
/// assert_eq!(board.clone().clear_lines(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [BoardRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; BOARD_HEIGHT],
    };

    /// Returns the cell at `(x, y)`, or `None` outside the board.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y)?.cells.get(x).copied()
    }

    /// Like [`Self::cell`], but with signed coordinates as produced by piece offsets.
    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.cell(x, y)
    }

    /// Overwrites the cell at `(x, y)`. Coordinates outside the board are ignored.
    ///
    /// Used to prepare positions before handing the board to
    /// [`Engine::from_parts`](crate::Engine::from_parts).
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(c) = self.rows.get_mut(y).and_then(|row| row.cells.get_mut(x)) {
            *c = cell;
        }
    }

    pub(crate) fn set_cell_at(&mut self, x: i32, y: i32, cell: Cell) {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            self.set_cell(x, y, cell);
        }
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.rows.iter().map(|row| &row.cells)
    }

    /// Counts the cells in the given state.
    #[must_use]
    pub fn count(&self, cell: Cell) -> usize {
        self.rows().flatten().filter(|c| **c == cell).count()
    }

    /// Returns whether every cell of row `y` is locked.
    #[must_use]
    pub fn is_row_filled(&self, y: usize) -> bool {
        self.rows.get(y).is_some_and(BoardRow::is_filled)
    }

    /// Turns every active cell into an empty one.
    pub(crate) fn erase_active(&mut self) {
        for cell in self.rows.iter_mut().flat_map(|row| &mut row.cells) {
            if cell.is_active() {
                *cell = Cell::Empty;
            }
        }
    }

    /// Clears fully locked rows and returns the number of rows cleared.
    ///
    /// Rows are compacted bottom-up in a single pass: every kept row moves
    /// down by the number of filled rows found below it, and the freed rows
    /// at the top become empty. Adjacent and separated filled rows are all
    /// removed by one call.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;
        for y in (0..BOARD_HEIGHT).rev() {
            if self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }
        self.rows[..count].fill(BoardRow::EMPTY);
        count
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.as_char())?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("board has {_0} rows, at most {BOARD_HEIGHT} allowed")]
    TooManyRows(#[error(not(source))] usize),
    #[display("row {row} has {width} cells, expected {BOARD_WIDTH}")]
    RowWidth { row: usize, width: usize },
    #[display("invalid cell {ch:?} at row {row}, column {column}")]
    InvalidCell { row: usize, column: usize, ch: char },
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        if lines.len() > BOARD_HEIGHT {
            return Err(ParseBoardError::TooManyRows(lines.len()));
        }

        let mut board = Board::EMPTY;
        let top = BOARD_HEIGHT - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let row = top + i;
            let width = line.chars().count();
            if width != BOARD_WIDTH {
                return Err(ParseBoardError::RowWidth { row, width });
            }
            for (column, ch) in line.chars().enumerate() {
                let cell = Cell::from_char(ch)
                    .ok_or(ParseBoardError::InvalidCell { row, column, ch })?;
                board.rows[row].cells[column] = cell;
            }
        }
        Ok(board)
    }
}

// Serialized as a list of row strings in the text form, e.g. `["..##......", ...]`.
impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(
            self.rows()
                .map(|row| row.iter().map(|c| c.as_char()).collect::<String>()),
        )
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        rows.join("\n").parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: usize) {
        for x in 0..BOARD_WIDTH {
            board.set_cell(x, y, Cell::Locked);
        }
    }

    #[test]
    fn test_empty_board() {
        let board = Board::EMPTY;
        assert_eq!(board.count(Cell::Empty), BOARD_WIDTH * BOARD_HEIGHT);
        assert_eq!(board.count(Cell::Locked), 0);
        assert_eq!(board.count(Cell::Active), 0);
    }

    #[test]
    fn test_cell_out_of_bounds() {
        let board = Board::EMPTY;
        assert_eq!(board.cell(BOARD_WIDTH, 0), None);
        assert_eq!(board.cell(0, BOARD_HEIGHT), None);
        assert_eq!(board.cell_at(-1, 0), None);
        assert_eq!(board.cell_at(0, -1), None);
        assert_eq!(board.cell_at(9, 19), Some(Cell::Empty));
    }

    #[test]
    fn test_set_cell_ignores_out_of_bounds() {
        let mut board = Board::EMPTY;
        board.set_cell(BOARD_WIDTH, 0, Cell::Locked);
        board.set_cell_at(-1, 3, Cell::Locked);
        assert_eq!(board, Board::EMPTY);
    }

    #[test]
    fn test_row_with_active_cell_is_not_filled() {
        let mut board = Board::EMPTY;
        fill_row(&mut board, 19);
        board.set_cell(4, 19, Cell::Active);
        assert!(!board.is_row_filled(19));
        assert_eq!(board.clear_lines(), 0);
    }

    #[test]
    fn test_clear_lines_bottom_row_shifts_rows_down() {
        let mut board: Board = "
            #.........
            .#........
            ##########
        "
        .parse()
        .unwrap();
        let locked_before = board.count(Cell::Locked);

        assert_eq!(board.clear_lines(), 1);

        let expected: Board = "
            #.........
            .#........
        "
        .parse()
        .unwrap();
        assert_eq!(board, expected);
        assert_eq!(board.count(Cell::Locked), locked_before - BOARD_WIDTH);
        assert!(board.rows().next().unwrap().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_clear_lines_adjacent_rows() {
        let mut board: Board = "
            ...#......
            ##########
            ##########
            ..#.......
        "
        .parse()
        .unwrap();

        assert_eq!(board.clear_lines(), 2);

        let expected: Board = "
            ...#......
            ..#.......
        "
        .parse()
        .unwrap();
        assert_eq!(board, expected);
    }

    #[test]
    fn test_clear_lines_separated_rows() {
        let mut board: Board = "
            ##########
            #.........
            ##########
            .#........
            ##########
        "
        .parse()
        .unwrap();

        assert_eq!(board.clear_lines(), 3);

        let expected: Board = "
            #.........
            .#........
        "
        .parse()
        .unwrap();
        assert_eq!(board, expected);
    }

    #[test]
    fn test_clear_lines_all_filled() {
        let mut board = Board::EMPTY;
        for y in 0..BOARD_HEIGHT {
            fill_row(&mut board, y);
        }
        assert_eq!(board.clear_lines(), BOARD_HEIGHT);
        assert_eq!(board, Board::EMPTY);
    }

    #[test]
    fn test_clear_lines_top_row() {
        let mut board = Board::EMPTY;
        fill_row(&mut board, 0);
        board.set_cell(2, 5, Cell::Locked);
        assert_eq!(board.clear_lines(), 1);
        assert_eq!(board.count(Cell::Locked), 1);
        assert_eq!(board.cell(2, 5), Some(Cell::Locked));
    }

    #[test]
    fn test_erase_active() {
        let mut board: Board = "..@@......\n##@#######".parse().unwrap();
        board.erase_active();
        assert_eq!(board.count(Cell::Active), 0);
        assert_eq!(board.cell(2, 19), Some(Cell::Empty));
        assert_eq!(board.count(Cell::Locked), 9);
    }

    #[test]
    fn test_text_round_trip() {
        let text = "..@@......\n#.#.#.#.#.";
        let board: Board = text.parse().unwrap();
        let rendered = board.to_string();
        assert_eq!(rendered.lines().count(), BOARD_HEIGHT);
        assert!(rendered.ends_with(text));
        assert_eq!(rendered.parse::<Board>().unwrap(), board);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "#####".parse::<Board>(),
            Err(ParseBoardError::RowWidth { row: 19, width: 5 })
        );
        assert_eq!(
            "....x.....".parse::<Board>(),
            Err(ParseBoardError::InvalidCell {
                row: 19,
                column: 4,
                ch: 'x'
            })
        );
        let too_tall = vec![".........."; BOARD_HEIGHT + 1].join("\n");
        assert_eq!(
            too_tall.parse::<Board>(),
            Err(ParseBoardError::TooManyRows(BOARD_HEIGHT + 1))
        );
    }

    #[test]
    fn test_serialize_as_rows() {
        let board: Board = "#.........".parse().unwrap();
        let json = serde_json::to_value(&board).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), BOARD_HEIGHT);
        assert_eq!(rows[19], "#.........");
        assert_eq!(rows[0], "..........");

        let back: Board = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);
    }
}
