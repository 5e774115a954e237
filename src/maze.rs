use rand::Rng;

use crate::geometry::{Segment, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Open,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Right,
    Left,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Right,
        Direction::Left,
    ];

    /// (row, column) delta of one cell
    #[inline]
    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Right => (0, 1),
            Direction::Left => (0, -1),
        }
    }
}

/// Row-major grid of cells, `height` rows by `width` columns.
#[derive(Debug, Clone)]
pub struct MazeGrid {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
}

impl MazeGrid {
    fn filled(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![Cell::Blocked; height * width],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.width + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.width + col] = cell;
    }

    #[inline]
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Cell::Open
    }

    pub fn open_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Open).count()
    }

    /// Strictly inside the border
    #[inline]
    fn is_interior(&self, row: isize, col: isize) -> bool {
        row > 0 && col > 0 && row < self.height as isize - 1 && col < self.width as isize - 1
    }

    fn seal_border(&mut self) {
        for row in 0..self.height {
            for col in 0..self.width {
                if row == 0 || col == 0 || row == self.height - 1 || col == self.width - 1 {
                    self.set(row, col, Cell::Blocked);
                }
            }
        }
    }

    /// Four edges of every blocked cell, cell `(i, j)` placed at `(j * cell, i * cell)`.
    /// Shared edges of neighbouring blocks are emitted twice.
    pub fn wall_segments(&self, cell_size: f32) -> Vec<Segment> {
        let mut walls = Vec::new();
        for row in 0..self.height {
            let y = row as f32 * cell_size;
            for col in 0..self.width {
                if self.get(row, col) != Cell::Blocked {
                    continue;
                }
                let p = Vec2::new(col as f32 * cell_size, y);
                let right = Vec2::new(cell_size, 0.0);
                let down = Vec2::new(0.0, cell_size);
                let far = p + right + down;
                walls.push(Segment::new(p, p + right));
                walls.push(Segment::new(p, p + down));
                walls.push(Segment::new(far, p + right));
                walls.push(Segment::new(far, p + down));
            }
        }
        walls
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CarveStats {
    pub carved: u32,
    pub teleports: u32,
}

/// Randomized two-cell carving from `(1, 1)`.
///
/// Each iteration picks a direction and tries to jump two cells; the jump
/// succeeds only onto a blocked interior cell, opening the cell in between.
/// Once all four directions have failed in a row the cursor hops to a
/// randomly sampled open odd cell. Runs exactly `budget` iterations so a
/// boxed-in cursor can never hang generation.
pub fn carve<R: Rng + ?Sized>(
    height: usize,
    width: usize,
    budget: u32,
    rng: &mut R,
) -> (MazeGrid, CarveStats) {
    let mut grid = MazeGrid::filled(height, width);
    let mut stats = CarveStats::default();

    let (mut row, mut col) = (1usize, 1usize);
    grid.set(row, col, Cell::Open);
    let mut dead_ends = [false; 4];

    // odd interior coordinates are 1, 3, .., dim - 2
    let odd_rows = (height - 1) / 2;
    let odd_cols = (width - 1) / 2;

    for _ in 0..budget {
        let dir = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        let (dr, dc) = dir.delta();
        let target = (row as isize + 2 * dr, col as isize + 2 * dc);

        if grid.is_interior(target.0, target.1)
            && !grid.is_open(target.0 as usize, target.1 as usize)
        {
            let (tr, tc) = (target.0 as usize, target.1 as usize);
            grid.set(tr, tc, Cell::Open);
            grid.set((row as isize + dr) as usize, (col as isize + dc) as usize, Cell::Open);
            row = tr;
            col = tc;
            dead_ends = [false; 4];
            stats.carved += 1;
        } else {
            dead_ends[dir as usize] = true;
        }

        let cand_row = rng.gen_range(0..odd_rows) * 2 + 1;
        let cand_col = rng.gen_range(0..odd_cols) * 2 + 1;
        if dead_ends.iter().all(|&d| d) && grid.is_open(cand_row, cand_col) {
            log::trace!("carver stuck at ({row}, {col}), resuming at ({cand_row}, {cand_col})");
            row = cand_row;
            col = cand_col;
            dead_ends = [false; 4];
            stats.teleports += 1;
        }
    }

    grid.seal_border();
    (grid, stats)
}
