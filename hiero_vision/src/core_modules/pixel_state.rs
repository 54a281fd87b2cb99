// THEORY:
// The `pixel_state` module holds the transient working layer a single scan lays
// over an immutable `PixelGrid`. Each cell gets one small `PixelState` record in
// a flat vector indexed exactly like the grid.
//
// Key architectural principles:
// 1.  **Classify Once**: The foreground flag is derived from the background and
//     tolerance when the layer is built, one pass over the grid, and is never
//     written again. Region growing only ever reads it.
// 2.  **Claim Once**: The visited flag is the only mutable part. A pixel is
//     claimed the moment it is accepted into a region, so no pixel can end up in
//     two regions and no pixel is ever examined as a seed twice.
// 3.  **Scan-Scoped Ownership**: A `ScanState` is created by, and dropped with,
//     the scan that owns it. Two images never share one.

use crate::core_modules::glyph_blob::Point;
use crate::core_modules::pixel_grid::PixelGrid;

/// Default minimum absolute difference from the background for a foreground pixel.
pub const DEFAULT_TOLERANCE: u8 = 40;

/// Working state of one grid cell during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelState {
    pub value: u8,
    pub is_foreground: bool,
    pub visited: bool,
}

/// True when `value` deviates from `background` by strictly more than `tolerance`,
/// in either direction.
pub fn is_foreground(value: u8, background: u8, tolerance: u8) -> bool {
    let value = i16::from(value);
    let background = i16::from(background);
    let tolerance = i16::from(tolerance);
    value - background > tolerance || background - value > tolerance
}

/// The per-scan state layer for one grid.
#[derive(Debug, Clone)]
pub struct ScanState {
    rows: u32,
    cols: u32,
    cells: Vec<PixelState>,
    foreground_count: usize,
}

impl ScanState {
    /// Classifies every pixel of `grid` against `background`.
    pub fn classify(grid: &PixelGrid, background: u8, tolerance: u8) -> Self {
        let cells: Vec<PixelState> = grid
            .values()
            .iter()
            .map(|&value| PixelState {
                value,
                is_foreground: is_foreground(value, background, tolerance),
                visited: false,
            })
            .collect();
        let foreground_count = cells.iter().filter(|cell| cell.is_foreground).count();

        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            cells,
            foreground_count,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn foreground_count(&self) -> usize {
        self.foreground_count
    }

    pub fn contains(&self, point: Point) -> bool {
        point.row < self.rows && point.col < self.cols
    }

    pub fn cell(&self, point: Point) -> &PixelState {
        &self.cells[self.index(point)]
    }

    /// A pixel can join a region if it is foreground and nobody has claimed it yet.
    pub fn is_claimable(&self, point: Point) -> bool {
        let cell = self.cell(point);
        cell.is_foreground && !cell.visited
    }

    pub fn claim(&mut self, point: Point) {
        let index = self.index(point);
        self.cells[index].visited = true;
    }

    fn index(&self, point: Point) -> usize {
        point.row as usize * self.cols as usize + point.col as usize
    }
}
