use hiero_vision::PixelGrid;

pub const BACKGROUND: u8 = 100;
pub const INK: u8 = 255;

/// A `rows x cols` grid of `BACKGROUND` with `INK` at every listed `(row, col)`.
pub fn grid_with_ink(rows: usize, cols: usize, ink: &[(usize, usize)]) -> PixelGrid {
    let mut values = vec![vec![BACKGROUND; cols]; rows];
    for &(row, col) in ink {
        values[row][col] = INK;
    }
    PixelGrid::from_rows(values).expect("synthetic grid is rectangular")
}

/// Every cell of the half-open rectangle `rows x cols`.
pub fn block(rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> Vec<(usize, usize)> {
    rows.flat_map(|row| cols.clone().map(move |col| (row, col)))
        .collect()
}
