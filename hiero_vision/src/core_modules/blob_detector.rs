// THEORY:
// The `BlobDetector` is the engine of the segmentation layer. It turns a
// classified grid into a list of connected regions, one per glyph candidate,
// using a tolerant region-growing rule rather than strict 4- or 8-connectivity.
//
// Key architectural principles & algorithm steps:
// 1.  **Raster Seeding**: The grid is walked row by row, left to right. Every
//     foreground pixel that no region has claimed yet becomes the seed of a new
//     region. Emission order is therefore raster discovery order, and later
//     stages rely on it for stable naming.
// 2.  **Windowed Region Growing**: From the seed, the region expands
//     breadth-first through a 5x5 window centred on each accepted pixel. Two
//     foreground pixels up to two rows or columns apart are neighbours, so a
//     stroke broken by a one-pixel gap still grows as one region. The price is
//     that glyphs drawn very close together can merge.
// 3.  **Claim on Accept**: A neighbour is marked visited the moment it is
//     queued, never when it is dequeued. No pixel is queued twice and no pixel
//     belongs to two regions.
// 4.  **Explicit Queue**: Growth uses a `VecDeque` work queue, not recursion, so
//     the size of a glyph never bounds the stack.
// 5.  **Edge Quirk**: A neighbour in row 0 or column 0 is never accepted. Only a
//     raster seed can sit there. This is kept deliberately; see DESIGN.md.

use crate::core_modules::glyph_blob::{GlyphBlob, Point};
use crate::core_modules::pixel_grid::PixelGrid;
use crate::core_modules::pixel_state::ScanState;

pub mod blob_detector {
    use super::*;
    use log::{debug, trace};
    use std::collections::VecDeque;

    /// Half-width of the neighbourhood window. 2 gives a 5x5 window.
    pub const WINDOW_RADIUS: i64 = 2;

    /// Scans the whole grid and returns every connected region, unfiltered, in
    /// raster discovery order.
    pub fn find_blobs(grid: &PixelGrid, background: u8, tolerance: u8) -> Vec<GlyphBlob> {
        let mut state = ScanState::classify(grid, background, tolerance);
        debug!(
            "classified {} of {} pixels as foreground (background {}, tolerance {})",
            state.foreground_count(),
            grid.len(),
            background,
            tolerance
        );
        scan(&mut state)
    }

    /// Drives `grow_region` over an already classified state layer.
    pub fn scan(state: &mut ScanState) -> Vec<GlyphBlob> {
        let mut blobs: Vec<GlyphBlob> = Vec::new();

        for row in 0..state.rows() {
            for col in 0..state.cols() {
                let seed = Point::new(row, col);
                if !state.is_claimable(seed) {
                    continue;
                }

                let pixels = grow_region(state, seed);
                trace!(
                    "region {} seeded at ({}, {}) grew to {} pixels",
                    blobs.len(),
                    row,
                    col,
                    pixels.len()
                );
                if let Some(blob) = GlyphBlob::new(blobs.len(), pixels) {
                    blobs.push(blob);
                }
            }
        }

        blobs
    }

    /// Grows one region from `seed`, claiming every reachable unclaimed
    /// foreground pixel. The seed is claimed too and is always the first element.
    ///
    /// The seed must be an in-bounds, unclaimed foreground pixel. Any other seed
    /// grows nothing: the result is empty and `state` is left as it was.
    pub fn grow_region(state: &mut ScanState, seed: Point) -> Vec<Point> {
        if !state.contains(seed) || !state.is_claimable(seed) {
            return Vec::new();
        }
        let rows = i64::from(state.rows());
        let cols = i64::from(state.cols());

        let mut region: Vec<Point> = Vec::new();
        let mut queue: VecDeque<Point> = VecDeque::from([seed]);
        state.claim(seed);

        while let Some(current) = queue.pop_front() {
            region.push(current);

            for d_col in -WINDOW_RADIUS..=WINDOW_RADIUS {
                for d_row in -WINDOW_RADIUS..=WINDOW_RADIUS {
                    let row = i64::from(current.row) + d_row;
                    let col = i64::from(current.col) + d_col;

                    // Strictly positive on purpose: row 0 and column 0 are never neighbours.
                    if row <= 0 || col <= 0 || row >= rows || col >= cols {
                        continue;
                    }

                    let neighbour = Point::new(row as u32, col as u32);
                    if state.is_claimable(neighbour) {
                        state.claim(neighbour);
                        queue.push_back(neighbour);
                    }
                }
            }
        }

        region
    }
}

#[cfg(test)]
mod tests {
    use super::blob_detector::*;
    use super::*;
    use std::collections::HashSet;

    const BACKGROUND: u8 = 100;
    const INK: u8 = 255;

    fn grid_with(rows: u32, cols: u32, ink: &[(u32, u32)]) -> PixelGrid {
        let mut values = vec![vec![BACKGROUND; cols as usize]; rows as usize];
        for &(row, col) in ink {
            values[row as usize][col as usize] = INK;
        }
        PixelGrid::from_rows(values).expect("valid grid")
    }

    #[test]
    fn uniform_grid_has_no_blobs() {
        let grid = grid_with(10, 10, &[]);
        assert!(find_blobs(&grid, BACKGROUND, 40).is_empty());
    }

    #[test]
    fn one_pixel_gap_is_bridged() {
        let grid = grid_with(8, 12, &[(3, 3), (3, 5)]);
        let blobs = find_blobs(&grid, BACKGROUND, 40);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].len(), 2);
    }

    #[test]
    fn two_pixel_gap_splits() {
        let grid = grid_with(8, 12, &[(3, 3), (3, 6)]);
        let blobs = find_blobs(&grid, BACKGROUND, 40);
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].pixels(), &[Point::new(3, 3)]);
        assert_eq!(blobs[1].pixels(), &[Point::new(3, 6)]);
    }

    #[test]
    fn diagonal_reach_covers_the_whole_window() {
        let grid = grid_with(8, 8, &[(2, 2), (4, 4), (6, 2)]);
        let blobs = find_blobs(&grid, BACKGROUND, 40);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].len(), 3);
    }

    #[test]
    fn row_zero_is_never_a_neighbour() {
        // (0, 3) seeds a region and pulls (1, 3) in; (0, 5) is in reach of both
        // but sits on row 0, so it can only become a seed of its own.
        let grid = grid_with(5, 10, &[(0, 3), (1, 3), (0, 5)]);
        let blobs = find_blobs(&grid, BACKGROUND, 40);

        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].pixels(), &[Point::new(0, 3), Point::new(1, 3)]);
        assert_eq!(blobs[1].pixels(), &[Point::new(0, 5)]);
    }

    #[test]
    fn column_zero_is_never_a_neighbour() {
        let grid = grid_with(6, 6, &[(2, 1), (3, 0)]);
        let blobs = find_blobs(&grid, BACKGROUND, 40);

        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].pixels(), &[Point::new(2, 1)]);
        assert_eq!(blobs[1].pixels(), &[Point::new(3, 0)]);
    }

    #[test]
    fn growth_is_independent_of_the_seed() {
        let ink: Vec<(u32, u32)> = vec![(2, 2), (2, 3), (3, 4), (5, 4), (6, 6), (7, 7), (4, 8)];
        let grid = grid_with(10, 10, &ink);
        let expected: HashSet<Point> = ink.iter().map(|&(r, c)| Point::new(r, c)).collect();

        for &(row, col) in &ink {
            let mut state = ScanState::classify(&grid, BACKGROUND, 40);
            let region = grow_region(&mut state, Point::new(row, col));
            let found: HashSet<Point> = region.iter().copied().collect();

            assert_eq!(region[0], Point::new(row, col));
            assert_eq!(region.len(), found.len());
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn seeds_that_are_not_claimable_grow_nothing() {
        let grid = grid_with(6, 6, &[(2, 2), (2, 3)]);
        let mut state = ScanState::classify(&grid, BACKGROUND, 40);

        // Background seed: must not be claimed or pull in nearby ink.
        assert!(grow_region(&mut state, Point::new(2, 1)).is_empty());
        assert!(!state.cell(Point::new(2, 1)).visited);
        assert!(state.is_claimable(Point::new(2, 2)));

        // Out of bounds.
        assert!(grow_region(&mut state, Point::new(6, 0)).is_empty());
        assert!(grow_region(&mut state, Point::new(0, 40)).is_empty());

        // Already claimed by an earlier region.
        assert_eq!(grow_region(&mut state, Point::new(2, 2)).len(), 2);
        assert!(grow_region(&mut state, Point::new(2, 3)).is_empty());
    }

    #[test]
    fn every_foreground_pixel_is_claimed_exactly_once() {
        let ink: Vec<(u32, u32)> = (1..9)
            .flat_map(|row| (1..15).map(move |col| (row, col)))
            .filter(|&(row, col)| (row * 7 + col * 3) % 4 == 0)
            .collect();
        let grid = grid_with(10, 16, &ink);
        let blobs = find_blobs(&grid, BACKGROUND, 40);

        let mut seen: HashSet<Point> = HashSet::new();
        for blob in &blobs {
            for point in blob.pixels() {
                assert!(seen.insert(*point), "pixel {point:?} claimed twice");
            }
        }
        assert_eq!(seen.len(), ink.len());
    }

    #[test]
    fn discovery_indices_follow_raster_order() {
        let grid = grid_with(12, 12, &[(8, 2), (2, 9), (5, 5)]);
        let blobs = find_blobs(&grid, BACKGROUND, 40);

        let seeds: Vec<Point> = blobs.iter().map(|blob| blob.pixels()[0]).collect();
        assert_eq!(
            seeds,
            vec![Point::new(2, 9), Point::new(5, 5), Point::new(8, 2)]
        );
        let indices: Vec<usize> = blobs.iter().map(GlyphBlob::discovery_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
