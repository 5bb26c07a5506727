//! Spatial hash grid broadphase.
//!
//! Every proxy is inserted into each cell its bounds touch. A candidate pair
//! is reported only from the cell holding the minimum corner of the pair's
//! overlap region, so each overlapping pair comes out exactly once without a
//! seen-set.

use super::shape::Aabb;
use glam::Vec2;
use std::collections::HashMap;

/// Grid cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Entry handed to the broadphase: an opaque id plus its bounds.
#[derive(Debug, Clone, Copy)]
pub struct Proxy {
    pub id: u32,
    pub aabb: Aabb,
}

pub struct SpatialHashGrid {
    cell_size: f32,
    /// Map from cell coordinates to indices into the proxy list.
    cells: HashMap<CellCoord, Vec<u32>>,
}

impl SpatialHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Convert a position to a cell coordinate.
    fn pos_to_cell(&self, p: Vec2) -> CellCoord {
        CellCoord::new(
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    /// Rebuild the grid from scratch.
    pub fn rebuild(&mut self, proxies: &[Proxy]) {
        self.cells.clear();
        for (i, proxy) in proxies.iter().enumerate() {
            let lo = self.pos_to_cell(proxy.aabb.min);
            let hi = self.pos_to_cell(proxy.aabb.max);
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    self.cells
                        .entry(CellCoord::new(x, y))
                        .or_default()
                        .push(i as u32);
                }
            }
        }
    }

    /// Emit every overlapping pair of proxy indices, each exactly once.
    ///
    /// Pairs come out sorted so the solver sees the same contact order on
    /// every run regardless of hash-map iteration order.
    pub fn pairs(&self, proxies: &[Proxy], out: &mut Vec<(u32, u32)>) {
        out.clear();
        for (&cell, entries) in &self.cells {
            for (n, &i) in entries.iter().enumerate() {
                let a = &proxies[i as usize].aabb;
                for &j in &entries[n + 1..] {
                    let b = &proxies[j as usize].aabb;
                    if !a.overlaps(b) {
                        continue;
                    }
                    if self.pos_to_cell(a.min.max(b.min)) == cell {
                        out.push((i, j));
                    }
                }
            }
        }
        out.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(id: u32, x: f32, y: f32, r: f32) -> Proxy {
        Proxy {
            id,
            aabb: Aabb::around(Vec2::new(x, y), r),
        }
    }

    #[test]
    fn test_overlapping_pair_reported_once_across_cells() {
        let mut grid = SpatialHashGrid::new(4.0);
        // Both proxies span several cells
        let proxies = [proxy(0, 0.0, 0.0, 5.0), proxy(1, 3.0, 3.0, 5.0)];
        grid.rebuild(&proxies);
        let mut pairs = Vec::new();
        grid.pairs(&proxies, &mut pairs);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_pairs_come_out_sorted() {
        let mut grid = SpatialHashGrid::new(2.0);
        let proxies: Vec<Proxy> = (0..30)
            .map(|i| proxy(i, (i % 6) as f32 * 3.0, (i / 6) as f32 * 3.0, 2.0))
            .collect();
        grid.rebuild(&proxies);
        let mut pairs = Vec::new();
        grid.pairs(&proxies, &mut pairs);
        assert!(!pairs.is_empty());
        assert!(pairs.windows(2).all(|w| w[0] < w[1]));
        assert!(pairs.iter().all(|&(a, b)| a < b));
    }

    #[test]
    fn test_distant_proxies_produce_no_pair() {
        let mut grid = SpatialHashGrid::new(4.0);
        let proxies = [proxy(0, 0.0, 0.0, 1.0), proxy(1, 50.0, 0.0, 1.0)];
        grid.rebuild(&proxies);
        let mut pairs = Vec::new();
        grid.pairs(&proxies, &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        let mut grid = SpatialHashGrid::new(3.0);
        let proxies: Vec<Proxy> = (0..40)
            .map(|i| {
                let f = i as f32;
                proxy(i, (f * 7.3) % 30.0, (f * 3.1) % 20.0, 1.0 + (i % 4) as f32)
            })
            .collect();
        grid.rebuild(&proxies);
        let mut pairs = Vec::new();
        grid.pairs(&proxies, &mut pairs);
        let mut found: Vec<(u32, u32)> = pairs
            .into_iter()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        found.sort_unstable();

        let mut expected = Vec::new();
        for i in 0..proxies.len() {
            for j in (i + 1)..proxies.len() {
                if proxies[i].aabb.overlaps(&proxies[j].aabb) {
                    expected.push((i as u32, j as u32));
                }
            }
        }
        assert_eq!(found, expected);
    }
}
