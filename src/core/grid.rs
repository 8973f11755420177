//! Spatial hash for inter-particle links
//!
//! The plane is split into square cells whose side equals the link distance,
//! so every partner of a particle lies in its own cell or one of the 8
//! neighbours. This keeps link search near-linear instead of all-pairs.

use std::collections::HashMap;

use super::particle::Particle;

/// A drawable link between particles `a` and `b` (`a < b`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    pub opacity: f64,
}

/// Particle indices bucketed by grid cell.
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    pub fn build(particles: &[Particle], cell_size: f64) -> Self {
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        if cell_size > 0.0 {
            for (i, p) in particles.iter().enumerate() {
                cells.entry(Self::cell_of(p, cell_size)).or_default().push(i);
            }
        }
        Self { cell_size, cells }
    }

    #[inline]
    fn cell_of(p: &Particle, cell_size: f64) -> (i64, i64) {
        (
            (p.x / cell_size).floor() as i64,
            (p.y / cell_size).floor() as i64,
        )
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Collect every pair closer than `max_distance`.
    ///
    /// Opacity decays linearly from `max_opacity` at distance 0 to zero at
    /// `max_distance`, scaled by `opacity_factor`. Pairs whose opacity is not
    /// positive are dropped. `max_distance` must not exceed the cell size.
    pub fn links(
        &self,
        particles: &[Particle],
        max_distance: f64,
        max_opacity: f64,
        opacity_factor: f64,
    ) -> Vec<Link> {
        let mut links = Vec::new();
        if self.cell_size <= 0.0 || max_distance <= 0.0 {
            return links;
        }
        let max_dist_sq = max_distance * max_distance;

        for (i, a) in particles.iter().enumerate() {
            let (cx, cy) = Self::cell_of(a, self.cell_size);
            for oy in -1..=1 {
                for ox in -1..=1 {
                    let Some(bucket) = self.cells.get(&(cx + ox, cy + oy)) else {
                        continue;
                    };
                    for &j in bucket {
                        if j <= i {
                            continue;
                        }
                        let b = &particles[j];
                        let dx = b.x - a.x;
                        let dy = b.y - a.y;
                        let dist_sq = dx * dx + dy * dy;
                        if dist_sq >= max_dist_sq {
                            continue;
                        }
                        let distance = dist_sq.sqrt();
                        let opacity = max_opacity * (1.0 - distance / max_distance) * opacity_factor;
                        if opacity <= 0.0 {
                            continue;
                        }
                        links.push(Link { a: i, b: j, distance, opacity });
                    }
                }
            }
        }
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FieldConfig;
    use crate::core::particle::{create_particles, Viewport};
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::BTreeSet;

    fn at(x: f64, y: f64) -> Particle {
        Particle { x, y, target_x: x, target_y: y, vx: 0.0, vy: 0.0, radius: 2.0 }
    }

    fn brute_force_pairs(particles: &[Particle], max_distance: f64) -> BTreeSet<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                let dx = particles[j].x - particles[i].x;
                let dy = particles[j].y - particles[i].y;
                if dx * dx + dy * dy < max_distance * max_distance {
                    pairs.insert((i, j));
                }
            }
        }
        pairs
    }

    #[test]
    fn concrete_link_scenario() {
        let particles = vec![at(100.0, 100.0), at(200.0, 100.0), at(400.0, 100.0)];
        let grid = SpatialGrid::build(&particles, 140.0);
        let links = grid.links(&particles, 140.0, 0.38, 1.0);

        assert_eq!(links.len(), 1);
        let link = links[0];
        assert_eq!((link.a, link.b), (0, 1));
        assert_eq!(link.distance, 100.0);
        let expected = 0.38 * (1.0 - 100.0 / 140.0);
        assert!((link.opacity - expected).abs() < 1e-12);
        assert!((link.opacity - 0.108).abs() < 1e-3);
        assert!(!links.iter().any(|l| (l.a, l.b) == (0, 2)));
    }

    #[test]
    fn matches_brute_force_on_random_fields() {
        let config = FieldConfig::default();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let vp = Viewport::new(1024.0, 768.0, 1.0, 1.25);
            let particles = create_particles(&mut rng, &config, &vp, false);

            let grid = SpatialGrid::build(&particles, config.max_link_distance);
            let hashed: BTreeSet<(usize, usize)> = grid
                .links(&particles, config.max_link_distance, config.max_line_opacity, 1.0)
                .iter()
                .map(|l| (l.a, l.b))
                .collect();

            assert_eq!(hashed, brute_force_pairs(&particles, config.max_link_distance), "seed {seed}");
        }
    }

    #[test]
    fn pairs_across_cell_borders_are_found() {
        // 139.0 and 141.0 fall into neighbouring cells
        let particles = vec![at(139.0, 139.0), at(141.0, 141.0), at(279.0, 0.0)];
        let grid = SpatialGrid::build(&particles, 140.0);
        let pairs: BTreeSet<_> = grid
            .links(&particles, 140.0, 0.38, 1.0)
            .iter()
            .map(|l| (l.a, l.b))
            .collect();
        assert_eq!(pairs, brute_force_pairs(&particles, 140.0));
        assert!(pairs.contains(&(0, 1)));
    }

    #[test]
    fn each_pair_is_reported_once() {
        let particles = vec![at(10.0, 10.0), at(20.0, 10.0), at(30.0, 10.0)];
        let grid = SpatialGrid::build(&particles, 140.0);
        let links = grid.links(&particles, 140.0, 0.38, 1.0);
        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|l| l.a < l.b));
    }

    #[test]
    fn zero_opacity_factor_drops_all_links() {
        let particles = vec![at(10.0, 10.0), at(20.0, 10.0)];
        let grid = SpatialGrid::build(&particles, 140.0);
        assert!(grid.links(&particles, 140.0, 0.38, 0.0).is_empty());
    }

    #[test]
    fn degenerate_cell_size_yields_no_links() {
        let particles = vec![at(0.0, 0.0), at(0.0, 0.0)];
        let grid = SpatialGrid::build(&particles, 0.0);
        assert_eq!(grid.occupied_cells(), 0);
        assert!(grid.links(&particles, 0.0, 0.38, 1.0).is_empty());
    }
}
