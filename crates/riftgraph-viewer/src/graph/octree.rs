//! Barnes-Hut octree for the many-body force. Cells far enough from the
//! queried point act as a single mass at their centre of mass.

use bevy::prelude::Vec3;
use smallvec::SmallVec;

/// Opening criterion: a cell of width `w` at squared distance `l` is
/// approximated when `w * w / THETA2 < l`.
pub const BARNES_HUT_THETA: f32 = 0.9;
const THETA2: f32 = BARNES_HUT_THETA * BARNES_HUT_THETA;

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: u32 = 16;

#[derive(Debug, Clone)]
struct Cell {
    center: Vec3,
    half: f32,
    mass: f32,
    com: Vec3,
    // Index of the first of eight contiguous children.
    children: Option<usize>,
    points: SmallVec<[usize; LEAF_CAPACITY]>,
}

impl Cell {
    fn new(center: Vec3, half: f32) -> Self {
        Self {
            center,
            half,
            mass: 0.0,
            com: Vec3::ZERO,
            children: None,
            points: SmallVec::new(),
        }
    }
}

fn octant(center: Vec3, p: Vec3) -> usize {
    usize::from(p.x >= center.x)
        | usize::from(p.y >= center.y) << 1
        | usize::from(p.z >= center.z) << 2
}

/// Coincident points get a small deterministic nudge instead of a NaN.
pub fn jiggle(i: usize, j: usize) -> Vec3 {
    let k = ((i * 31 + j * 17) % 7) as f32 + 1.0;
    Vec3::new(1e-3 * k, -1e-3 * k, 5e-4 * k)
}

// d3-style distance weighting: below unit distance the falloff is linear.
fn falloff(l: f32) -> f32 {
    if l < 1.0 {
        l.sqrt()
    } else {
        l
    }
}

#[derive(Debug, Clone)]
pub struct Octree {
    cells: Vec<Cell>,
}

impl Octree {
    pub fn build(points: &[Vec3]) -> Self {
        let (lo, hi) = points.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        );
        let (center, half) = if points.is_empty() {
            (Vec3::ZERO, 1.0)
        } else {
            ((lo + hi) * 0.5, ((hi - lo).max_element() * 0.5).max(1.0) + 1.0)
        };

        let mut tree = Self {
            cells: vec![Cell::new(center, half)],
        };
        for idx in 0..points.len() {
            tree.insert(points, idx, 0, 0);
        }
        tree
    }

    fn insert(&mut self, points: &[Vec3], idx: usize, mut cell: usize, mut depth: u32) {
        let p = points[idx];
        loop {
            let c = &mut self.cells[cell];
            c.com = (c.com * c.mass + p) / (c.mass + 1.0);
            c.mass += 1.0;
            match c.children {
                Some(first) => {
                    cell = first + octant(c.center, p);
                    depth += 1;
                }
                None => {
                    c.points.push(idx);
                    if c.points.len() > LEAF_CAPACITY && depth < MAX_DEPTH {
                        self.split(points, cell, depth);
                    }
                    return;
                }
            }
        }
    }

    fn split(&mut self, points: &[Vec3], cell: usize, depth: u32) {
        let first = self.cells.len();
        let (center, half) = (self.cells[cell].center, self.cells[cell].half);
        let q = half * 0.5;
        for o in 0..8 {
            let offset = Vec3::new(
                if o & 1 != 0 { q } else { -q },
                if o & 2 != 0 { q } else { -q },
                if o & 4 != 0 { q } else { -q },
            );
            self.cells.push(Cell::new(center + offset, q));
        }
        let moved = std::mem::take(&mut self.cells[cell].points);
        self.cells[cell].children = Some(first);
        for idx in moved {
            let child = first + octant(center, points[idx]);
            self.insert(points, idx, child, depth + 1);
        }
    }

    /// Velocity change on point `i` from every other point, scaled by
    /// `strength` (negative repels).
    pub fn force_on(&self, i: usize, points: &[Vec3], strength: f32) -> Vec3 {
        let p = points[i];
        let mut acc = Vec3::ZERO;
        let mut stack: SmallVec<[usize; 64]> = SmallVec::new();
        stack.push(0);
        while let Some(ci) = stack.pop() {
            let c = &self.cells[ci];
            if c.mass == 0.0 {
                continue;
            }
            match c.children {
                Some(first) => {
                    let d = c.com - p;
                    let l = d.length_squared();
                    let w = c.half * 2.0;
                    if w * w / THETA2 < l {
                        acc += d * (strength * c.mass / falloff(l));
                    } else {
                        stack.extend(first..first + 8);
                    }
                }
                None => {
                    for &j in &c.points {
                        if j == i {
                            continue;
                        }
                        let mut d = points[j] - p;
                        let mut l = d.length_squared();
                        if l == 0.0 {
                            d = if i < j { jiggle(i, j) } else { -jiggle(j, i) };
                            l = d.length_squared();
                        }
                        acc += d * (strength / falloff(l));
                    }
                }
            }
        }
        acc
    }

    #[cfg(test)]
    fn mass(&self) -> f32 {
        self.cells[0].mass
    }
}
