//! Destructible heightmap terrain
//!
//! One height value per world column. Screen coordinates grow downward, so
//! a larger height means a lower surface. Explosions only ever dig.

use anyhow::ensure;
use glam::DVec2;
use rand::Rng;
use serde::Serialize;

use crate::consts::*;

/// Vertical spread of generated anchor heights
pub const TERRAIN_DEPTH_RANGE: i32 = 300;
/// Random part of the horizontal distance between anchors
pub const TERRAIN_INTERVAL_RANGE: i32 = 105;
/// Fixed part of the horizontal distance between anchors
pub const TERRAIN_INTERVAL_FLOOR: i32 = 55;

/// Fixed-width heightmap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Terrain {
    tops: Box<[i32]>,
}

impl Terrain {
    /// Level ground at `height` across the whole world
    pub fn flat(height: i32) -> Self {
        let height = height.clamp(0, WORLD_HEIGHT);
        Self {
            tops: vec![height; WORLD_WIDTH].into_boxed_slice(),
        }
    }

    /// Terrain from explicit column heights
    pub fn from_heights(heights: Vec<i32>) -> anyhow::Result<Self> {
        ensure!(
            heights.len() == WORLD_WIDTH,
            "terrain needs {} columns, got {}",
            WORLD_WIDTH,
            heights.len()
        );
        let tops = heights
            .into_iter()
            .map(|h| h.clamp(0, WORLD_HEIGHT))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(Self { tops })
    }

    /// Hills and valleys built from a chain of random linear segments
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut tops = vec![0; WORLD_WIDTH];

        // The first segment starts where this anchor ends
        let mut end = DVec2::new(0.0, anchor_height(rng));
        let (mut start, mut slope) = next_segment(rng, &mut end);

        for (x, top) in tops.iter_mut().enumerate() {
            let y = slope * (x as f64 - start.x) + start.y;
            *top = (y.round() as i32).clamp(0, WORLD_HEIGHT);

            if x as f64 >= end.x {
                (start, slope) = next_segment(rng, &mut end);
            }
        }

        log::debug!("Generated terrain: {} columns", tops.len());
        Self {
            tops: tops.into_boxed_slice(),
        }
    }

    /// Number of columns
    #[inline]
    pub fn width(&self) -> usize {
        self.tops.len()
    }

    /// Raw column heights
    pub fn heights(&self) -> &[i32] {
        &self.tops
    }

    /// Topmost solid height of a column; out-of-range columns clamp to the edge
    pub fn height_at(&self, column: i64) -> i32 {
        let last = self.tops.len() as i64 - 1;
        self.tops[column.clamp(0, last) as usize]
    }

    /// True when the point is at or below the surface of its column
    pub fn is_ground(&self, point: DVec2) -> bool {
        point.y >= self.height_at(point.x.floor() as i64) as f64
    }

    /// Dig a crater centered on `center`
    ///
    /// Each column within `radius` sinks by an exaggerated circular profile.
    /// The surface never rises and never goes past the world floor.
    pub fn deform(&mut self, center: DVec2, radius: f64) {
        let reach = radius.floor() as i64;
        let center_column = center.x.floor() as i64;

        for dx in -reach..=reach {
            let column = center_column + dx;
            if column < 0 || column >= self.tops.len() as i64 {
                continue;
            }

            let depth = ((radius * radius - (dx * dx) as f64).max(0.0).sqrt()
                * CRATER_DEPTH_SCALE)
                .round() as i32;
            let existing = self.tops[column as usize];
            let explosion_floor = (center.y + depth as f64).round() as i32;

            let dug = explosion_floor.min(existing + depth).max(existing);
            self.tops[column as usize] = dug.min(WORLD_HEIGHT);
        }
    }
}

fn anchor_height<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (WORLD_HEIGHT / 3 + rng.random_range(0..=TERRAIN_DEPTH_RANGE)) as f64
}

/// Advance `end` to a new anchor; returns the segment start and its slope
fn next_segment<R: Rng + ?Sized>(rng: &mut R, end: &mut DVec2) -> (DVec2, f64) {
    let start = *end;
    end.x += (rng.random_range(0..=TERRAIN_INTERVAL_RANGE) + TERRAIN_INTERVAL_FLOOR) as f64;
    end.y = anchor_height(rng);
    let slope = (end.y - start.y) / (end.x - start.x);
    (start, slope)
}
