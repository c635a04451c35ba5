//! Axis-aligned rectangle overlap and the static collision mesh.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Side length of the square world-space buckets used by
/// [`BucketedCollisionMesh`].
pub const COLLISION_BUCKET_SIZE: f32 = 256.0;

/// Axis-aligned rectangle expressed in world pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    origin: Vec2,
    size: Vec2,
}

impl WorldRect {
    /// Creates a rectangle from its upper-left corner and its extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Creates a rectangle from an origin and a size vector.
    #[must_use]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Smallest x coordinate covered by the rectangle.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    /// Smallest y coordinate covered by the rectangle.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }

    /// Reports whether both axis overlaps are strictly positive.
    ///
    /// Rectangles that only share an edge or a corner do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &WorldRect) -> bool {
        let horizontal = (self.right().min(other.right()) - self.left().max(other.left())).max(0.0);
        let vertical = (self.bottom().min(other.bottom()) - self.top().max(other.top())).max(0.0);
        horizontal > 0.0 && vertical > 0.0
    }

    /// Reports whether the point lies inside the half-open rectangle.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

/// Static geometry that test rectangles can be checked against.
///
/// Implementations must agree on results so a spatial index can replace a
/// linear scan without changing behaviour at call sites.
pub trait CollisionQuery {
    /// Reports whether `rect` overlaps any stored rectangle.
    fn overlaps(&self, rect: &WorldRect) -> bool;
}

/// Collision mesh that scans every stored rectangle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionMesh {
    rects: Vec<WorldRect>,
}

impl CollisionMesh {
    /// Creates a mesh from world-space rectangles.
    #[must_use]
    pub fn new(rects: Vec<WorldRect>) -> Self {
        Self { rects }
    }

    /// Rectangles stored in the mesh.
    #[must_use]
    pub fn rects(&self) -> &[WorldRect] {
        &self.rects
    }

    /// Number of stored rectangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Reports whether the mesh stores no rectangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

impl CollisionQuery for CollisionMesh {
    fn overlaps(&self, rect: &WorldRect) -> bool {
        self.rects.iter().any(|stored| stored.overlaps(rect))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BucketCoord {
    x: i32,
    y: i32,
}

/// Widest bucket span, per axis, that a rectangle may cover before it is kept
/// out of the bucket index and scanned linearly instead.
const MAX_BUCKET_SPAN: f32 = 64.0;

/// Collision mesh that files rectangles into fixed-size world buckets.
#[derive(Clone, Debug, Default)]
pub struct BucketedCollisionMesh {
    rects: Vec<WorldRect>,
    buckets: HashMap<BucketCoord, Vec<usize>>,
    oversized: Vec<usize>,
}

impl BucketedCollisionMesh {
    /// Indexes every rectangle of `mesh`.
    #[must_use]
    pub fn from_mesh(mesh: &CollisionMesh) -> Self {
        let rects = mesh.rects().to_vec();
        let mut buckets: HashMap<BucketCoord, Vec<usize>> = HashMap::new();
        let mut oversized = Vec::new();
        for (index, rect) in rects.iter().enumerate() {
            match BucketRange::covering(rect) {
                Some(range) => {
                    for coord in range.coords() {
                        buckets.entry(coord).or_default().push(index);
                    }
                }
                None => oversized.push(index),
            }
        }
        Self {
            rects,
            buckets,
            oversized,
        }
    }

    /// Number of stored rectangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Reports whether the mesh stores no rectangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    fn any_overlap(&self, indices: &[usize], rect: &WorldRect) -> bool {
        indices
            .iter()
            .filter_map(|index| self.rects.get(*index))
            .any(|stored| stored.overlaps(rect))
    }
}

impl CollisionQuery for BucketedCollisionMesh {
    fn overlaps(&self, rect: &WorldRect) -> bool {
        if self.any_overlap(&self.oversized, rect) {
            return true;
        }
        match BucketRange::covering(rect) {
            Some(range) => range.coords().any(|coord| {
                self.buckets
                    .get(&coord)
                    .map_or(false, |indices| self.any_overlap(indices, rect))
            }),
            None => self.rects.iter().any(|stored| stored.overlaps(rect)),
        }
    }
}

/// Inclusive block of buckets touched by a rectangle.
#[derive(Clone, Copy, Debug)]
struct BucketRange {
    first_x: i32,
    last_x: i32,
    first_y: i32,
    last_y: i32,
}

impl BucketRange {
    /// `None` when the rectangle is non-finite or too large to index.
    fn covering(rect: &WorldRect) -> Option<Self> {
        let (first_x, last_x) = bucket_span(rect.left(), rect.right())?;
        let (first_y, last_y) = bucket_span(rect.top(), rect.bottom())?;
        Some(Self {
            first_x,
            last_x,
            first_y,
            last_y,
        })
    }

    fn coords(self) -> impl Iterator<Item = BucketCoord> {
        (self.first_y..=self.last_y)
            .flat_map(move |y| (self.first_x..=self.last_x).map(move |x| BucketCoord { x, y }))
    }
}

fn bucket_span(start: f32, end: f32) -> Option<(i32, i32)> {
    let first = (start / COLLISION_BUCKET_SIZE).floor();
    let last = ((end / COLLISION_BUCKET_SIZE).ceil() - 1.0).max(first);
    let in_range = |value: f32| value >= i32::MIN as f32 && value < i32::MAX as f32;
    if !first.is_finite() || !last.is_finite() || !in_range(first) || !in_range(last) {
        return None;
    }
    if last - first >= MAX_BUCKET_SPAN {
        return None;
    }
    Some((first as i32, last as i32))
}
