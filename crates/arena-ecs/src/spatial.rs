//! Uniform-grid spatial hash for proximity queries.
//!
//! Each entity is bucketed by the grid cell containing its position point.
//! A query visits every entity bucketed in any cell overlapping the query
//! rectangle, so results are cell-approximate: false positives at cell
//! granularity are expected and callers re-check exact distance, but an
//! entity whose stored position lies inside the rectangle is never missed.
//!
//! Placements are refreshed once per tick after motion integration via
//! [`SpatialHash::update`]; between refreshes the index reflects positions as
//! of the last refresh.

use std::collections::HashMap;

use crate::entity::EntityId;

type Cell = (i32, i32);

/// Hash grid keyed by integer cell coordinate.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<Cell, Vec<EntityId>>,
    /// Current cell of every indexed entity.
    placement: HashMap<EntityId, Cell>,
}

impl SpatialHash {
    /// Create an empty index with square cells of side `cell_size`.
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size > 0.0 && cell_size.is_finite(),
            "cell_size must be positive and finite, got {cell_size}"
        );
        Self {
            cell_size,
            cells: HashMap::new(),
            placement: HashMap::new(),
        }
    }

    #[inline]
    fn cell_of(&self, x: f32, y: f32) -> Cell {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Side length of a grid cell.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Index `id` at `(x, y)`. Re-inserting an indexed id moves it.
    pub fn insert(&mut self, id: EntityId, x: f32, y: f32) {
        self.update(id, x, y);
    }

    /// Move `id` to `(x, y)`, inserting it if absent. Buckets are only
    /// touched when the cell actually changes.
    pub fn update(&mut self, id: EntityId, x: f32, y: f32) {
        let cell = self.cell_of(x, y);
        match self.placement.insert(id, cell) {
            Some(old) if old == cell => {}
            Some(old) => {
                self.detach(id, old);
                self.cells.entry(cell).or_default().push(id);
            }
            None => self.cells.entry(cell).or_default().push(id),
        }
    }

    /// Drop `id` from the index. Returns `false` if it was not indexed.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.placement.remove(&id) {
            Some(cell) => {
                self.detach(id, cell);
                true
            }
            None => false,
        }
    }

    fn detach(&mut self, id: EntityId, cell: Cell) {
        if let Some(bucket) = self.cells.get_mut(&cell) {
            if let Some(pos) = bucket.iter().position(|&e| e == id) {
                bucket.swap_remove(pos);
            }
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.placement.contains_key(&id)
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.placement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placement.is_empty()
    }

    /// Invoke `visitor` once for every entity bucketed in a cell overlapping
    /// the rectangle centered on `(x, y)` with the given half extents.
    ///
    /// Visit order is unspecified. The index itself is borrowed for the
    /// duration, so a visitor that needs to mutate the world should use
    /// [`query_ids`](Self::query_ids) instead.
    pub fn query<F>(&self, x: f32, y: f32, half_width: f32, half_height: f32, mut visitor: F)
    where
        F: FnMut(EntityId),
    {
        let (min_x, min_y) = self.cell_of(x - half_width, y - half_height);
        let (max_x, max_y) = self.cell_of(x + half_width, y + half_height);

        let span = (max_x as i64 - min_x as i64 + 1) * (max_y as i64 - min_y as i64 + 1);
        if span > self.cells.len() as i64 {
            // Sparse grid: cheaper to scan occupied cells than the whole span.
            for (&(cx, cy), bucket) in &self.cells {
                if (min_x..=max_x).contains(&cx) && (min_y..=max_y).contains(&cy) {
                    bucket.iter().copied().for_each(&mut visitor);
                }
            }
            return;
        }

        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    bucket.iter().copied().for_each(&mut visitor);
                }
            }
        }
    }

    /// Collect the candidates [`query`](Self::query) would visit.
    pub fn query_ids(&self, x: f32, y: f32, half_width: f32, half_height: f32) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.query(x, y, half_width, half_height, |id| out.push(id));
        out
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.placement.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
