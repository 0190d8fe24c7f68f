use std::collections::HashMap;

/// Read-only view of the battle map, supplied by the map/terrain system.
/// Occupancy is derived from the battle roster, never from the grid.
pub trait GridQuery {
    fn is_in_bounds(&self, x: i32, y: i32) -> bool;

    /// Movement budget consumed by entering the cell. Only meaningful for
    /// in-bounds cells.
    fn movement_cost(&self, x: i32, y: i32) -> i32;
}

/// Rectangular grid with a uniform base cost and optional per-cell
/// overrides. Enough map for demos and tests; real maps implement
/// [`GridQuery`] themselves.
#[derive(Debug, Clone)]
pub struct MapGrid {
    width: i32,
    height: i32,
    base_cost: i32,
    cost_overrides: HashMap<(i32, i32), i32>,
}

impl MapGrid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            base_cost: 1,
            cost_overrides: HashMap::new(),
        }
    }

    pub fn with_base_cost(mut self, cost: i32) -> Self {
        self.base_cost = cost;
        self
    }

    /// Overrides the movement cost of a single cell (rough terrain, roads).
    pub fn set_cost(&mut self, x: i32, y: i32, cost: i32) {
        self.cost_overrides.insert((x, y), cost);
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }
}

impl GridQuery for MapGrid {
    fn is_in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn movement_cost(&self, x: i32, y: i32) -> i32 {
        *self.cost_overrides.get(&(x, y)).unwrap_or(&self.base_cost)
    }
}
