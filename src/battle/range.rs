use crate::battle::state::Battle;
use crate::grid::GridQuery;
use crate::unit::UnitId;
use std::collections::{HashMap, VecDeque};

const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Cells a unit can reach this turn: budgeted flood fill from its cell.
/// Entering a neighbor costs that cell's terrain cost; out-of-bounds cells
/// and cells occupied by a living unit are never entered. The starting
/// cell is excluded from the result.
///
/// A cell is re-expanded when a cheaper route to it turns up, so uneven
/// terrain never truncates reach behind an expensive first visit. The
/// result comes back row-sorted; identical state produces an identical
/// cell list.
pub fn movement_range(
    battle: &Battle,
    grid: &dyn GridQuery,
    unit: UnitId,
    budget: i32,
) -> Vec<(i32, i32)> {
    let Some(start) = battle.unit(unit).map(|u| u.position()) else {
        return Vec::new();
    };

    // Best remaining budget seen on arrival at each cell
    let mut best: HashMap<(i32, i32), i32> = HashMap::new();
    let mut queue: VecDeque<((i32, i32), i32)> = VecDeque::new();
    best.insert(start, budget);
    queue.push_back((start, budget));

    while let Some(((x, y), remaining)) = queue.pop_front() {
        if best.get(&(x, y)).copied().unwrap_or(i32::MIN) > remaining {
            continue;
        }
        for (dx, dy) in ORTHOGONAL {
            let (nx, ny) = (x + dx, y + dy);
            if !grid.is_in_bounds(nx, ny) {
                continue;
            }
            if battle.is_cell_occupied(nx, ny) {
                continue;
            }
            let left = remaining - grid.movement_cost(nx, ny);
            if left < 0 {
                continue;
            }
            if best.get(&(nx, ny)).copied().unwrap_or(i32::MIN) >= left {
                continue;
            }
            best.insert((nx, ny), left);
            queue.push_back(((nx, ny), left));
        }
    }

    let mut reachable: Vec<(i32, i32)> = best.into_keys().filter(|c| *c != start).collect();
    reachable.sort_by_key(|&(x, y)| (y, x));
    reachable
}

/// Cells a unit could strike from its current position: the in-bounds
/// Manhattan disk of its attack range. Purely geometric; occupancy and
/// terrain are irrelevant to reach.
pub fn attack_range(
    grid: &dyn GridQuery,
    origin: (i32, i32),
    range: i32,
) -> Vec<(i32, i32)> {
    manhattan_disk(grid, origin, range)
}

/// Cells covered by an ability centered on an arbitrary target point,
/// independent of where the caster stands.
pub fn ability_area(
    grid: &dyn GridQuery,
    center: (i32, i32),
    radius: i32,
) -> Vec<(i32, i32)> {
    manhattan_disk(grid, center, radius)
}

pub fn manhattan_distance(a: (i32, i32), b: (i32, i32)) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

fn manhattan_disk(grid: &dyn GridQuery, center: (i32, i32), radius: i32) -> Vec<(i32, i32)> {
    let mut cells = Vec::new();
    if radius < 0 {
        return cells;
    }
    for dy in -radius..=radius {
        let span = radius - dy.abs();
        for dx in -span..=span {
            let (x, y) = (center.0 + dx, center.1 + dy);
            if grid.is_in_bounds(x, y) {
                cells.push((x, y));
            }
        }
    }
    cells
}
