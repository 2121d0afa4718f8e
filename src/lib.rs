//! # maze_pathfinding
//!
//! A grid-based maze solving system for bitmap-encoded mazes. An external
//! image decoder supplies a rectangular RGB buffer in which pure white pixels
//! are open floor, a reserved cyan accent marks waypoints and every other
//! colour is a wall. [MazeGrid] classifies the buffer, locates the entry on
//! the top edge and the exit on the bottom edge, and routes
//! entry → waypoints → exit using ordered
//! [depth-first search](https://en.wikipedia.org/wiki/Depth-first_search).
//! Pre-computes
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory))
//! to avoid flood-filling behaviour if no route exists.
mod dfs;

use anyhow::{ensure, Result};
use fxhash::FxBuildHasher;
use grid_util::grid::{BoolGrid, Grid};
use grid_util::point::Point;
use indexmap::IndexSet;
use itertools::Itertools;
use log::{info, warn};
use petgraph::unionfind::UnionFind;

use crate::dfs::dfs_route;
use core::fmt;

pub type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// Exact colour of open floor pixels.
pub const OPEN_RGB: u32 = 0xffffff;
/// Exact colour of waypoint pixels.
pub const WAYPOINT_RGB: u32 = 0x18caff;

/// Classification of a single grid cell, fixed at construction time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CellKind {
    Open,
    Wall,
    Waypoint,
}

impl CellKind {
    /// Classifies a decoded pixel. The encoding is an exact lookup against
    /// two reserved colours; every other colour is a wall.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> CellKind {
        match (r as u32) << 16 | (g as u32) << 8 | b as u32 {
            OPEN_RGB => CellKind::Open,
            WAYPOINT_RGB => CellKind::Waypoint,
            _ => CellKind::Wall,
        }
    }

    pub fn walkable(self) -> bool {
        self != CellKind::Wall
    }

    /// Cost of stepping onto a cell of this kind. Walkable kinds share cost
    /// zero, leaving candidate generation order as the effective traversal
    /// order during search.
    pub fn move_cost(self) -> i32 {
        match self {
            CellKind::Open | CellKind::Waypoint => 0,
            CellKind::Wall => i32::MAX,
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CellKind::Open => '.',
                CellKind::Wall => '#',
                CellKind::Waypoint => '*',
            }
        )
    }
}

/// An assembled multi-leg route. Each leg runs from its start cell to its
/// target cell inclusive; consecutive legs share their joint cell.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Solution {
    pub legs: Vec<Vec<Point>>,
}

impl Solution {
    /// Flattens the legs into one continuous trail, keeping a single copy of
    /// the joint cell where one leg ends and the next begins.
    pub fn path(&self) -> Vec<Point> {
        self.legs.iter().flatten().copied().dedup().collect()
    }
}

/// [MazeGrid] holds the wall layout of a decoded maze in a [BoolGrid]
/// ([true] = wall), the waypoint cells in discovery (row-major scan) order,
/// the entry and exit found on the top and bottom edges, and connected
/// components of the walkable cells in a [UnionFind] structure used to refuse
/// doomed route requests without searching. A second [BoolGrid] carries the
/// per-leg visitation marks, the only state that mutates after construction.
#[derive(Clone, Debug)]
pub struct MazeGrid {
    pub grid: BoolGrid,
    pub visited: BoolGrid,
    pub waypoints: FxIndexSet<Point>,
    pub entry: Option<Point>,
    pub exit: Option<Point>,
    pub components: UnionFind<usize>,
}

impl MazeGrid {
    /// Builds a maze from an already classified cell array in row-major
    /// order. Fails fast on zero dimensions or a length mismatch.
    pub fn from_cells(width: usize, height: usize, cells: &[CellKind]) -> Result<MazeGrid> {
        ensure!(
            width > 0 && height > 0,
            "maze dimensions must be non-zero, got {}x{}",
            width,
            height
        );
        ensure!(
            cells.len() == width * height,
            "cell array length {} does not match a {}x{} maze",
            cells.len(),
            width,
            height
        );
        let mut maze = MazeGrid {
            grid: BoolGrid::new(width, height, false),
            visited: BoolGrid::new(width, height, false),
            waypoints: FxIndexSet::default(),
            entry: None,
            exit: None,
            components: UnionFind::new(width * height),
        };
        for y in 0..height {
            for x in 0..width {
                let kind = cells[y * width + x];
                maze.grid.set(x, y, !kind.walkable());
                if kind == CellKind::Waypoint {
                    maze.waypoints.insert(Point::new(x as i32, y as i32));
                }
            }
        }
        maze.locate_endpoints();
        maze.generate_components();
        Ok(maze)
    }

    /// Builds a maze from a decoded pixel buffer of 3-byte RGB values in
    /// row-major order, classifying each pixel by exact colour match.
    pub fn from_pixels(width: usize, height: usize, rgb: &[u8]) -> Result<MazeGrid> {
        ensure!(
            rgb.len() == width * height * 3,
            "pixel buffer length {} does not match a {}x{} RGB maze",
            rgb.len(),
            width,
            height
        );
        let cells = rgb
            .chunks_exact(3)
            .map(|p| CellKind::from_rgb(p[0], p[1], p[2]))
            .collect::<Vec<CellKind>>();
        MazeGrid::from_cells(width, height, &cells)
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    /// Classification of the cell at (x, y).
    pub fn kind(&self, x: usize, y: usize) -> CellKind {
        if self.grid.get(x, y) {
            CellKind::Wall
        } else if self.waypoints.contains(&Point::new(x as i32, y as i32)) {
            CellKind::Waypoint
        } else {
            CellKind::Open
        }
    }

    pub fn can_move_to(&self, pos: Point) -> bool {
        self.in_bounds(pos.x, pos.y) && !self.grid.get(pos.x as usize, pos.y as usize)
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && self.grid.index_in_bounds(x as usize, y as usize)
    }

    /// Cost of stepping onto `pos` during search, as recorded on the cell
    /// kind.
    pub fn move_cost(&self, pos: Point) -> i32 {
        self.kind(pos.x as usize, pos.y as usize).move_cost()
    }

    pub fn is_visited(&self, pos: Point) -> bool {
        self.visited.get(pos.x as usize, pos.y as usize)
    }

    fn visit(&mut self, pos: Point) {
        self.visited.set(pos.x as usize, pos.y as usize, true);
    }

    /// Clears every visitation mark so the next [find_path](Self::find_path)
    /// call searches a grid free of any earlier call's marks.
    /// [collect_route](Self::collect_route) invokes this before every leg.
    pub fn reset_visited(&mut self) {
        self.visited = BoolGrid::new(self.grid.width, self.grid.height, false);
    }

    /// Scans the top and bottom rows for the first open cell in increasing x
    /// order, excluding the two corner columns. A row without one leaves the
    /// corresponding endpoint unset and the maze unsolvable.
    fn locate_endpoints(&mut self) {
        let h = self.grid.height;
        for x in 1..self.grid.width.saturating_sub(1) {
            if self.entry.is_none() && self.kind(x, 0) == CellKind::Open {
                self.entry = Some(Point::new(x as i32, 0));
            }
            if self.exit.is_none() && self.kind(x, h - 1) == CellKind::Open {
                self.exit = Some(Point::new(x as i32, (h - 1) as i32));
            }
            if self.entry.is_some() && self.exit.is_some() {
                break;
            }
        }
    }

    /// Generates a new [UnionFind] structure and links up walkable grid
    /// neighbours to the same components.
    fn generate_components(&mut self) {
        info!("Generating connected components");
        let w = self.grid.width;
        let h = self.grid.height;
        self.components = UnionFind::new(w * h);
        for x in 0..w {
            for y in 0..h {
                if !self.grid.get(x, y) {
                    let parent_ix = self.grid.get_ix(x, y);
                    let point = Point::new(x as i32, y as i32);
                    let neighbours = [
                        Point::new(point.x + 1, point.y),
                        Point::new(point.x, point.y + 1),
                    ]
                    .into_iter()
                    .filter(|p| self.can_move_to(*p))
                    .map(|p| self.grid.get_ix(p.x as usize, p.y as usize))
                    .collect::<Vec<usize>>();
                    for ix in neighbours {
                        self.components.union(parent_ix, ix);
                    }
                }
            }
        }
    }

    fn get_ix(&self, point: &Point) -> usize {
        self.grid.get_ix(point.x as usize, point.y as usize)
    }

    /// Retrieves the component id a given [Point] belongs to.
    pub fn get_component(&self, point: &Point) -> usize {
        self.components.find(self.get_ix(point))
    }

    /// Checks if start and goal are on the same component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        if self.in_bounds(start.x, start.y) && self.in_bounds(goal.x, goal.y) {
            let start_ix = self.get_ix(start);
            let goal_ix = self.get_ix(goal);
            !self.components.equiv(start_ix, goal_ix)
        } else {
            true
        }
    }

    /// Candidate moves out of `node` in fixed generation order: vertical
    /// neighbours before horizontal ones, negative offset before positive.
    /// Every candidate is flagged visited the moment it is emitted and stays
    /// flagged for the remainder of the current search call, also when the
    /// branch through it fails.
    fn candidate_moves(&mut self, node: &Point) -> Vec<(Point, i32)> {
        let mut moves = Vec::with_capacity(4);
        for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            let next = Point::new(node.x + dx, node.y + dy);
            if self.can_move_to(next) && !self.is_visited(next) {
                self.visit(next);
                moves.push((next, self.move_cost(next)));
            }
        }
        moves
    }

    /// Computes a path from start to goal using ordered depth-first search,
    /// both endpoints included. Each cell is expanded at most once per call,
    /// so a failed call has explored exactly the component reachable from
    /// `start`. Returns [None] if the goal was not reached.
    pub fn find_path(&mut self, start: Point, goal: Point) -> Option<Vec<Point>> {
        if !self.can_move_to(start) || !self.can_move_to(goal) {
            return None;
        }
        self.visit(start);
        dfs_route(&start, |node| self.candidate_moves(node), |node| *node == goal)
            .map(|(path, _cost)| path)
    }

    /// Routes start → every waypoint in discovery order → finish, resetting
    /// the visitation marks between legs. Fails as a whole if any leg fails;
    /// no partial route is returned. Targets outside the start's component
    /// are refused before any leg search runs.
    pub fn collect_route(&mut self, start: Point, finish: Point) -> Option<Solution> {
        let targets = self
            .waypoints
            .iter()
            .copied()
            .chain(std::iter::once(finish))
            .collect::<Vec<Point>>();
        if targets.iter().any(|target| self.unreachable(&start, target)) {
            info!("Not every route target is reachable from {}", start);
            return None;
        }
        let mut legs = Vec::with_capacity(targets.len());
        let mut current = start;
        for target in targets {
            self.reset_visited();
            match self.find_path(current, target) {
                Some(leg) => {
                    legs.push(leg);
                    current = target;
                }
                None => {
                    warn!(
                        "Reachable target {} could not be routed to from {}, is the component structure correct?",
                        target, current
                    );
                    return None;
                }
            }
        }
        Some(Solution { legs })
    }

    /// Solves the maze end to end: from the entry on the top edge through
    /// every waypoint in discovery order to the exit on the bottom edge.
    /// Returns [None] if either endpoint was not detected or a leg cannot be
    /// routed.
    pub fn solve(&mut self) -> Option<Solution> {
        let entry = self.entry?;
        let exit = self.exit?;
        info!("Routing from entry {} to exit {}", entry, exit);
        self.collect_route(entry, exit)
    }
}

impl fmt::Display for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.grid.height {
            for x in 0..self.grid.width {
                write!(f, "{}", self.kind(x, y))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
