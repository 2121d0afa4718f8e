//! End-to-end route tests plus a randomized consistency check of the search
//! against the precomputed component structure.
use grid_util::grid::Grid;
use grid_util::point::Point;
use maze_pathfinding::{CellKind, MazeGrid};
use rand::prelude::*;

fn grid_from_ascii(rows: &[&str]) -> MazeGrid {
    let height = rows.len();
    let width = rows[0].len();
    let cells = rows
        .iter()
        .flat_map(|row| {
            row.chars().map(|c| match c {
                '#' => CellKind::Wall,
                '*' => CellKind::Waypoint,
                _ => CellKind::Open,
            })
        })
        .collect::<Vec<CellKind>>();
    MazeGrid::from_cells(width, height, &cells).unwrap()
}

fn random_maze(w: usize, h: usize, rng: &mut StdRng, waypoints: bool) -> MazeGrid {
    let mut cells = (0..w * h)
        .map(|_| {
            if rng.gen_bool(0.4) {
                CellKind::Wall
            } else if waypoints && rng.gen_bool(0.1) {
                CellKind::Waypoint
            } else {
                CellKind::Open
            }
        })
        .collect::<Vec<CellKind>>();
    // Keep the two corners used as start and finish open.
    cells[0] = CellKind::Open;
    cells[w * h - 1] = CellKind::Open;
    MazeGrid::from_cells(w, h, &cells).unwrap()
}

fn visualize_maze(maze: &MazeGrid, start: &Point, end: &Point) {
    for y in 0..maze.height() {
        for x in 0..maze.width() {
            let p = Point::new(x as i32, y as i32);
            if *start == p {
                print!("S");
            } else if *end == p {
                print!("G");
            } else {
                print!("{}", maze.kind(x, y));
            }
        }
        println!();
    }
}

/// Every returned path starts and ends on the requested cells, moves one
/// cardinal step at a time and never enters a wall.
fn assert_valid_path(maze: &MazeGrid, path: &[Point], start: Point, goal: Point) {
    assert_eq!(*path.first().unwrap(), start);
    assert_eq!(*path.last().unwrap(), goal);
    for pair in path.windows(2) {
        assert_eq!((pair[0].x - pair[1].x).abs() + (pair[0].y - pair[1].y).abs(), 1);
    }
    for p in path {
        assert!(maze.can_move_to(*p));
    }
}

fn visited_count(maze: &MazeGrid) -> usize {
    let mut count = 0;
    for y in 0..maze.height() {
        for x in 0..maze.width() {
            if maze.visited.get(x, y) {
                count += 1;
            }
        }
    }
    count
}

#[test]
fn straight_corridor() {
    let mut maze = grid_from_ascii(&[
        ".....", //
        ".....",
        ".....",
        ".....",
        ".....",
    ]);
    let start = Point::new(0, 0);
    let goal = Point::new(0, 4);
    let path = maze.find_path(start, goal).unwrap();
    assert_valid_path(&maze, &path, start, goal);
}

#[test]
fn wall_column_forces_a_detour() {
    let mut maze = grid_from_ascii(&[
        ".....", //
        "..#..",
        "..#..",
        "..#..",
        ".....",
    ]);
    let start = Point::new(1, 0);
    let goal = Point::new(3, 4);
    let path = maze.find_path(start, goal).unwrap();
    assert!(path.len() >= 7);
    assert_valid_path(&maze, &path, start, goal);
}

#[test]
fn waypoint_route_has_two_legs() {
    let mut maze = grid_from_ascii(&[
        ".....", //
        ".....",
        ".....",
        ".....",
        "....*",
    ]);
    let start = Point::new(0, 0);
    let finish = Point::new(4, 0);
    let waypoint = Point::new(4, 4);
    let solution = maze.collect_route(start, finish).unwrap();
    assert_eq!(solution.legs.len(), 2);
    assert_eq!(*solution.legs[0].first().unwrap(), start);
    assert_eq!(*solution.legs[0].last().unwrap(), waypoint);
    assert_eq!(*solution.legs[1].first().unwrap(), waypoint);
    assert_eq!(*solution.legs[1].last().unwrap(), finish);
}

#[test]
fn solve_end_to_end() {
    let mut maze = grid_from_ascii(&[
        "##.####", //
        "#.....#",
        "#.###.#",
        "#...*.#",
        "###.###",
    ]);
    assert_eq!(maze.entry, Some(Point::new(2, 0)));
    assert_eq!(maze.exit, Some(Point::new(3, 4)));
    let solution = maze.solve().unwrap();
    assert_eq!(solution.legs.len(), 2);
    let path = solution.path();
    assert_eq!(*path.first().unwrap(), Point::new(2, 0));
    assert_eq!(*path.last().unwrap(), Point::new(3, 4));
    assert!(path.contains(&Point::new(4, 3)));
}

#[test]
fn sealed_waypoint_fails_before_searching() {
    let mut maze = grid_from_ascii(&[
        "#.###", //
        "#...#",
        "###.#",
        "#*#.#",
        "###.#",
    ]);
    let entry = maze.entry.unwrap();
    let exit = maze.exit.unwrap();
    assert!(maze.reachable(&entry, &exit));
    assert!(maze.unreachable(&entry, &Point::new(1, 3)));
    assert!(maze.solve().is_none());
    // The component pre-check refused the route without running any leg.
    assert_eq!(visited_count(&maze), 0);
}

/// Checks for many random grids that the search outcome always agrees with
/// the component structure and that every found path is well formed.
#[test]
fn fuzz() {
    const N: usize = 10;
    const N_GRIDS: usize = 1000;
    let mut rng = StdRng::seed_from_u64(0);
    let start = Point::new(0, 0);
    let end = Point::new(N as i32 - 1, N as i32 - 1);
    for _ in 0..N_GRIDS {
        let mut maze = random_maze(N, N, &mut rng, false);
        let reachable = maze.reachable(&start, &end);
        let path = maze.find_path(start, end);
        // Show the maze if the outcomes disagree
        if path.is_some() != reachable {
            visualize_maze(&maze, &start, &end);
        }
        assert!(path.is_some() == reachable);
        if let Some(path) = path {
            assert_valid_path(&maze, &path, start, end);
        }
    }
}

/// Same consistency check for full waypoint routes: a route exists exactly
/// when every waypoint and the finish share the start's component, and its
/// legs chain through the waypoints in discovery order.
#[test]
fn fuzz_waypoint_routes() {
    const N: usize = 10;
    const N_GRIDS: usize = 1000;
    let mut rng = StdRng::seed_from_u64(0);
    let start = Point::new(0, 0);
    let finish = Point::new(N as i32 - 1, N as i32 - 1);
    for _ in 0..N_GRIDS {
        let mut maze = random_maze(N, N, &mut rng, true);
        let targets = maze
            .waypoints
            .iter()
            .copied()
            .chain(std::iter::once(finish))
            .collect::<Vec<Point>>();
        let all_reachable = targets.iter().all(|target| maze.reachable(&start, target));
        let solution = maze.collect_route(start, finish);
        assert_eq!(solution.is_some(), all_reachable);
        if let Some(solution) = solution {
            assert_eq!(solution.legs.len(), targets.len());
            let mut current = start;
            for (leg, target) in solution.legs.iter().zip(&targets) {
                assert_valid_path(&maze, leg, current, *target);
                current = *target;
            }
        }
    }
}
