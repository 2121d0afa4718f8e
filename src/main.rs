use anyhow::Context;
use image::{Rgb, RgbImage};
use log::info;
use maze_pathfinding::MazeGrid;
use std::env;
use std::path::{Path, PathBuf};

/// Colour the route is drawn in over the solved copy.
const ROUTE_RGB: Rgb<u8> = Rgb([255, 0, 0]);

/// "maze.png" -> "maze Solved.png" / "maze Unsolveable.png".
fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("maze");
    let ext = input.extension().and_then(|s| s.to_str()).unwrap_or("png");
    input.with_file_name(format!("{stem} {suffix}.{ext}"))
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let input = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: maze_pathfinding <maze-image>")?;
    let img: RgbImage = image::open(&input)
        .with_context(|| format!("failed to open maze image {}", input.display()))?
        .to_rgb8();
    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut maze = MazeGrid::from_pixels(width, height, img.as_raw())?;
    info!(
        "Decoded {}x{} maze with {} waypoints",
        width,
        height,
        maze.waypoints.len()
    );

    let mut out = img.clone();
    let saved = match maze.solve() {
        Some(solution) => {
            // The route is a chain of edge-adjacent cells, so drawing its
            // connected segments comes down to plotting every cell.
            for point in solution.path() {
                out.put_pixel(point.x as u32, point.y as u32, ROUTE_RGB);
            }
            output_path(&input, "Solved")
        }
        None => output_path(&input, "Unsolveable"),
    };
    out.save(&saved)
        .with_context(|| format!("failed to save {}", saved.display()))?;
    println!("{}", saved.display());
    Ok(())
}
