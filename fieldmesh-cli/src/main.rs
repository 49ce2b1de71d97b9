//! Command line front end for the meshing core.
//!
//! Provides:
//! - Meshing a shape read from JSON, with a summary and optional full output
//! - Point location queries against the mesh
//! - A square smoke test checked with random queries

use std::fs;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use fieldmesh_core::{parse_log_level, Material, Mesh, MeshConfig, Shape, Triangle, Vertex, DelaunayRefiner};

#[derive(Parser)]
#[command(name = "fieldmesh")]
#[command(about = "Triangle meshes of planar shapes for field solvers", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, value_parser = ["off", "error", "warn", "info", "debug", "trace"])]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mesh a shape
    Mesh {
        /// Input shape (JSON file)
        #[arg(short, long)]
        shape: String,

        /// Mesh settings (JSON file); missing fields take their defaults
        #[arg(short, long)]
        config: Option<String>,

        /// Target edge length, overrides the config file
        #[arg(short, long)]
        edge_length: Option<f64>,

        /// Output file for the full mesh (JSON)
        #[arg(short, long)]
        output: Option<String>,

        /// Point to locate, as X,Y (repeatable)
        #[arg(short, long, value_parser = parse_point)]
        locate: Vec<(f64, f64)>,
    },

    /// Mesh a square and check point location against it
    Square {
        /// Side length
        #[arg(long, default_value = "1")]
        size: f64,

        /// Target edge length
        #[arg(short, long, default_value = "0.05")]
        edge_length: f64,

        /// Number of random queries inside the square
        #[arg(short, long, default_value = "10000")]
        queries: usize,

        /// Seed for the random queries
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got {:?}", s))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("{:?}: {}", v, e));
    Ok((parse(x)?, parse(y)?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Located {
    x: f64,
    y: f64,
    triangle: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    valid: bool,
    error: Option<String>,
    num_points: usize,
    num_triangles: usize,
    area: f64,
    shortest_edge: Option<f64>,
    longest_edge: Option<f64>,
    boundary_edges: usize,
    cell_exponent: i32,
    located: Vec<Located>,
}

impl Summary {
    fn new(mesh: &Mesh, queries: &[(f64, f64)]) -> Self {
        let range = mesh.edge_length_range();
        Summary {
            valid: mesh.is_valid(),
            error: mesh.error().map(|e| e.to_string()),
            num_points: mesh.num_points(),
            num_triangles: mesh.num_triangles(),
            area: mesh.area(),
            shortest_edge: range.map(|(lo, _)| lo),
            longest_edge: range.map(|(_, hi)| hi),
            boundary_edges: mesh.boundary_edges().count(),
            cell_exponent: mesh.cell_exponent(),
            located: queries.iter().map(|&(x, y)| Located { x, y, triangle: mesh.find_triangle(x, y) }).collect(),
        }
    }
}

/// Everything a solver needs from a mesh.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MeshOutput<'a> {
    points: &'a [Vertex],
    triangles: &'a [Triangle],
    materials: &'a [Material],
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path))
}

fn mesh(shape: &str, config: Option<&str>, edge_length: Option<f64>, output: Option<&str>, locate: &[(f64, f64)]) -> Result<()> {
    let shape: Shape = read_json(shape)?;
    let mut config: MeshConfig = match config {
        Some(path) => read_json(path)?,
        None => MeshConfig::default(),
    };
    if let Some(len) = edge_length {
        config.target_edge_length = len;
    }
    info!("meshing {} pieces, target edge length {}", shape.num_pieces(), config.target_edge_length);
    let mesh = Mesh::build(&shape, &config, None, &DelaunayRefiner::new(config.max_points))?;

    println!("{}", serde_json::to_string_pretty(&Summary::new(&mesh, locate))?);
    if let Some(path) = output {
        let out = MeshOutput { points: mesh.points(), triangles: mesh.triangles(), materials: mesh.materials() };
        fs::write(path, serde_json::to_string(&out)?).with_context(|| format!("writing {}", path))?;
        info!("wrote {}", path);
    }
    Ok(())
}

fn square(size: f64, edge_length: f64, queries: usize, seed: u64) -> Result<()> {
    let shape = Shape::rectangle(0., 0., size, size);
    let mesh = Mesh::build(&shape, &MeshConfig::new(edge_length), None, &DelaunayRefiner::default())?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut missed = vec![];
    for _ in 0..queries {
        let (x, y) = (rng.gen_range(0.0..size), rng.gen_range(0.0..size));
        if mesh.find_triangle(x, y).is_none() {
            missed.push((x, y));
        }
    }
    println!("{}", serde_json::to_string_pretty(&Summary::new(&mesh, &missed))?);
    if !missed.is_empty() {
        bail!("{} of {} points inside the square were not located", missed.len(), queries);
    }
    info!("located all {} points", queries);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(parse_log_level(cli.log_level.as_deref())).init();

    match cli.command {
        Commands::Mesh { shape, config, edge_length, output, locate } => {
            mesh(&shape, config.as_deref(), edge_length, output.as_deref(), &locate)
        }
        Commands::Square { size, edge_length, queries, seed } => square(size, edge_length, queries, seed),
    }
}
