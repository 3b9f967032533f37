// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! map-to-3d: turn a 2D occupancy map into a 3D wall mesh.
//!
//! By default a track named `NAME` is read from
//! `<tracks-dir>/NAME/NAME_map.png` and `<tracks-dir>/NAME/NAME_map.yaml`
//! and written to `<output-dir>/NAME/NAME_track_3d.obj` together with the
//! matching `.stl`.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use gridmesh_processing::{
    convert, load_map_files, AmbiguousPolicy, Connectivity, ConversionConfig, ExportResult,
    ExtractionMethod, FloorStyle, DEFAULT_WALL_HEIGHT,
};
use std::path::{Path, PathBuf};

/// Convert a 2D occupancy map into a 3D mesh (OBJ and binary STL)
#[derive(Parser, Debug)]
#[command(name = "map-to-3d", version)]
struct Args {
    /// Track name, looked up as <tracks-dir>/NAME/NAME_map.{png,yaml}
    #[arg(required_unless_present_all = ["map", "yaml"])]
    track: Option<String>,

    /// Wall height in meters
    #[arg(long, default_value_t = DEFAULT_WALL_HEIGHT)]
    height: f64,

    /// Output mesh path (.obj or .stl)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory holding one subdirectory per track
    #[arg(long, default_value = "tracks")]
    tracks_dir: PathBuf,

    /// Directory receiving one subdirectory per track
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Map image, bypassing the track layout
    #[arg(long, requires = "yaml")]
    map: Option<PathBuf>,

    /// Map YAML, bypassing the track layout
    #[arg(long, requires = "map")]
    yaml: Option<PathBuf>,

    /// Neighbourhood used to decide whether an occupied cell touches free space
    #[arg(long, value_enum, default_value_t = NeighbourArg::Eight)]
    connectivity: NeighbourArg,

    /// How cells between the free and occupied thresholds are treated
    #[arg(long, value_enum, default_value_t = BandArg::Occupied)]
    ambiguous: BandArg,

    #[arg(long, value_enum, default_value_t = FloorArg::Quad)]
    floor: FloorArg,

    /// Find walls by morphological erosion instead of a neighbour scan
    #[arg(long)]
    erosion: bool,

    /// Only write the requested format
    #[arg(long)]
    no_companion: bool,

    /// Single-threaded conversion
    #[arg(long)]
    serial: bool,

    /// Print the conversion report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NeighbourArg {
    Four,
    Eight,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BandArg {
    Occupied,
    Free,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FloorArg {
    Quad,
    Cells,
}

impl Args {
    fn config(&self) -> ConversionConfig {
        ConversionConfig {
            wall_height: self.height,
            connectivity: match self.connectivity {
                NeighbourArg::Four => Connectivity::Four,
                NeighbourArg::Eight => Connectivity::Eight,
            },
            band_policy: match self.ambiguous {
                BandArg::Occupied => AmbiguousPolicy::Occupied,
                BandArg::Free => AmbiguousPolicy::Free,
            },
            extraction: if self.erosion {
                ExtractionMethod::Erosion
            } else {
                ExtractionMethod::Neighborhood
            },
            floor: match self.floor {
                FloorArg::Quad => FloorStyle::Quad,
                FloorArg::Cells => FloorStyle::PerFreeCell,
            },
            companion: !self.no_companion,
            parallel: !self.serial,
        }
    }
}

/// Input image, input YAML and output path for this run
struct Paths {
    image: PathBuf,
    yaml: PathBuf,
    output: PathBuf,
}

fn resolve_paths(args: &Args) -> Result<Paths> {
    if let (Some(image), Some(yaml)) = (&args.map, &args.yaml) {
        let output = match (&args.output, &args.track) {
            (Some(o), _) => o.clone(),
            (None, Some(name)) => default_output(&args.output_dir, name),
            (None, None) => yaml.with_extension("obj"),
        };
        return Ok(Paths {
            image: image.clone(),
            yaml: yaml.clone(),
            output,
        });
    }

    let Some(name) = args.track.as_deref() else {
        bail!("either a track name or both --map and --yaml are required");
    };

    let input_dir = args.tracks_dir.join(name);
    Ok(Paths {
        image: input_dir.join(format!("{name}_map.png")),
        yaml: input_dir.join(format!("{name}_map.yaml")),
        output: args
            .output
            .clone()
            .unwrap_or_else(|| default_output(&args.output_dir, name)),
    })
}

fn default_output(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(name).join(format!("{name}_track_3d.obj"))
}

fn print_report(result: &ExportResult) {
    println!(
        "Grid {}x{}: {} wall cells",
        result.grid_width, result.grid_height, result.wall_cells
    );
    println!(
        "Mesh: {} vertices, {} triangles",
        result.vertices, result.triangles
    );
    println!(
        "Bounds: [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
        result.bounds_min[0],
        result.bounds_min[1],
        result.bounds_min[2],
        result.bounds_max[0],
        result.bounds_max[1],
        result.bounds_max[2]
    );
    for file in &result.files {
        println!("Wrote {} ({}, {} bytes)", file.path.display(), file.format, file.bytes);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config();
    let paths = resolve_paths(&args)?;

    tracing::info!(
        image = %paths.image.display(),
        yaml = %paths.yaml.display(),
        output = %paths.output.display(),
        height = config.wall_height,
        "Converting map"
    );

    let input = load_map_files(&paths.image, &paths.yaml)
        .with_context(|| format!("Failed to load map {}", paths.yaml.display()))?;

    if let Some(dir) = paths.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
    }

    let result = convert(&input, &config, &paths.output)
        .with_context(|| format!("Failed to convert into {}", paths.output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    Ok(())
}
