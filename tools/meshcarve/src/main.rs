//! meshcarve - sub-mesh surgery for character meshes
//!
//! Extracts, removes and splits sub-meshes of skinned meshes with blend
//! shapes, reading mesh documents (.mesh.json) or glTF/GLB files.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use meshcarve_core::BoundsMode;
use std::path::PathBuf;

use meshcarve_cli::document::{self, document_stem, parent_dir, MESH_EXT};
use meshcarve_cli::{import_gltf, manifest, ops, MeshSelector, Settings, Transform};

#[derive(Parser)]
#[command(name = "meshcarve")]
#[command(about = "Split, trim and clean up skinned character meshes")]
#[command(version)]
struct Cli {
    /// How result bounds are produced (default: recompute)
    #[arg(long, global = true, value_enum)]
    bounds: Option<BoundsArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BoundsArg {
    /// Fit bounds to the surviving vertices
    Recompute,
    /// Keep the source mesh bounds
    Preserve,
}

impl From<BoundsArg> for BoundsMode {
    fn from(arg: BoundsArg) -> Self {
        match arg {
            BoundsArg::Recompute => BoundsMode::Recompute,
            BoundsArg::Preserve => BoundsMode::Preserve,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a mesh
    Info {
        /// Input mesh (.mesh.json, .gltf or .glb)
        input: PathBuf,
    },

    /// Extract one sub-mesh into its own mesh
    Extract {
        /// Input mesh (.mesh.json, .gltf or .glb)
        input: PathBuf,

        /// Sub-mesh index
        #[arg(short, long = "sub-mesh")]
        sub_mesh: usize,

        /// Output mesh document (default: <stem>_extracted<N>.mesh.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove sub-meshes, keeping everything else
    Remove {
        /// Input mesh (.mesh.json, .gltf or .glb)
        input: PathBuf,

        /// Sub-mesh indices to remove
        #[arg(short, long = "sub-mesh", required = true, num_args = 1.., value_delimiter = ',')]
        sub_meshes: Vec<usize>,

        /// Output mesh document (default: <stem>_remainder.mesh.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract each selected sub-mesh and write the remainder
    Split {
        /// Input mesh (.mesh.json, .gltf or .glb)
        input: PathBuf,

        /// Sub-mesh indices to split off
        #[arg(short, long = "sub-mesh", required = true, num_args = 1.., value_delimiter = ',')]
        sub_meshes: Vec<usize>,

        /// Output directory (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reverse triangle draw order within each sub-mesh
    Reverse {
        /// Input mesh (.mesh.json, .gltf or .glb)
        input: PathBuf,

        /// Output mesh document (default: <stem>_reversed.mesh.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Drop blend-shape frames with negligible deltas
    Prune {
        /// Input mesh (.mesh.json, .gltf or .glb)
        input: PathBuf,

        /// Keep frames whose summed delta is longer than this (default: 0.1)
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Output mesh document (default: <stem>_pruned.mesh.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a glTF/GLB mesh to a mesh document
    Import {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Mesh name or index (default: first mesh)
        #[arg(short, long)]
        mesh: Option<String>,

        /// Output mesh document (default: <stem>.mesh.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the jobs of a manifest file
    Build {
        /// Path to meshcarve.toml manifest
        #[arg(default_value = "meshcarve.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a manifest without running it
    Check {
        /// Path to meshcarve.toml manifest
        #[arg(default_value = "meshcarve.toml")]
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::default();
    if let Some(bounds) = cli.bounds {
        settings.bounds = bounds.into();
    }

    let (input, transform, output) = match cli.command {
        Commands::Info { input } => {
            let mesh = document::load_mesh(&input)?;
            println!("{}", input.display());
            print!("{}", ops::describe(&mesh));
            if let Err(e) = mesh.validate() {
                tracing::warn!("Mesh is inconsistent: {}", e);
            }
            return Ok(());
        }

        Commands::Import {
            input,
            mesh,
            output,
        } => {
            let output = output.unwrap_or_else(|| {
                parent_dir(&input).join(format!("{}.{}", document_stem(&input), MESH_EXT))
            });
            tracing::info!("Importing {:?} -> {:?}", input, output);
            let selector = mesh.as_deref().map(MeshSelector::from);
            let mesh = import_gltf(&input, selector.as_ref())?;
            document::write_mesh(&output, &mesh)?;
            tracing::info!("Done!");
            return Ok(());
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Building from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let mut settings = config.options;
            if let Some(bounds) = cli.bounds {
                settings.bounds = bounds.into();
            }
            manifest::build_all(&config, &settings, output.as_deref())?;
            tracing::info!("Build complete!");
            return Ok(());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
            return Ok(());
        }

        Commands::Extract {
            input,
            sub_mesh,
            output,
        } => (input, Transform::Extract(sub_mesh), output),

        Commands::Remove {
            input,
            sub_meshes,
            output,
        } => (input, Transform::Remove(sub_meshes), output),

        Commands::Split {
            input,
            sub_meshes,
            output,
        } => (input, Transform::Split(sub_meshes), output),

        Commands::Reverse { input, output } => (input, Transform::Reverse, output),

        Commands::Prune {
            input,
            threshold,
            output,
        } => (input, Transform::Prune(threshold), output),
    };

    tracing::info!("Running {} on {:?}", transform.name(), input);
    ops::run(&input, &transform, &settings, output.as_deref(), None)?;
    tracing::info!("Done!");

    Ok(())
}
