use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

mod asset_pipeline;
mod fbx;
mod scene_graph;
mod scene_io;

use asset_pipeline::{RecenterConfig, TraversalScope};

/// Centers FBX meshes on their center of gravity and zeroes their node transforms.
#[derive(Parser, Debug)]
#[command(name = "fbx-recenter", version, about, long_about = None)]
struct Cli {
    /// Binary FBX file to read
    input: PathBuf,

    /// Where to write the centered scene
    output: PathBuf,

    /// Visit the whole node hierarchy instead of only the root's direct children
    #[arg(long)]
    recursive: bool,

    /// Report what would be centered without writing the output
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn recenter_config(&self) -> RecenterConfig {
        RecenterConfig {
            scope: if self.recursive {
                TraversalScope::Recursive
            } else {
                TraversalScope::DirectChildren
            },
        }
    }
}

fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let mut scene = scene_io::load_scene(&cli.input)?;
    log::info!(
        "Loaded {} (FBX {})",
        cli.input.display(),
        scene.version()
    );

    let report = asset_pipeline::recenter_scene(&mut scene, &cli.recenter_config())?;

    if cli.dry_run {
        for node in &report.nodes {
            println!(
                "{}\t{}\t{}\t{:.6}\t{:.6}\t{:.6}{}",
                node.node_name,
                node.mesh_name,
                node.vertex_count,
                node.center.x,
                node.center.y,
                node.center.z,
                if node.shared { "\tshared" } else { "" }
            );
        }
        log::info!(
            "Dry run, {} node(s) would be centered, nothing written",
            report.nodes.len()
        );
        return Ok(());
    }

    scene_io::save_scene(scene, &cli.output)?;
    log::info!(
        "Wrote {} with {} centered node(s)",
        cli.output.display(),
        report.nodes.len()
    );

    Ok(())
}
