//! msb-tool: command line front end for the layout core.
//!
//! Reads layouts saved by `msb_core::io`, applies one operation and writes
//! the result to `--output`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use bevy::math::Vec3;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use msb_core::collection::{EntryCollection, EntrySelector, ReferenceGraph};
use msb_core::config::ToolkitConfig;
use msb_core::entries::EntrySupertype;
use msb_core::io::{content_hash, load_layout, save_layout};
use msb_core::logging::{init_tracing, LogLevel};
use msb_core::merge::MapMerger;
use msb_core::transform::{move_map, rotate_all_in_world, translate_all, MapMove, Rotation};

#[derive(Parser, Debug)]
#[command(name = "msb-tool")]
#[command(about = "Inspect, merge and transform map layouts")]
#[command(version)]
struct Cli {
    /// Toolkit config (.ron or .json)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print sublist sizes, broken references and the content hash
    Info {
        layout: PathBuf,
        /// Also list the entries of one sublist (e.g. `map_pieces`, `MapPiece`)
        #[arg(long, value_name = "LIST")]
        list: Option<String>,
    },

    /// Merge two layouts into a new one
    Merge {
        first: PathBuf,
        second: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Keep going when both layouts use a name in the same sublist
        #[arg(long)]
        allow_repeated_names: bool,
    },

    /// Translate parts and regions
    Translate {
        layout: PathBuf,
        /// Offset as `x,y,z`
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        delta: Vec3,
        /// Entry names to move (default: all parts and regions)
        #[arg(long = "select", value_name = "NAME")]
        select: Vec<String>,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rotate parts and regions about a pivot
    Rotate {
        layout: PathBuf,
        /// Euler angles as `x,y,z`
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, conflicts_with = "yaw")]
        rotation: Option<Vec3>,
        /// Rotation about the vertical axis
        #[arg(long, allow_hyphen_values = true)]
        yaw: Option<f32>,
        /// Pivot as `x,y,z` (default: origin)
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        pivot: Option<Vec3>,
        /// Angles are radians rather than degrees
        #[arg(long)]
        radians: bool,
        #[arg(long = "select", value_name = "NAME")]
        select: Vec<String>,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Move a map from one reference frame onto another
    Move {
        layout: PathBuf,
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        start_translate: Option<Vec3>,
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        end_translate: Option<Vec3>,
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        start_rotate: Option<Vec3>,
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        end_rotate: Option<Vec3>,
        #[arg(long = "select", value_name = "NAME")]
        select: Vec<String>,
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Parses `x,y,z` into a vector.
fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got {s:?}"));
    }
    let mut values = [0.0_f32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .parse()
            .map_err(|e| format!("invalid component {part:?}: {e}"))?;
    }
    Ok(Vec3::from_array(values))
}

fn selectors(names: Vec<String>) -> Vec<EntrySelector> {
    names.into_iter().map(EntrySelector::from).collect()
}

fn load(path: &Path) -> anyhow::Result<EntryCollection> {
    load_layout(path).with_context(|| format!("failed to load layout {}", path.display()))
}

fn save(path: &Path, collection: &EntryCollection) -> anyhow::Result<()> {
    save_layout(path, collection)
        .with_context(|| format!("failed to save layout {}", path.display()))
}

fn print_list(collection: &EntryCollection, alias: &str) -> anyhow::Result<()> {
    let (name, list) = collection.find_list(alias)?;
    println!("{name} ({}):", list.supertype());
    for entry in list {
        println!("  {:<32} {}", entry.name, entry.kind_name());
    }
    Ok(())
}

fn print_info(collection: &EntryCollection, config: &ToolkitConfig) -> anyhow::Result<()> {
    for (name, list) in collection.lists() {
        println!("{name:<24} {:<8} {}", list.supertype().as_str(), list.len());
    }
    println!("total: {}", collection.entry_count());

    let width = config.group_width()?;
    let off_width = collection
        .get_parts()
        .filter_map(|e| e.as_part())
        .filter(|p| p.draw_groups.width() != width || p.display_groups.width() != width)
        .count();
    if off_width > 0 {
        warn!(off_width, expected = width.bit_count(), "Parts with non-default group width");
    }

    let broken = collection.broken_references();
    println!("broken references: {}", broken.len());
    for (key, field, reference) in &broken {
        let owner = collection
            .get_entry(*key)
            .map(|e| e.name.as_str())
            .unwrap_or("?");
        println!("  {owner}.{field} -> {reference}");
    }

    let graph = ReferenceGraph::build(collection);
    let unused_models = graph.unreferenced(collection, EntrySupertype::Models).len();
    println!("references: {} ({unused_models} unused models)", graph.edge_count());
    println!("sha3-256: {}", content_hash(collection)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ToolkitConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ToolkitConfig::default(),
    };
    let logging = &mut config.logging;
    logging.default_level = LogLevel::raised_by(logging.default_level, cli.verbose);
    for (_, level) in &mut logging.module_filters {
        *level = LogLevel::raised_by(*level, cli.verbose);
    }
    init_tracing(&config.logging);

    match cli.command {
        Command::Info { layout, list } => {
            let collection = load(&layout)?;
            print_info(&collection, &config)?;
            if let Some(alias) = list {
                print_list(&collection, &alias)?;
            }
        }
        Command::Merge {
            first,
            second,
            output,
            allow_repeated_names,
        } => {
            let a = load(&first)?;
            let b = load(&second)?;
            let merged = MapMerger::new()
                .allow_repeated_names(allow_repeated_names || config.merge.allow_repeated_names)
                .merge(&a, &b)
                .context("merge failed")?;
            save(&output, &merged)?;
            info!(entries = merged.entry_count(), "Merged layouts");
        }
        Command::Translate {
            layout,
            delta,
            select,
            output,
        } => {
            let mut collection = load(&layout)?;
            let count = translate_all(&mut collection, delta, &selectors(select))?;
            save(&output, &collection)?;
            info!(count, "Translated entries");
        }
        Command::Rotate {
            layout,
            rotation,
            yaw,
            pivot,
            radians,
            select,
            output,
        } => {
            let rotation = match (rotation, yaw) {
                (Some(angles), None) => Rotation::Euler(angles),
                (None, Some(yaw)) => Rotation::Yaw(yaw),
                _ => bail!("exactly one of --rotation or --yaw is required"),
            };
            let mut collection = load(&layout)?;
            let count = rotate_all_in_world(
                &mut collection,
                rotation,
                pivot,
                radians || config.transform.radians,
                &selectors(select),
            )?;
            save(&output, &collection)?;
            info!(count, "Rotated entries");
        }
        Command::Move {
            layout,
            start_translate,
            end_translate,
            start_rotate,
            end_rotate,
            select,
            output,
        } => {
            let frames = MapMove {
                start_translate,
                end_translate,
                start_rotate: start_rotate.map(Rotation::Euler),
                end_rotate: end_rotate.map(Rotation::Euler),
            };
            let mut collection = load(&layout)?;
            let count = move_map(&mut collection, &frames, &selectors(select))?;
            save(&output, &collection)?;
            info!(count, "Moved entries");
        }
    }
    Ok(())
}
