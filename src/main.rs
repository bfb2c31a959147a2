use clap::{Parser, Subcommand};
use shoebox::collection::Collection;
use shoebox::config::ShoeboxConfig;
use shoebox::import::{self, NullProgress};
use shoebox::output;
use shoebox::sort::SortCriterion;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "shoebox")]
#[command(about = "Photo collection organizer")]
#[command(long_about = "\
Photo collection organizer

Builds a collection tree from a directory of images and shows what an
import would organize: groups, pictures, duplicates.

  photos/
  ├── alps/
  │   ├── 042-Lake-Zurich.jpg     # description: \"Lake Zurich\"
  │   └── IMG_0042.jpg            # description: \"IMG 0042\"
  ├── notes.txt                   # no decoder → skipped
  └── copy-of-lake.jpg            # same content → skipped as duplicate

Files are recognized by their magic bytes, not extensions, and duplicate
detection hashes file contents. Tune behavior in shoebox.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (defaults to ./shoebox.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a directory into a fresh collection and print the tree
    Import {
        /// Directory of images
        dir: PathBuf,
        /// Group name for the imported pictures (defaults to the directory name)
        #[arg(long)]
        group: Option<String>,
        /// Do not descend into subdirectories
        #[arg(long)]
        flat: bool,
        /// Sort the imported group (description, film-reference,
        /// creation-time, comment, photographer, copyright-holder)
        #[arg(long, value_parser = parse_criterion)]
        sort: Option<SortCriterion>,
        /// Print the tree as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Scan a directory and report importable files and duplicates
    Check {
        /// Directory of images
        dir: PathBuf,
    },
}

fn parse_criterion(value: &str) -> Result<SortCriterion, String> {
    match value {
        "description" => Ok(SortCriterion::Description),
        "film-reference" => Ok(SortCriterion::FilmReference),
        "creation-time" => Ok(SortCriterion::CreationTime),
        "comment" => Ok(SortCriterion::Comment),
        "photographer" => Ok(SortCriterion::Photographer),
        "copyright-holder" => Ok(SortCriterion::CopyrightHolder),
        other => Err(format!("unknown sort criterion '{other}'")),
    }
}

fn load_config(cli_path: Option<&Path>) -> Result<ShoeboxConfig, Box<dyn std::error::Error>> {
    match cli_path {
        Some(path) => Ok(ShoeboxConfig::load(path)?),
        None => Ok(ShoeboxConfig::load_or_default(Path::new("."))?),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Import {
            dir,
            group,
            flat,
            sort,
            json,
        } => {
            let mut import_config = config.import.clone();
            if flat {
                import_config.recurse = false;
            }

            let mut collection = Collection::new();
            let root = collection.root();
            let group_name = group.unwrap_or_else(|| {
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Imported".to_string())
            });
            let group_id = collection.add_group(root, group_name)?;

            let report = import::import_directory(
                &mut collection,
                group_id,
                &dir,
                &import_config,
                Arc::new(NullProgress),
            )?;
            if let Some(criterion) = sort {
                collection.sort_children(group_id, criterion)?;
            }

            if json {
                let tree = output::tree_json(&collection, root);
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                print!("{}", output::render_tree(&collection, root));
                println!();
                println!("{}", output::render_stats(&collection.subtree_stats(root)));
                println!("Imported {} pictures, skipped {}", report.added, report.skipped);
            }
        }
        Command::Check { dir } => {
            let candidates =
                import::scan_candidates(&dir, &config.import, &NullProgress)?;

            let mut seen: HashMap<u64, String> = HashMap::new();
            let mut duplicates = 0usize;
            for candidate in &candidates {
                let Some(checksum) = candidate.checksum() else {
                    continue;
                };
                match seen.get(&checksum) {
                    Some(first) => {
                        duplicates += 1;
                        println!("Duplicate: {}", candidate.location());
                        println!("    Same content as: {first}");
                    }
                    None => {
                        seen.insert(checksum, candidate.location().to_string());
                    }
                }
            }
            println!(
                "{} importable files, {} duplicates",
                candidates.len(),
                duplicates
            );
        }
    }
    Ok(())
}
