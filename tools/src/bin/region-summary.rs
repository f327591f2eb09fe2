use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use chunkatlas::{biome, Region, RegionSummary, Registry};
use chunkatlas_tools::{region_files, ErrorMessage, Report, Result};
use clap::{App, Arg};
use env_logger::Env;
use log::{error, info, warn};
use rayon::prelude::*;
use skimnbt::SkipList;

fn summarise(
    path: &Path,
    x: i32,
    z: i32,
    registry: &Registry,
    skip: &SkipList,
) -> chunkatlas::Result<RegionSummary> {
    let file = File::open(path)?;
    let mut region = Region::from_stream(file)?;
    RegionSummary::decode(&mut region, x, z, registry, skip)
}

fn load_registry(biomes: Option<&str>) -> Result<Registry> {
    let path = match biomes {
        Some(path) => path,
        None => return Ok(Registry::vanilla().clone()),
    };

    let json = std::fs::read_to_string(path)?;
    let merge = Registry::vanilla().merge(biome::parse_defs(&json)?)?;
    if !merge.collisions.is_empty() {
        warn!(
            "{} biome definitions in {} collided with existing biomes",
            merge.collisions.len(),
            path
        );
    }
    info!("{} biomes known", merge.registry.len());

    Ok(merge.registry)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let matches = App::new("region-summary")
        .about("Summarise the chunks of Minecraft region files as JSON")
        .arg(
            Arg::with_name("paths")
                .takes_value(true)
                .multiple(true)
                .required(true)
                .help("region files, or directories of them"),
        )
        .arg(
            Arg::with_name("skip")
                .long("skip")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("also skip chunk fields starting with this prefix"),
        )
        .arg(
            Arg::with_name("no-structures")
                .long("no-structures")
                .help("skip structure data"),
        )
        .arg(
            Arg::with_name("biomes")
                .long("biomes")
                .takes_value(true)
                .help("JSON biome definitions to add to the built-in biomes"),
        )
        .get_matches();

    let mut skip = SkipList::chunk_summary().clone();
    if let Some(extra) = matches.values_of("skip") {
        skip = skip.with_prefixes(extra)?;
    }
    if matches.is_present("no-structures") {
        skip = skip.with_prefixes(["Str", "Ref"])?;
    }

    let registry = load_registry(matches.value_of("biomes"))?;

    let paths: Vec<PathBuf> = matches.values_of("paths").unwrap().map(PathBuf::from).collect();
    let files = region_files(&paths)?;
    info!("{} region files", files.len());

    let (tx, rx) = mpsc::channel::<(PathBuf, chunkatlas::Result<RegionSummary>)>();

    let consumer = {
        let registry = registry.clone();
        thread::spawn(move || {
            let mut report = Report::default();
            for (path, summary) in rx {
                match summary {
                    Ok(summary) => {
                        info!(
                            "processed {}: {} chunks, {} errors",
                            path.display(),
                            summary.chunks.len(),
                            summary.error_count()
                        );
                        report.add(&summary, &registry);
                    }
                    Err(e) => {
                        error!("could not read {}: {}", path.display(), e);
                        report.add_failure(&path);
                    }
                }
            }
            report.finish()
        })
    };

    files
        .into_par_iter()
        .for_each_with(tx, |tx, (x, z, path)| {
            let summary = summarise(&path, x, z, &registry, &skip);
            // only fails if the consumer has gone, which leaves nothing to do.
            let _ = tx.send((path, summary));
        });

    let report = consumer
        .join()
        .map_err(|_| ErrorMessage("report thread panicked".to_owned()))?;

    info!(
        "{} chunks in {} regions, {} errors",
        report.chunks,
        report.regions.len(),
        report.errors
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
