use std::fs::File;

use chunkatlas::{extract, Region, Registry};
use chunkatlas_tools::{ErrorMessage, Result};
use clap::{App, Arg};
use env_logger::Env;
use log::info;
use skimnbt::{from_bytes, SkipList};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let matches = App::new("chunk-dump")
        .about("Print one chunk of a region file as JSON")
        .arg(Arg::with_name("region").takes_value(true).required(true))
        .arg(
            Arg::with_name("x")
                .takes_value(true)
                .required(true)
                .help("chunk x within the region, 0 to 31"),
        )
        .arg(
            Arg::with_name("z")
                .takes_value(true)
                .required(true)
                .help("chunk z within the region, 0 to 31"),
        )
        .arg(
            Arg::with_name("all")
                .long("all")
                .help("print every field rather than only those a summary reads"),
        )
        .get_matches();

    let path = matches.value_of("region").unwrap();
    let x: usize = matches.value_of("x").unwrap().parse()?;
    let z: usize = matches.value_of("z").unwrap().parse()?;

    let skip = if matches.is_present("all") {
        SkipList::empty()
    } else {
        SkipList::chunk_summary().clone()
    };

    let mut region = Region::from_stream(File::open(path)?)?;
    let chunk = region
        .read_compressed_chunk(x, z)?
        .ok_or_else(|| ErrorMessage(format!("no chunk at {}, {} in {}", x, z, path)))?;

    info!("{:?} chunk, {} bytes compressed", chunk.scheme, chunk.data.len());

    let root = from_bytes(&chunk.decompress()?, &skip)?;

    match extract(&root, Registry::vanilla()) {
        Ok(record) => info!("summary: {}", serde_json::to_string(&record)?),
        Err(e) => info!("chunk does not summarise: {}", e),
    }

    println!("{}", serde_json::to_string_pretty(&root)?);
    Ok(())
}
