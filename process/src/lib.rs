//! # Roster Processing
//!
//! One-shot batch loader. Reads the per-community roster files and
//! rewrites the stored eligibility lists wholesale, optionally rebuilding
//! the derived address -> communities index afterwards.
//!
//! Every run rebuilds everything from the source files, so re-running with
//! unchanged inputs is idempotent. A community whose file is missing is
//! skipped and its stored list left absent; readers treat that as zero
//! eligible addresses.

use std::{env, path::PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use roster::{
    communities::Community,
    loader::{LoadError, index_by_address, load_community},
    store::{init_redis, store_address_index},
};

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";

pub async fn load_rosters(roster_dir: PathBuf, build_index: bool) {
    let redis_url =
        env::var("CLAWBACK_REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
    let mut conn = init_redis(&redis_url).await;

    let pb = ProgressBar::new(Community::ALL.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap()
        .progress_chars("=> "),
    );

    let mut lists = Vec::new();
    let mut loaded = 0;
    let mut discarded = 0;
    let mut skipped = 0;

    for community in Community::ALL {
        pb.set_message(format!("Loading {community}"));

        match load_community(&mut conn, &roster_dir, community).await {
            Ok(outcome) => {
                loaded += outcome.addresses.len();
                discarded += outcome.discarded;
                lists.push((community, outcome.addresses));
            }
            Err(LoadError::Source(err)) => {
                println!("\nSkipping {community}: {err}");
                skipped += 1;
            }
            Err(LoadError::Store(err)) => {
                pb.abandon_with_message("Store failure");
                eprintln!("Aborting: {err}");
                return;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    println!("\nLoaded Addresses: {}", loaded);
    println!("Skipped Communities: {}", skipped);
    println!("Discarded Lines: {}\n", discarded);

    if build_index {
        let index = index_by_address(&lists);

        match store_address_index(&mut conn, &index).await {
            Ok(()) => println!("Reverse index written for {} addresses", index.len()),
            Err(err) => eprintln!("Reverse index write failed: {err}"),
        }
    }
}
