//! Batch population of the eligibility lists from flat roster files.
//!
//! Each community has one `<community>.txt` source file: newline-delimited
//! addresses, optionally comma-suffixed with extra fields that are
//! discarded. Every run rewrites the stored lists wholesale from the
//! source files, so repeated runs with unchanged inputs store identical
//! JSON.

use std::{
    collections::{BTreeMap, HashSet},
    fs, io,
    path::Path,
};

use redis::aio::ConnectionManager;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    communities::Community,
    store::{self, StoreError},
    utils::normalize_address,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Roster file unreadable: {0}")]
    Source(#[from] io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ParsedRoster {
    pub addresses: Vec<String>,
    /// 0x-prefixed lines that failed strict address validation.
    pub discarded: usize,
}

#[derive(Default)]
pub struct LoadSummary {
    pub communities_loaded: usize,
    pub addresses_loaded: usize,
    pub discarded: usize,
    pub skipped: Vec<Community>,
}

/// Blank lines and lines not starting with 0x are skipped silently;
/// 0x-prefixed lines that fail validation are counted as discarded;
/// duplicates within one file are dropped.
pub fn parse_roster(contents: &str) -> ParsedRoster {
    let mut addresses = Vec::new();
    let mut seen = HashSet::new();
    let mut discarded = 0;

    for line in contents.lines() {
        let field = line.split(',').next().unwrap_or_default().trim();

        if !field.starts_with("0x") {
            continue;
        }

        match normalize_address(field) {
            Some(address) => {
                if seen.insert(address.clone()) {
                    addresses.push(address);
                }
            }
            None => discarded += 1,
        }
    }

    ParsedRoster {
        addresses,
        discarded,
    }
}

/// Derived address -> communities view of the loaded lists. An address
/// present in several rosters unions its community sets.
pub fn index_by_address(
    lists: &[(Community, Vec<String>)],
) -> BTreeMap<String, Vec<Community>> {
    let mut index: BTreeMap<String, Vec<Community>> = BTreeMap::new();

    for (community, addresses) in lists {
        for address in addresses {
            let communities = index.entry(address.clone()).or_default();

            if !communities.contains(community) {
                communities.push(*community);
            }
        }
    }

    index
}

/// Load one community roster from `<dir>/<community>.txt` and overwrite
/// its stored list wholesale.
pub async fn load_community(
    conn: &mut ConnectionManager,
    dir: &Path,
    community: Community,
) -> Result<ParsedRoster, LoadError> {
    let path = dir.join(format!("{community}.txt"));
    let contents = fs::read_to_string(&path)?;

    let parsed = parse_roster(&contents);
    store::store_eligible(conn, community, &parsed.addresses).await?;

    Ok(parsed)
}

/// Load every known community. A community with an unreadable source file
/// is logged and skipped so one bad roster cannot block the rest; a store
/// failure aborts.
pub async fn load_all(
    conn: &mut ConnectionManager,
    dir: &Path,
    build_index: bool,
) -> Result<LoadSummary, StoreError> {
    let mut lists = Vec::new();
    let mut summary = LoadSummary::default();

    for community in Community::ALL {
        match load_community(conn, dir, community).await {
            Ok(outcome) => {
                info!("Loaded {} addresses for {community}", outcome.addresses.len());

                summary.communities_loaded += 1;
                summary.addresses_loaded += outcome.addresses.len();
                summary.discarded += outcome.discarded;
                lists.push((community, outcome.addresses));
            }
            Err(LoadError::Source(err)) => {
                warn!("Skipping {community}: {err}");
                summary.skipped.push(community);
            }
            Err(LoadError::Store(err)) => return Err(err),
        }
    }

    if build_index {
        store::store_address_index(conn, &index_by_address(&lists)).await?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::{index_by_address, parse_roster};
    use crate::communities::Community;

    const A: &str = "0x1111111111111111111111111111111111111111";
    const B: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_parse_plain_lines() {
        let parsed = parse_roster(&format!("{A}\n{B}\n"));

        assert_eq!(parsed.addresses, [A, B]);
        assert_eq!(parsed.discarded, 0);
    }

    #[test]
    fn test_parse_discards_comma_fields() {
        let parsed = parse_roster(&format!("{A}, early-supporter, 42\n"));

        assert_eq!(parsed.addresses, [A]);
    }

    #[test]
    fn test_parse_skips_blank_and_foreign_lines() {
        let contents = format!("\n# comment\n{A}\n   \ntotal: 1\n");
        let parsed = parse_roster(&contents);

        assert_eq!(parsed.addresses, [A]);
        assert_eq!(parsed.discarded, 0);
    }

    #[test]
    fn test_parse_counts_malformed_addresses() {
        let contents = format!("0xDEADBEEF\n{A}\n0xzz11111111111111111111111111111111111111\n");
        let parsed = parse_roster(&contents);

        assert_eq!(parsed.addresses, [A]);
        assert_eq!(parsed.discarded, 2);
    }

    #[test]
    fn test_parse_folds_case_and_dedupes() {
        let lower = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";
        let upper = "0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD";
        let parsed = parse_roster(&format!("{lower}\n{upper}\n"));

        assert_eq!(parsed.addresses, [lower]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let contents = format!("{B}\n{A}\n{B}\n");

        assert_eq!(parse_roster(&contents).addresses, parse_roster(&contents).addresses);
        assert_eq!(parse_roster(&contents).addresses, [B, A]);
    }

    #[test]
    fn test_index_unions_communities() {
        let lists = vec![
            (Community::Aeon, vec![A.to_string(), B.to_string()]),
            (Community::Sproto, vec![A.to_string()]),
        ];

        let index = index_by_address(&lists);

        assert_eq!(index[A], [Community::Aeon, Community::Sproto]);
        assert_eq!(index[B], [Community::Aeon]);
    }

    #[test]
    fn test_index_does_not_duplicate() {
        let lists = vec![
            (Community::Mog, vec![A.to_string()]),
            (Community::Mog, vec![A.to_string()]),
        ];

        assert_eq!(index_by_address(&lists)[A], [Community::Mog]);
    }
}
