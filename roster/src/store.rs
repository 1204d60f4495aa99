//! Redis access for rosters and registrations.
//!
//! All values are plain keys holding JSON. Eligibility lists are rewritten
//! wholesale by the loader and only ever scanned by the serving layer. The
//! registration record is the one key with concurrent writers, so its
//! update goes through a compare-and-swap script; scripts execute
//! atomically inside Redis, which is what makes the check-then-insert safe
//! across handler processes.

use std::{collections::BTreeMap, time::Duration};

use redis::{
    AsyncCommands, Client, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use thiserror::Error;

use crate::{communities::Community, record::RegistrationRecord};

pub const REGISTRATIONS_KEY: &str = "registered-addresses";

const CAS_ATTEMPTS: usize = 5;

/// SET only if the key still holds the value the caller read. An absent
/// key compares as the empty string so the first write swaps in cleanly.
const SWAP_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if current == false then
  current = ''
end
if current == ARGV[1] then
  redis.call('SET', KEYS[1], ARGV[2])
  return 1
end
return 0
"#;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store i/o failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Stored record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Address already registered for clawback")]
    AlreadyRegistered,

    #[error("Registration contention, retries exhausted")]
    Contention,
}

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).unwrap();
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .unwrap();

    connection_manager
}

pub fn eligible_key(community: Community) -> String {
    format!("eligible-addresses-{community}")
}

/// `None` means the community was never loaded, which callers treat as
/// zero eligible addresses rather than an error.
pub async fn fetch_eligible(
    conn: &mut ConnectionManager,
    community: Community,
) -> Result<Option<Vec<String>>, StoreError> {
    let raw: Option<String> = conn.get(eligible_key(community)).await?;

    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn store_eligible(
    conn: &mut ConnectionManager,
    community: Community,
    addresses: &[String],
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(addresses)?;
    let _: () = conn.set(eligible_key(community), raw).await?;

    Ok(())
}

/// Scan the canonical per-community lists for every community containing
/// the address.
pub async fn communities_of(
    conn: &mut ConnectionManager,
    address: &str,
) -> Result<Vec<Community>, StoreError> {
    let mut communities = Vec::new();

    for community in Community::ALL {
        if let Some(addresses) = fetch_eligible(conn, community).await? {
            if addresses.iter().any(|eligible| eligible == address) {
                communities.push(community);
            }
        }
    }

    Ok(communities)
}

/// Derived cache of the eligibility lists, one key per address. Rebuilt
/// wholesale by the loader, never maintained independently.
pub async fn store_address_index(
    conn: &mut ConnectionManager,
    index: &BTreeMap<String, Vec<Community>>,
) -> Result<(), StoreError> {
    for (address, communities) in index {
        let raw = serde_json::to_string(communities)?;
        let _: () = conn.set(address, raw).await?;
    }

    Ok(())
}

pub async fn fetch_registrations(
    conn: &mut ConnectionManager,
) -> Result<RegistrationRecord, StoreError> {
    let raw: Option<String> = conn.get(REGISTRATIONS_KEY).await?;

    Ok(RegistrationRecord::from_json(&raw.unwrap_or_default())?)
}

/// Register an address for clawback, enforcing the global-uniqueness rule
/// under concurrent requests: read the record, check and insert in memory,
/// then persist with a compare-and-swap keyed on the raw value read. A
/// lost swap means another writer landed first; re-read and retry.
pub async fn register_address(
    conn: &mut ConnectionManager,
    community: Community,
    address: &str,
) -> Result<(), StoreError> {
    let script = Script::new(SWAP_SCRIPT);

    for _ in 0..CAS_ATTEMPTS {
        let raw: Option<String> = conn.get(REGISTRATIONS_KEY).await?;
        let raw = raw.unwrap_or_default();

        let mut record = RegistrationRecord::from_json(&raw)?;
        record
            .register(community, address)
            .map_err(|_| StoreError::AlreadyRegistered)?;

        let swapped: i32 = script
            .key(REGISTRATIONS_KEY)
            .arg(&raw)
            .arg(record.to_json()?)
            .invoke_async(conn)
            .await?;

        if swapped == 1 {
            return Ok(());
        }
    }

    Err(StoreError::Contention)
}
