//! # Price Feed
//!
//! Redis-backed storage for the price observations the terminal chart
//! polls. The feed pushes one point at a time; we keep the latest point
//! under its own key for O(1) reads and a capped recent-history list,
//! newest first.

use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};

use roster::store::StoreError;

pub const LATEST_PRICE_KEY: &str = "latest-price";
pub const PRICE_HISTORY_KEY: &str = "price-history";

pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const HISTORY_CAP: usize = 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub timestamp: i64,
}

impl PricePoint {
    /// Feed sanity: finite positive price, positive unix timestamp.
    pub fn checked(price: f64, timestamp: i64) -> Option<Self> {
        if !price.is_finite() || price <= 0.0 || timestamp <= 0 {
            return None;
        }

        Some(Self { price, timestamp })
    }
}

pub async fn fetch_latest_price(
    conn: &mut ConnectionManager,
) -> Result<Option<PricePoint>, StoreError> {
    let raw: Option<String> = conn.get(LATEST_PRICE_KEY).await?;

    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn store_price(
    conn: &mut ConnectionManager,
    point: &PricePoint,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(point)?;

    let _: () = conn.set(LATEST_PRICE_KEY, &raw).await?;
    let _: () = conn.lpush(PRICE_HISTORY_KEY, &raw).await?;
    let _: () = conn
        .ltrim(PRICE_HISTORY_KEY, 0, HISTORY_CAP as isize - 1)
        .await?;

    Ok(())
}

pub async fn fetch_price_history(
    conn: &mut ConnectionManager,
    limit: usize,
) -> Result<Vec<PricePoint>, StoreError> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let raws: Vec<String> = conn
        .lrange(PRICE_HISTORY_KEY, 0, limit as isize - 1)
        .await?;

    raws.iter()
        .map(|raw| serde_json::from_str(raw).map_err(StoreError::from))
        .collect()
}
