// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! SQLite-backed accounting storage. Every model gets its own namespaced
//! set of tables (`requests_<token>`, `runtime_<token>`, `tier_pricing_<token>`,
//! `hourly_price_<token>`, `billing_mode_<token>`) keyed by a safe token, plus
//! a shared `model_name_map` translating names to tokens.
//!
//! `rusqlite::Connection` is not `Sync`; callers on the async side should
//! drive these methods through `tokio::task::spawn_blocking`.

use std::collections::HashMap;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::pricing::{PricingConfig, Tier};
use super::records::{RequestRecord, RuntimeInterval};
use super::safe_name::safe_token;

#[derive(Debug, thiserror::Error)]
pub enum AccountingError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unknown model {0}")]
    UnknownModel(String),
}

pub struct AccountingStore {
    conn: Mutex<Connection>,
}

impl AccountingStore {
    pub fn open(path: &str) -> Result<Self, AccountingError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             CREATE TABLE IF NOT EXISTS model_name_map (
                 name TEXT PRIMARY KEY,
                 token TEXT NOT NULL UNIQUE
             );",
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self, AccountingError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS model_name_map (
                 name TEXT PRIMARY KEY,
                 token TEXT NOT NULL UNIQUE
             );",
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Ensures `model` has a token and its per-model tables exist. Safe to
    /// call repeatedly.
    pub fn ensure_model(&self, model: &str) -> Result<String, AccountingError> {
        let conn = self.conn.lock();
        let token = safe_token(model);
        conn.execute(
            "INSERT OR IGNORE INTO model_name_map (name, token) VALUES (?1, ?2)",
            params![model, token],
        )?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS requests_{token} (
                 ts REAL NOT NULL, in_tok INTEGER NOT NULL, out_tok INTEGER NOT NULL,
                 cache_n INTEGER NOT NULL, prompt_n INTEGER NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_requests_{token}_ts ON requests_{token} (ts);
             CREATE TABLE IF NOT EXISTS runtime_{token} (
                 start_ts REAL NOT NULL, end_ts REAL NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tier_pricing_{token} (
                 tier_idx INTEGER PRIMARY KEY, in_min INTEGER NOT NULL, in_max INTEGER NOT NULL,
                 out_min INTEGER NOT NULL, out_max INTEGER NOT NULL, in_price REAL NOT NULL,
                 out_price REAL NOT NULL, cache_ok INTEGER NOT NULL, cache_write_price REAL NOT NULL,
                 cache_read_price REAL NOT NULL
             );
             CREATE TABLE IF NOT EXISTS hourly_price_{token} (price REAL NOT NULL);
             CREATE TABLE IF NOT EXISTS billing_mode_{token} (use_tiered INTEGER NOT NULL);"
        ))?;
        Ok(token)
    }

    pub fn record_request(&self, model: &str, record: RequestRecord) -> Result<(), AccountingError> {
        let token = self.ensure_model(model)?;
        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO requests_{token} (ts, in_tok, out_tok, cache_n, prompt_n) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![record.ts, record.in_tok, record.out_tok, record.cache_n, record.prompt_n],
        )?;
        Ok(())
    }

    pub fn open_runtime_interval(&self, model: &str, start_ts: f64) -> Result<(), AccountingError> {
        let token = self.ensure_model(model)?;
        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO runtime_{token} (start_ts, end_ts) VALUES (?1, ?1)"),
            params![start_ts],
        )?;
        Ok(())
    }

    /// Closes the most recent open runtime interval (`end_ts <= start_ts`).
    pub fn close_runtime_interval(&self, model: &str, end_ts: f64) -> Result<(), AccountingError> {
        let token = self.ensure_model(model)?;
        let conn = self.conn.lock();
        conn.execute(
            &format!(
                "UPDATE runtime_{token} SET end_ts = ?1
                 WHERE rowid = (SELECT rowid FROM runtime_{token} WHERE end_ts <= start_ts ORDER BY start_ts DESC LIMIT 1)"
            ),
            params![end_ts],
        )?;
        Ok(())
    }

    pub fn requests_in_window(&self, model: &str, t0: f64, t1: f64) -> Result<Vec<RequestRecord>, AccountingError> {
        let token = self.ensure_model(model)?;
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT ts, in_tok, out_tok, cache_n, prompt_n FROM requests_{token} WHERE ts >= ?1 AND ts <= ?2 ORDER BY ts"
        ))?;
        let rows = stmt
            .query_map(params![t0, t1], |row| {
                Ok(RequestRecord {
                    ts: row.get(0)?,
                    in_tok: row.get(1)?,
                    out_tok: row.get(2)?,
                    cache_n: row.get(3)?,
                    prompt_n: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn runtime_intervals_in_window(&self, model: &str, t0: f64, t1: f64) -> Result<Vec<RuntimeInterval>, AccountingError> {
        let token = self.ensure_model(model)?;
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT start_ts, end_ts FROM runtime_{token} WHERE start_ts <= ?2 AND (end_ts >= ?1 OR end_ts <= start_ts) ORDER BY start_ts"
        ))?;
        let rows = stmt
            .query_map(params![t0, t1], |row| {
                Ok(RuntimeInterval { start_ts: row.get(0)?, end_ts: row.get(1)? })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn load_pricing(&self, model: &str) -> Result<PricingConfig, AccountingError> {
        let token = self.ensure_model(model)?;
        let conn = self.conn.lock();
        let use_tiered: bool = conn
            .query_row(&format!("SELECT use_tiered FROM billing_mode_{token} LIMIT 1"), [], |r| r.get(0))
            .optional()?
            .unwrap_or(true);
        let hourly_price: f64 = conn
            .query_row(&format!("SELECT price FROM hourly_price_{token} LIMIT 1"), [], |r| r.get(0))
            .optional()?
            .unwrap_or(0.0);
        let mut stmt = conn.prepare(&format!(
            "SELECT tier_idx, in_min, in_max, out_min, out_max, in_price, out_price, cache_ok, cache_write_price, cache_read_price FROM tier_pricing_{token} ORDER BY tier_idx"
        ))?;
        let tiers = stmt
            .query_map([], |row| {
                Ok(Tier {
                    tier_idx: row.get(0)?,
                    in_min: row.get(1)?,
                    in_max: row.get(2)?,
                    out_min: row.get(3)?,
                    out_max: row.get(4)?,
                    in_price: row.get(5)?,
                    out_price: row.get(6)?,
                    cache_ok: row.get(7)?,
                    cache_write_price: row.get(8)?,
                    cache_read_price: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PricingConfig { use_tiered, tiers, hourly_price })
    }

    pub fn save_pricing(&self, model: &str, config: &PricingConfig) -> Result<(), AccountingError> {
        let token = self.ensure_model(model)?;
        let conn = self.conn.lock();
        conn.execute(&format!("DELETE FROM tier_pricing_{token}"), [])?;
        for tier in &config.tiers {
            conn.execute(
                &format!(
                    "INSERT INTO tier_pricing_{token}
                     (tier_idx, in_min, in_max, out_min, out_max, in_price, out_price, cache_ok, cache_write_price, cache_read_price)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                params![
                    tier.tier_idx, tier.in_min, tier.in_max, tier.out_min, tier.out_max,
                    tier.in_price, tier.out_price, tier.cache_ok, tier.cache_write_price, tier.cache_read_price
                ],
            )?;
        }
        conn.execute(&format!("DELETE FROM hourly_price_{token}"), [])?;
        conn.execute(&format!("INSERT INTO hourly_price_{token} (price) VALUES (?1)"), params![config.hourly_price])?;
        conn.execute(&format!("DELETE FROM billing_mode_{token}"), [])?;
        conn.execute(&format!("INSERT INTO billing_mode_{token} (use_tiered) VALUES (?1)"), params![config.use_tiered])?;
        Ok(())
    }

    /// All `(name, token)` pairs ever recorded, regardless of whether the
    /// catalogue still knows about the name.
    pub fn all_known_models(&self) -> Result<HashMap<String, String>, AccountingError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT name, token FROM model_name_map")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().collect())
    }

    /// Drops every table belonging to `model`, including its name-map entry.
    /// Callers must have already confirmed `model` is an orphan.
    pub fn drop_model_data(&self, model: &str) -> Result<(), AccountingError> {
        let conn = self.conn.lock();
        let token: Option<String> = conn
            .query_row("SELECT token FROM model_name_map WHERE name = ?1", params![model], |r| r.get(0))
            .optional()?;
        let Some(token) = token else {
            return Err(AccountingError::UnknownModel(model.to_string()));
        };
        conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS requests_{token};
             DROP TABLE IF EXISTS runtime_{token};
             DROP TABLE IF EXISTS tier_pricing_{token};
             DROP TABLE IF EXISTS hourly_price_{token};
             DROP TABLE IF EXISTS billing_mode_{token};"
        ))?;
        conn.execute("DELETE FROM model_name_map WHERE name = ?1", params![model])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_model_is_idempotent() {
        let store = AccountingStore::open_in_memory().unwrap();
        let t1 = store.ensure_model("m1").unwrap();
        let t2 = store.ensure_model("m1").unwrap();
        assert_eq!(t1, t2);
    }

    #[test]
    fn records_round_trip_within_window() {
        let store = AccountingStore::open_in_memory().unwrap();
        store
            .record_request("m1", RequestRecord { ts: 10.0, in_tok: 5, out_tok: 5, cache_n: 0, prompt_n: 5 })
            .unwrap();
        store
            .record_request("m1", RequestRecord { ts: 999.0, in_tok: 1, out_tok: 1, cache_n: 0, prompt_n: 1 })
            .unwrap();
        let rows = store.requests_in_window("m1", 0.0, 100.0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ts, 10.0);
    }

    #[test]
    fn runtime_interval_open_then_closed() {
        let store = AccountingStore::open_in_memory().unwrap();
        store.open_runtime_interval("m1", 5.0).unwrap();
        let rows = store.runtime_intervals_in_window("m1", 0.0, 100.0).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_open());
        store.close_runtime_interval("m1", 20.0).unwrap();
        let rows = store.runtime_intervals_in_window("m1", 0.0, 100.0).unwrap();
        assert!(!rows[0].is_open());
        assert_eq!(rows[0].end_ts, 20.0);
    }

    #[test]
    fn pricing_round_trips() {
        let store = AccountingStore::open_in_memory().unwrap();
        let config = PricingConfig {
            use_tiered: true,
            tiers: vec![Tier {
                tier_idx: 1,
                in_min: 0,
                in_max: -1,
                out_min: 0,
                out_max: -1,
                in_price: 1.0,
                out_price: 2.0,
                cache_ok: false,
                cache_write_price: 0.0,
                cache_read_price: 0.0,
            }],
            hourly_price: 1.5,
        };
        store.save_pricing("m1", &config).unwrap();
        let loaded = store.load_pricing("m1").unwrap();
        assert_eq!(loaded.tiers.len(), 1);
        assert_eq!(loaded.hourly_price, 1.5);
        assert!(loaded.use_tiered);
    }

    #[test]
    fn drop_model_data_removes_name_map_entry() {
        let store = AccountingStore::open_in_memory().unwrap();
        store.ensure_model("m1").unwrap();
        store.drop_model_data("m1").unwrap();
        assert!(store.all_known_models().unwrap().is_empty());
    }
}
