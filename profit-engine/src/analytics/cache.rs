//! Read-through result cache
//!
//! Entries expire by TTL only. Writes to the ledger never invalidate them;
//! a dashboard may be a few minutes stale.

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::period::{Period, PeriodType};

/// 缓存键: 租户 + 结果类型 + 周期
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tenant_id: String,
    pub scope: &'static str,
    pub kind: PeriodType,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CacheKey {
    pub fn new(tenant_id: &str, scope: &'static str, period: &Period) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            scope,
            kind: period.kind,
            start: period.start_date,
            end: period.end_date,
        }
    }

    pub fn profit_loss(tenant_id: &str, period: &Period) -> Self {
        Self::new(tenant_id, "profit_loss", period)
    }

    pub fn savings(tenant_id: &str, period: &Period) -> Self {
        Self::new(tenant_id, "savings", period)
    }
}

/// get/set with a per-entry TTL
pub trait AnalyticsCache<V>: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<V>;

    fn set(&self, key: CacheKey, value: V, ttl: Duration);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
    expires_at: Instant,
}

/// 有界 TTL 缓存 (满时淘汰最早写入的条目)
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<CacheKey, Entry<V>>,
    max_size: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_size: max_size.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Drop every expired entry; returns how many were removed
    pub fn clean_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Cleaned expired cache entries");
        }
        removed
    }

    /// Administrative flush of one tenant's entries
    pub fn invalidate_tenant(&self, tenant_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.tenant_id != tenant_id);
        let removed = before.saturating_sub(self.entries.len());
        tracing::info!(tenant_id = %tenant_id, removed, "Invalidated tenant cache");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().inserted_at)
            .map(|e| e.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

impl<V: Clone + Send + Sync> AnalyticsCache<V> for TtlCache<V> {
    fn get(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone());

        match hit {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                // guard from get() is released above; safe to remove here
                self.entries.remove_if(key, |_, e| e.expires_at <= now);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn set(&self, key: CacheKey, value: V, ttl: Duration) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.clean_expired();
            if self.entries.len() >= self.max_size {
                self.evict_oldest();
            }
        }
        let now = Instant::now();
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
                expires_at: now + ttl,
            },
        );
    }
}
