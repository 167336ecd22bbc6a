// src/engine/cache.rs

//! Content-addressed memo of generated schedules and validation reports.
//! Entries are immutable once written; expiry is advisory and checked
//! lazily on read — nothing ever sweeps the table.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::models::{CacheKind, Team};
use crate::store::{NewCacheEntry, Repository, StoreError};

/// Deterministic fingerprint of a cacheable request shape. Any change to
/// team composition or the request (months, template, staffing target)
/// yields a different key, so a changed team can never be served a stale
/// result.
pub fn fingerprint(team: &Team, months: u32, active_members: usize) -> String {
    let config = format!(
        "{}|{}|{}|{}|{}",
        team.team_id, months, active_members, team.shift_template, team.people_per_shift
    );
    let mut hasher = Sha256::new();
    hasher.update(config.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fingerprint for a validation run: keyed by the exact schedule content,
/// so any edit to the stored schedule misses and revalidates.
pub fn validation_fingerprint(team_id: i64, schedule_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("validate|{team_id}|").as_bytes());
    hasher.update(schedule_json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// First unexpired entry for the key, newest first. A hit bumps the hit
/// counter as an observability signal only.
pub async fn lookup(
    repo: &dyn Repository,
    cache_key: &str,
) -> Result<Option<serde_json::Value>, StoreError> {
    let now = Utc::now();
    for entry in repo.load_cache_entries(cache_key).await? {
        if entry.expires_at > now {
            repo.bump_cache_hit(entry.cache_entry_id).await?;
            info!(cache_key, hit_count = entry.hit_count + 1, "cache hit");
            return Ok(Some(entry.cached_data));
        }
    }
    Ok(None)
}

/// Always writes a fresh entry; overlapping fingerprints accumulate and
/// `lookup` filters on validity.
pub async fn store(
    repo: &dyn Repository,
    cache_key: &str,
    kind: CacheKind,
    data: serde_json::Value,
    ttl_hours: i64,
) -> Result<(), StoreError> {
    repo.save_cache_entry(NewCacheEntry {
        cache_key: cache_key.to_string(),
        cache_type: kind,
        cached_data: data,
        expires_at: Utc::now() + Duration::hours(ttl_hours),
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRepository;
    use serde_json::json;

    fn team(id: i64) -> Team {
        Team {
            team_id: id,
            name: "A".into(),
            shift_template: "3-shift".into(),
            people_per_shift: 2,
        }
    }

    #[test]
    fn fingerprint_tracks_request_shape() {
        let a = fingerprint(&team(1), 2, 8);
        assert_eq!(a, fingerprint(&team(1), 2, 8));
        assert_ne!(a, fingerprint(&team(2), 2, 8));
        assert_ne!(a, fingerprint(&team(1), 3, 8));
        assert_ne!(a, fingerprint(&team(1), 2, 7));
    }

    #[tokio::test]
    async fn lookup_returns_stored_payload_until_expiry() {
        let repo = MemoryRepository::new();
        let key = fingerprint(&team(1), 1, 8);

        assert!(lookup(&repo, &key).await.unwrap().is_none());

        store(&repo, &key, CacheKind::Schedule, json!({"x": 1}), 24)
            .await
            .unwrap();
        assert_eq!(lookup(&repo, &key).await.unwrap(), Some(json!({"x": 1})));
    }

    #[tokio::test]
    async fn expired_entries_are_unreachable_not_evicted() {
        let repo = MemoryRepository::new();
        let key = "k".to_string();

        // Zero TTL expires immediately.
        store(&repo, &key, CacheKind::Schedule, json!({"stale": true}), 0)
            .await
            .unwrap();
        assert!(lookup(&repo, &key).await.unwrap().is_none());

        // The entry is still in the table; it is simply never returned.
        let entries = repo.load_cache_entries(&key).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hit_count, 0);
    }

    #[tokio::test]
    async fn hits_bump_the_counter() {
        let repo = MemoryRepository::new();
        store(&repo, "k", CacheKind::Validation, json!([]), 1).await.unwrap();
        lookup(&repo, "k").await.unwrap();
        lookup(&repo, "k").await.unwrap();
        let entries = repo.load_cache_entries("k").await.unwrap();
        assert_eq!(entries[0].hit_count, 2);
    }
}
