use crate::models::{ChamberTally, HouseByState, SenateMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Cached congress views sharing a single refresh timestamp.
///
/// Refreshing any one part moves the timestamp for all of them, so a part
/// fetched earlier can outlive its nominal TTL by up to one more TTL.
#[derive(Debug, Clone, Default)]
pub struct CongressSnapshot {
    pub senate: Option<Arc<SenateMap>>,
    pub house: Option<ChamberTally>,
    pub house_by_state: Option<Arc<HouseByState>>,
    refreshed_at: Option<Instant>,
}

impl CongressSnapshot {
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.refreshed_at.is_some_and(|at| at.elapsed() < ttl)
    }

    pub fn set_house(&mut self, tally: ChamberTally) {
        self.house = Some(tally);
        self.refreshed_at = Some(Instant::now());
    }

    pub fn set_senate(&mut self, senate: SenateMap) -> Arc<SenateMap> {
        let senate = Arc::new(senate);
        self.senate = Some(Arc::clone(&senate));
        self.refreshed_at = Some(Instant::now());
        senate
    }

    pub fn set_house_by_state(&mut self, house: HouseByState) -> Arc<HouseByState> {
        let house = Arc::new(house);
        self.house_by_state = Some(Arc::clone(&house));
        self.refreshed_at = Some(Instant::now());
        house
    }
}

/// Shared slot for the process-wide [`CongressSnapshot`].
#[derive(Debug, Default)]
pub struct SnapshotCell {
    inner: Mutex<CongressSnapshot>,
}

impl SnapshotCell {
    fn lock(&self) -> MutexGuard<'_, CongressSnapshot> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current snapshot; parts are reference counted.
    pub fn read(&self) -> CongressSnapshot {
        self.lock().clone()
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut CongressSnapshot) -> R) -> R {
        f(&mut self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_is_stale() {
        let snapshot = CongressSnapshot::default();
        assert!(!snapshot.is_fresh(Duration::from_secs(3600)));
        assert!(snapshot.house.is_none());
    }

    #[test]
    fn test_any_refresh_moves_shared_timestamp() {
        let mut snapshot = CongressSnapshot::default();
        snapshot.set_house(ChamberTally::default());
        assert!(snapshot.is_fresh(Duration::from_secs(3600)));

        std::thread::sleep(Duration::from_millis(5));
        assert!(!snapshot.is_fresh(Duration::from_millis(1)));

        snapshot.set_senate(SenateMap::new());
        assert!(snapshot.is_fresh(Duration::from_millis(1000)));
        assert!(snapshot.house.is_some());
    }

    #[test]
    fn test_cell_read_sees_updates() {
        let cell = SnapshotCell::default();
        let senate = cell.update(|s| s.set_senate(SenateMap::new()));

        let read = cell.read();
        assert!(read.senate.is_some_and(|s| Arc::ptr_eq(&s, &senate)));
        assert!(read.house.is_none());
    }
}
