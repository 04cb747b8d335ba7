//! Drives [`OverlayState`] from map events and backend calls.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use green_cover_client::SectorApi;
use green_cover_sector_models::{SectorId, SectorRecord};

use crate::popup::SectorPopup;
use crate::state::{LoadOutcome, MapProjection, OverlayState, SelectionOutcome};

/// Owns the overlay state and the backend it loads from.
///
/// The state lock is never held across a backend call. Loads may overlap;
/// each takes a token from the state and only the newest one is applied.
pub struct OverlayController<A> {
    api: A,
    state: RwLock<OverlayState>,
}

impl<A: SectorApi> OverlayController<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: RwLock::new(OverlayState::new()),
        }
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    fn read(&self) -> RwLockReadGuard<'_, OverlayState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, OverlayState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handles the map ready signal. The first signal starts the initial
    /// load and returns its outcome; later signals return `None`.
    pub async fn map_ready(&self) -> Option<LoadOutcome> {
        let first = self.write().mark_ready();
        if !first {
            log::debug!("Ignoring repeated map ready signal");
            return None;
        }
        log::info!("Map ready, loading all sectors");
        Some(self.load().await)
    }

    /// Fetches every sector and installs the result if no newer load has
    /// started in the meantime.
    pub async fn load(&self) -> LoadOutcome {
        let token = {
            let mut state = self.write();
            if !state.is_ready() {
                return LoadOutcome::NotReady;
            }
            state.begin_load()
        };

        let mut pending = PendingLoad {
            state: &self.state,
            token,
            finished: false,
        };
        let result = self.api.all_sectors().await;
        pending.finished = true;

        self.write().complete_load(token, result, Utc::now())
    }

    /// Clears the backend cache, then reloads. A failed cache clear is
    /// reported and no load is issued.
    pub async fn refresh(&self) -> LoadOutcome {
        let ready = self.read().is_ready();
        if !ready {
            return LoadOutcome::NotReady;
        }

        if let Err(e) = self.api.clear_cache().await {
            log::error!("Failed to clear backend cache: {e}");
            let message = e.user_message();
            self.write().refresh_failed(&e, Utc::now());
            return LoadOutcome::Failed { message };
        }

        self.load().await
    }

    pub fn select(&self, sector: SectorId) -> SelectionOutcome {
        self.write().focus(sector)
    }

    #[must_use]
    pub fn popup_at(&self, lng: f64, lat: f64) -> Option<SectorPopup> {
        self.read().popup_at(lng, lat)
    }

    #[must_use]
    pub fn projection(&self) -> MapProjection {
        self.projection_at(Utc::now())
    }

    #[must_use]
    pub fn projection_at(&self, now: DateTime<Utc>) -> MapProjection {
        self.read().project(now)
    }

    /// Per-sector records of the installed overlay.
    #[must_use]
    pub fn stats(&self) -> Vec<SectorRecord> {
        self.read().stats()
    }
}

/// Abandons its load in the state if dropped before the fetch returns.
struct PendingLoad<'a> {
    state: &'a RwLock<OverlayState>,
    token: u64,
    finished: bool,
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .abandon_load(self.token, Utc::now());
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use super::fake::FakeApi;
    use super::*;
    use crate::state::fixtures::response;
    use crate::state::{LOADING_MESSAGE, LoadStatus, REFRESH_FAILED_MESSAGE};

    #[tokio::test]
    async fn load_before_ready_is_refused() {
        let (api, _started) = FakeApi::new();
        let controller = OverlayController::new(api);

        assert_eq!(controller.load().await, LoadOutcome::NotReady);
        assert_eq!(controller.refresh().await, LoadOutcome::NotReady);
        assert_eq!(controller.api().all_sectors_calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.api().clear_cache_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn only_first_ready_signal_loads() {
        let (api, _started) = FakeApi::new();
        api.respond(Ok(response(&[(1, 30.0), (2, 60.0)])));
        let controller = OverlayController::new(api);

        let first = controller.map_ready().await;
        let second = controller.map_ready().await;

        assert_eq!(first, Some(LoadOutcome::Applied { sectors: 2 }));
        assert_eq!(second, None);
        assert_eq!(controller.api().all_sectors_calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.stats().len(), 2);
    }

    #[tokio::test]
    async fn stale_load_finishing_last_is_discarded() {
        let (api, mut started) = FakeApi::new();
        let release_old = api.expect_load();
        let release_new = api.expect_load();
        let controller = Arc::new(OverlayController::new(api));

        let old = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.map_ready().await }
        });
        assert_eq!(started.recv().await, Some(0));

        let new = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.load().await }
        });
        assert_eq!(started.recv().await, Some(1));

        release_new.send(Ok(response(&[(5, 70.0)]))).unwrap();
        assert_eq!(new.await.unwrap(), LoadOutcome::Applied { sectors: 1 });

        release_old
            .send(Ok(response(&[(1, 10.0), (2, 20.0)])))
            .unwrap();
        assert!(matches!(
            old.await.unwrap(),
            Some(LoadOutcome::Superseded { token: 1, latest: 2 })
        ));

        let stats = controller.stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].sector.number(), 5);
    }

    #[tokio::test]
    async fn loading_message_visible_while_fetch_pending() {
        let (api, mut started) = FakeApi::new();
        let release = api.expect_load();
        let controller = Arc::new(OverlayController::new(api));

        let initial = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.map_ready().await }
        });
        assert_eq!(started.recv().await, Some(0));

        let pending = controller.projection();
        assert_eq!(pending.status, LoadStatus::Loading);
        assert_eq!(pending.message.unwrap().text, LOADING_MESSAGE);

        release.send(Ok(response(&[(7, 52.0)]))).unwrap();
        assert_eq!(
            initial.await.unwrap(),
            Some(LoadOutcome::Applied { sectors: 1 })
        );
        assert_eq!(controller.projection().status, LoadStatus::Loaded);
    }

    #[tokio::test]
    async fn dropped_load_does_not_stay_loading() {
        let (api, mut started) = FakeApi::new();
        let _never_released = api.expect_load();
        api.respond(Ok(response(&[(4, 55.0)])));
        let controller = Arc::new(OverlayController::new(api));

        let initial = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.map_ready().await }
        });
        assert_eq!(started.recv().await, Some(0));
        assert_eq!(controller.projection().status, LoadStatus::Loading);

        initial.abort();
        assert!(initial.await.unwrap_err().is_cancelled());

        assert_eq!(controller.projection().status, LoadStatus::Failed);
        assert_eq!(controller.refresh().await, LoadOutcome::Applied { sectors: 1 });
        assert_eq!(controller.projection().status, LoadStatus::Loaded);
    }

    #[tokio::test]
    async fn refresh_clears_cache_then_reloads() {
        let (api, _started) = FakeApi::new();
        api.respond(Ok(response(&[(1, 30.0)])));
        api.respond(Ok(response(&[(1, 30.0), (2, 80.0)])));
        let controller = OverlayController::new(api);
        controller.map_ready().await;

        let outcome = controller.refresh().await;

        assert_eq!(outcome, LoadOutcome::Applied { sectors: 2 });
        assert_eq!(controller.api().clear_cache_calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.api().all_sectors_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_overlay() {
        let (mut api, _started) = FakeApi::new();
        api.fail_clear_cache = true;
        api.respond(Ok(response(&[(3, 45.0)])));
        let controller = OverlayController::new(api);
        controller.map_ready().await;

        let outcome = controller.refresh().await;

        assert_eq!(
            outcome,
            LoadOutcome::Failed {
                message: "cache unavailable".to_string()
            }
        );
        assert_eq!(controller.api().all_sectors_calls.load(Ordering::SeqCst), 1);
        let projection = controller.projection();
        assert_eq!(projection.status, LoadStatus::Loaded);
        assert_eq!(projection.sector_count, 1);
        assert!(
            projection
                .message
                .unwrap()
                .text
                .starts_with(REFRESH_FAILED_MESSAGE)
        );
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_overlay() {
        let (api, _started) = FakeApi::new();
        api.respond(Ok(response(&[(3, 45.0)])));
        api.respond(Err(green_cover_client::ClientError::Decode {
            message: "truncated".to_string(),
        }));
        let controller = OverlayController::new(api);
        controller.map_ready().await;

        let outcome = controller.refresh().await;

        assert!(matches!(outcome, LoadOutcome::Failed { .. }));
        let projection = controller.projection();
        assert_eq!(projection.status, LoadStatus::Failed);
        assert_eq!(projection.layers.len(), 2);
        assert_eq!(controller.stats()[0].sector.number(), 3);
    }

    #[tokio::test]
    async fn selection_and_popup_after_load() {
        let (api, _started) = FakeApi::new();
        api.respond(Ok(response(&[(1, 30.0), (2, 60.0)])));
        let controller = OverlayController::new(api);

        let sector = SectorId::new(2).unwrap();
        assert_eq!(controller.select(sector), SelectionOutcome::NotReady);

        controller.map_ready().await;

        assert!(matches!(
            controller.select(sector),
            SelectionOutcome::Focused { .. }
        ));
        assert_eq!(
            controller.select(SectorId::new(9).unwrap()),
            SelectionOutcome::Missed
        );
        assert_eq!(controller.popup_at(0.5, 0.5).unwrap().name, "Sector 1");
    }
}
