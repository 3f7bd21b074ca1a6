use anyhow::{bail, Context, Result};
use chrono::Local;
use std::sync::Arc;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;

use super::{render::DashboardView, state::DashboardState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

pub const POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Polls the backend on a fixed period and folds each pull into [`DashboardState`].
pub struct DashboardController {
    api: ApiClient,
    state: Arc<Mutex<DashboardState>>,
    view: Arc<dyn DashboardView>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl DashboardController {
    pub fn new(api: ApiClient, view: Arc<dyn DashboardView>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(DashboardState::new())),
            view,
            interval: POLL_INTERVAL,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    /// First poll happens immediately, then every interval.
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            bail!("dashboard polling already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            self.api.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.view),
            self.interval,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("dashboard poll task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}

async fn poll_loop(
    api: ApiClient,
    state: Arc<Mutex<DashboardState>>,
    view: Arc<dyn DashboardView>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    log_info!("dashboard polling {} every {}ms", api.base_url(), interval.as_millis());

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // An in-flight request is abandoned on teardown rather than
                // allowed to update state afterwards.
                tokio::select! {
                    _ = poll_once(&api, &state, view.as_ref()) => {}
                    _ = cancel_token.cancelled() => break,
                }
            }
            _ = cancel_token.cancelled() => break,
        }
    }

    log_info!("dashboard polling stopped");
}

/// One poll tick: fetch, fold, render.
pub async fn poll_once(api: &ApiClient, state: &Mutex<DashboardState>, view: &dyn DashboardView) {
    let result = api.try_fetch_student_states().await;
    if let Err(err) = &result {
        log_warn!("Teacher API error: {err}");
    }

    let mut guard = state.lock().await;
    guard.apply_poll_result(result, Local::now().time());
    log_debug!(
        "Teacher dashboard updated with timeline ({} students, {} tracked)",
        guard.students.len(),
        guard.timeline.tracked_students()
    );
    view.render(&guard);
}
