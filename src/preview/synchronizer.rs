//! Tokio driver for the preview state machine.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::state::{PreviewFrame, RenderPlan, SyncEffect, SyncEvent, SyncState};
use crate::backend::RenderBackend;
use crate::config::PreviewConfig;

struct Driver {
    state: SyncState,
    debounce_task: Option<JoinHandle<()>>,
    render_task: Option<JoinHandle<()>>,
}

impl Driver {
    fn abort_debounce(&mut self) {
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
    }

    fn abort_render(&mut self) {
        if let Some(task) = self.render_task.take() {
            task.abort();
        }
    }
}

struct Shared<B> {
    backend: Arc<B>,
    debounce: Duration,
    driver: Mutex<Driver>,
    frames: watch::Sender<Option<PreviewFrame>>,
}

impl<B: RenderBackend + 'static> Shared<B> {
    fn dispatch(self: &Arc<Self>, event: SyncEvent) {
        let mut driver = self.driver.lock();
        let state = std::mem::take(&mut driver.state);
        let (state, effects) = state.transition(event);
        driver.state = state;

        for effect in effects {
            self.execute(&mut driver, effect);
        }
    }

    fn execute(self: &Arc<Self>, driver: &mut Driver, effect: SyncEffect) {
        match effect {
            SyncEffect::ScheduleDebounce { ticket } => {
                driver.abort_debounce();
                let weak = Arc::downgrade(self);
                let delay = self.debounce;
                driver.debounce_task = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    dispatch_weak(&weak, SyncEvent::DebounceElapsed { ticket });
                }));
            }
            SyncEffect::CancelDebounce => driver.abort_debounce(),
            SyncEffect::StartRender { request_id, plan } => {
                driver.abort_render();
                tracing::debug!(
                    request_id,
                    document = plan.document.id(),
                    page = plan.page_index,
                    mode = ?plan.mode,
                    elements = plan.request.modifiers.element_count(),
                    "Requesting preview render"
                );
                let weak = Arc::downgrade(self);
                let backend = self.backend.clone();
                driver.render_task = Some(tokio::spawn(async move {
                    let event = match backend
                        .preview(&plan.document, plan.page_index, &plan.request)
                        .await
                    {
                        Ok(image) => SyncEvent::RenderCompleted { request_id, image },
                        Err(e) if e.is_cancelled() => SyncEvent::RenderCancelled { request_id },
                        Err(e) => SyncEvent::RenderFailed {
                            request_id,
                            message: e.to_string(),
                        },
                    };
                    dispatch_weak(&weak, event);
                }));
            }
            SyncEffect::CancelRender { request_id } => {
                tracing::debug!(request_id, "Preview render superseded");
                driver.abort_render();
            }
            SyncEffect::PublishFrame(frame) => {
                tracing::debug!(
                    request_id = frame.request_id,
                    bytes = frame.image.len(),
                    "Preview frame ready"
                );
                self.frames.send_replace(Some(frame));
            }
            SyncEffect::ClearFrame => {
                self.frames.send_replace(None);
            }
            SyncEffect::ReportFailure {
                request_id,
                message,
            } => {
                tracing::warn!(request_id, error = %message, "Preview render failed");
            }
        }
    }
}

fn dispatch_weak<B: RenderBackend + 'static>(weak: &Weak<Shared<B>>, event: SyncEvent) {
    if let Some(shared) = weak.upgrade() {
        shared.dispatch(event);
    }
}

/// Keeps the preview raster in step with the user's inputs.
///
/// Must be used from within a tokio runtime. Dropping the synchronizer
/// aborts its pending debounce and in-flight render.
pub struct PreviewSynchronizer<B: RenderBackend + 'static> {
    shared: Arc<Shared<B>>,
}

impl<B: RenderBackend + 'static> PreviewSynchronizer<B> {
    pub fn new(backend: Arc<B>, debounce: Duration) -> Self {
        let (frames, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                backend,
                debounce,
                driver: Mutex::new(Driver {
                    state: SyncState::new(),
                    debounce_task: None,
                    render_task: None,
                }),
                frames,
            }),
        }
    }

    /// Synchronizer for the add-watermark tool, debounced by
    /// `preview.watermark_debounce_ms`.
    pub fn for_watermark(backend: Arc<B>, config: &PreviewConfig) -> Self {
        Self::new(backend, config.watermark_debounce())
    }

    /// Synchronizer for the remove-watermark tool, debounced by
    /// `preview.removal_debounce_ms`.
    pub fn for_removal(backend: Arc<B>, config: &PreviewConfig) -> Self {
        Self::new(backend, config.removal_debounce())
    }

    /// Receiver that observes every published frame.
    pub fn subscribe(&self) -> watch::Receiver<Option<PreviewFrame>> {
        self.shared.frames.subscribe()
    }

    pub fn current_frame(&self) -> Option<PreviewFrame> {
        self.shared.frames.borrow().clone()
    }

    /// Report the plan derived from the latest inputs.
    pub fn submit(&self, plan: RenderPlan) {
        self.shared.dispatch(SyncEvent::InputChanged(plan));
    }

    /// Render the latest plan now, skipping the debounce.
    pub fn retrigger(&self) {
        self.shared.dispatch(SyncEvent::Retrigger);
    }

    pub fn close_document(&self) {
        self.shared.dispatch(SyncEvent::DocumentClosed);
    }

    /// Submit `plan` and wait for the next published frame, allowing `limit`
    /// past the debounce. Returns `None` if nothing is published in time,
    /// which is also how a failed render surfaces.
    pub async fn render(&self, plan: RenderPlan, limit: Duration) -> Option<PreviewFrame> {
        let mut frames = self.subscribe();
        frames.borrow_and_update();
        self.submit(plan);

        let next = async {
            loop {
                frames.changed().await.ok()?;
                let frame = frames.borrow_and_update().clone();
                if frame.is_some() {
                    return frame;
                }
            }
        };
        tokio::time::timeout(self.debounce() + limit, next)
            .await
            .ok()
            .flatten()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.driver.lock().state.is_loading()
    }

    pub fn is_debouncing(&self) -> bool {
        self.shared.driver.lock().state.is_debouncing()
    }

    pub fn debounce(&self) -> Duration {
        self.shared.debounce
    }
}

impl<B: RenderBackend + 'static> Drop for PreviewSynchronizer<B> {
    fn drop(&mut self) {
        let mut driver = self.shared.driver.lock();
        driver.abort_debounce();
        driver.abort_render();
    }
}
