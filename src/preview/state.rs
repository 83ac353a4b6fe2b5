//! Pure preview synchronization state machine.
//!
//! `SyncState::transition` maps (state, event) to (state, effects) without
//! touching timers or the network, so every debounce and supersession rule
//! can be tested without a runtime. [`super::PreviewSynchronizer`] executes
//! the effects.
//!
//! # Rules
//!
//! - Every input change schedules a debounce; a newer change replaces it.
//! - An input whose plan the displayed raster already satisfies schedules
//!   nothing, and cancels any pending debounce and in-flight render.
//! - At most one render is in flight; starting one cancels the previous one.
//! - Responses carry their request id; only the current id is applied.

use bytes::Bytes;

use crate::backend::{Document, PageModifiers, RenderRequest};

/// What the displayed raster contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    /// No watermark baked in; a single instance is drawn locally on top
    Clean,
    /// Placements (or removals) applied by the engine
    Watermarked,
}

/// Everything needed to render one preview.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub document: Document,
    pub page_index: usize,
    pub mode: PreviewMode,
    pub request: RenderRequest,
}

impl RenderPlan {
    /// The page with nothing applied.
    pub fn clean(document: Document, page_index: usize) -> Self {
        Self {
            document,
            page_index,
            mode: PreviewMode::Clean,
            request: RenderRequest::new(PageModifiers::single_page(page_index, Vec::new())),
        }
    }

    pub fn watermarked(document: Document, page_index: usize, request: RenderRequest) -> Self {
        Self {
            document,
            page_index,
            mode: PreviewMode::Watermarked,
            request,
        }
    }

    /// Whether a raster rendered for `self` already shows what `other` asks for.
    pub fn satisfies(&self, other: &RenderPlan) -> bool {
        if self.document != other.document || self.page_index != other.page_index {
            return false;
        }
        match (self.mode, other.mode) {
            (PreviewMode::Clean, PreviewMode::Clean) => true,
            _ => self == other,
        }
    }
}

/// A rendered preview ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFrame {
    pub request_id: u64,
    pub document_id: u64,
    pub page_index: usize,
    pub mode: PreviewMode,
    pub image: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The plan derived from the current inputs changed
    InputChanged(RenderPlan),
    /// Render the latest plan now
    Retrigger,
    DebounceElapsed {
        ticket: u64,
    },
    RenderCompleted {
        request_id: u64,
        image: Bytes,
    },
    RenderFailed {
        request_id: u64,
        message: String,
    },
    RenderCancelled {
        request_id: u64,
    },
    DocumentClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEffect {
    /// Replace the debounce timer with one that fires `ticket`
    ScheduleDebounce { ticket: u64 },
    CancelDebounce,
    StartRender { request_id: u64, plan: RenderPlan },
    CancelRender { request_id: u64 },
    PublishFrame(PreviewFrame),
    ClearFrame,
    ReportFailure { request_id: u64, message: String },
}

#[derive(Debug, Clone, PartialEq)]
struct InFlight {
    request_id: u64,
    plan: RenderPlan,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    latest: Option<RenderPlan>,
    pending_ticket: Option<u64>,
    in_flight: Option<InFlight>,
    displayed: Option<RenderPlan>,
    next_ticket: u64,
    next_request_id: u64,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_plan(&self) -> Option<&RenderPlan> {
        self.latest.as_ref()
    }

    /// Plan of the raster currently on screen.
    pub fn displayed_plan(&self) -> Option<&RenderPlan> {
        self.displayed.as_ref()
    }

    pub fn is_debouncing(&self) -> bool {
        self.pending_ticket.is_some()
    }

    pub fn in_flight_request(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|f| f.request_id)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn transition(mut self, event: SyncEvent) -> (Self, Vec<SyncEffect>) {
        let mut effects = Vec::new();

        match event {
            SyncEvent::InputChanged(plan) => {
                let satisfied = self.displayed.as_ref().is_some_and(|d| d.satisfies(&plan));
                let already_requested = self.in_flight.as_ref().is_some_and(|f| f.plan == plan);
                self.latest = Some(plan);

                if satisfied {
                    self.cancel_debounce(&mut effects);
                    self.cancel_render(&mut effects);
                } else if already_requested {
                    self.cancel_debounce(&mut effects);
                } else {
                    self.next_ticket += 1;
                    self.pending_ticket = Some(self.next_ticket);
                    effects.push(SyncEffect::ScheduleDebounce {
                        ticket: self.next_ticket,
                    });
                }
            }

            SyncEvent::DebounceElapsed { ticket } => {
                if self.pending_ticket == Some(ticket) {
                    self.pending_ticket = None;
                    self.start_render(&mut effects);
                }
            }

            SyncEvent::Retrigger => {
                if self.latest.is_some() {
                    self.cancel_debounce(&mut effects);
                    self.start_render(&mut effects);
                }
            }

            SyncEvent::RenderCompleted { request_id, image } => {
                if let Some(flight) = self.take_in_flight(request_id) {
                    effects.push(SyncEffect::PublishFrame(PreviewFrame {
                        request_id,
                        document_id: flight.plan.document.id(),
                        page_index: flight.plan.page_index,
                        mode: flight.plan.mode,
                        image,
                    }));
                    self.displayed = Some(flight.plan);
                }
            }

            SyncEvent::RenderFailed {
                request_id,
                message,
            } => {
                if self.take_in_flight(request_id).is_some() {
                    effects.push(SyncEffect::ReportFailure {
                        request_id,
                        message,
                    });
                }
            }

            SyncEvent::RenderCancelled { request_id } => {
                self.take_in_flight(request_id);
            }

            SyncEvent::DocumentClosed => {
                self.cancel_debounce(&mut effects);
                self.cancel_render(&mut effects);
                self.latest = None;
                if self.displayed.take().is_some() {
                    effects.push(SyncEffect::ClearFrame);
                }
            }
        }

        (self, effects)
    }

    fn start_render(&mut self, effects: &mut Vec<SyncEffect>) {
        let Some(plan) = self.latest.clone() else {
            return;
        };
        self.cancel_render(effects);
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.in_flight = Some(InFlight {
            request_id,
            plan: plan.clone(),
        });
        effects.push(SyncEffect::StartRender { request_id, plan });
    }

    fn cancel_debounce(&mut self, effects: &mut Vec<SyncEffect>) {
        if self.pending_ticket.take().is_some() {
            effects.push(SyncEffect::CancelDebounce);
        }
    }

    fn cancel_render(&mut self, effects: &mut Vec<SyncEffect>) {
        if let Some(flight) = self.in_flight.take() {
            effects.push(SyncEffect::CancelRender {
                request_id: flight.request_id,
            });
        }
    }

    fn take_in_flight(&mut self, request_id: u64) -> Option<InFlight> {
        match &self.in_flight {
            Some(f) if f.request_id == request_id => self.in_flight.take(),
            _ => None,
        }
    }
}
