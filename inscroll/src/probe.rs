//! Caret height measurement through a hidden probe field.
//!
//! To find how far down a multiline field the caret sits, the text before the
//! caret is rendered in an invisible, non-editable field of the same width and
//! its laid-out height is read back. The host does the rendering in response to
//! [`Effect::ShowProbe`] and reports layout through
//! [`CaretProbe::report`]. Layout reports come in bursts while the field
//! settles (worse on devices with many lines), so they are debounced and only
//! the last height counts.
//!
//! Only one probe is ever in flight. Starting a new one drops the previous
//! completion, so its [`Measurement`] resolves to [`ProbeError::Superseded`]
//! instead of a height for text that is no longer current.

use crate::{
    config::MeasureStyle,
    effects::Effect,
    scheduler::{Debouncer, Scheduler, TaskId},
};
use futures::channel::oneshot;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// A newer measurement replaced this one before it resolved.
    #[error("Caret measurement superseded by a newer request")]
    Superseded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProbeId(u64);

/// Pending caret height; resolves once the probe layout settles.
#[derive(Debug)]
#[must_use = "a measurement does nothing unless polled or taken"]
pub struct Measurement {
    id: ProbeId,
    receiver: oneshot::Receiver<f32>,
}

impl Measurement {
    pub fn id(&self) -> ProbeId {
        self.id
    }

    /// Non-blocking check: `Ok(None)` while the probe is still settling.
    pub fn try_take(&mut self) -> Result<Option<f32>, ProbeError> {
        self.receiver.try_recv().map_err(|_| ProbeError::Superseded)
    }
}

impl Future for Measurement {
    type Output = Result<f32, ProbeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| ProbeError::Superseded))
    }
}

#[derive(Debug)]
struct InFlight {
    id: ProbeId,
    sender: oneshot::Sender<f32>,
}

/// Owner of the hidden measuring field.
#[derive(Debug)]
pub struct CaretProbe {
    next_id: u64,
    style: Option<MeasureStyle>,
    in_flight: Option<InFlight>,
    settle: Debouncer<ProbeId, f32>,
}

impl CaretProbe {
    pub fn new(settle_ticks: u32, style: Option<MeasureStyle>) -> Self {
        Self {
            next_id: 0,
            style,
            in_flight: None,
            settle: Debouncer::new(settle_ticks),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<ProbeId> {
        self.in_flight.as_ref().map(|probe| probe.id)
    }

    /// Starts measuring the rendered height of `text` at `width`.
    ///
    /// Any probe still in flight is superseded.
    pub fn measure<T>(
        &mut self,
        text: &str,
        width: f32,
        scheduler: &mut Scheduler<T>,
        effects: &mut Vec<Effect>,
    ) -> Measurement {
        if let Some(previous) = self.in_flight.take() {
            self.settle.cancel(previous.id, scheduler);
            tracing::debug!(probe = previous.id.0, "Superseding caret measurement");
        }

        let id = ProbeId(self.next_id);
        self.next_id += 1;
        let (sender, receiver) = oneshot::channel();
        self.in_flight = Some(InFlight { id, sender });

        effects.push(Effect::ShowProbe {
            text: text.to_string(),
            width,
            style: self.style.clone(),
        });
        Measurement { id, receiver }
    }

    /// Feeds one layout report from the hidden field.
    ///
    /// `settle_task` builds the scheduler entry that must later be handed back
    /// to [`CaretProbe::settle`]. Reports with nothing in flight are ignored.
    pub fn report<T>(
        &mut self,
        height: f32,
        scheduler: &mut Scheduler<T>,
        settle_task: impl FnOnce(ProbeId) -> T,
    ) -> bool {
        let Some(id) = self.in_flight() else {
            tracing::trace!(height, "Probe layout with no measurement in flight");
            return false;
        };
        self.settle.trigger(id, height, scheduler, settle_task(id));
        true
    }

    /// Resolves the in-flight measurement once its layout has settled.
    ///
    /// Returns the resolved height, or `None` when `task` is stale.
    pub fn settle(
        &mut self,
        probe: ProbeId,
        task: TaskId,
        effects: &mut Vec<Effect>,
    ) -> Option<f32> {
        let height = self.settle.take(probe, task)?;
        if self.in_flight() != Some(probe) {
            return None;
        }
        let in_flight = self.in_flight.take()?;
        // The receiver may already be gone; the probe still has to be hidden.
        let _ = in_flight.sender.send(height);
        effects.push(Effect::HideProbe);
        tracing::trace!(probe = probe.0, height, "Caret measurement settled");
        Some(height)
    }

    /// Abandons the in-flight measurement, if any, and hides the probe.
    pub fn cancel<T>(&mut self, scheduler: &mut Scheduler<T>, effects: &mut Vec<Effect>) {
        if let Some(in_flight) = self.in_flight.take() {
            self.settle.cancel(in_flight.id, scheduler);
            effects.push(Effect::HideProbe);
        }
    }
}
