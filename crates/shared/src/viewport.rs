//! Camera state machine: fly-to animations, the hard pan wall, and the
//! delayed snap-back into the home region.
//!
//! The controller never touches a clock. Each operation returns the
//! [`ViewportEffect`]s the shell must perform; timer and animation callbacks
//! come back in through [`ViewportController::on_timer_fired`] and
//! [`ViewportController::on_animation_finished`], carrying the id they were
//! issued with so superseded ones can be ignored.
use std::time::Duration;

use crate::config::ViewportConfig;
use crate::error::ConfigError;
use crate::geo::{LatLng, LatLngBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Grace period after the user panned out of the home region.
    SnapBack,
    /// Delay between closing a panel and returning home.
    ReturnHome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub purpose: TimerPurpose,
}

/// Side effect requested from the map shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEffect {
    /// Animate the camera; report completion with `animation`.
    FlyTo {
        animation: AnimationId,
        center: LatLng,
        zoom: f64,
        duration: Duration,
    },
    /// Move the camera immediately (hard-wall correction).
    JumpTo { center: LatLng, zoom: f64 },
    /// Start a one-shot timer; report expiry with `timer`.
    ArmTimer { timer: TimerId, delay: Duration },
    CancelTimer { timer: TimerId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Flight {
    id: AnimationId,
    center: LatLng,
    zoom: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    config: ViewportConfig,
    center: LatLng,
    zoom: f64,
    last_valid_center: LatLng,
    // Single slot: arming always replaces (and cancels) the occupant.
    pending: Option<PendingTimer>,
    flight: Option<Flight>,
    next_timer: u64,
    next_animation: u64,
}

impl ViewportController {
    /// Place the camera at home and fix the constraints for the session.
    pub fn initialize(config: ViewportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(ViewportController {
            center: config.home_center,
            zoom: config.home_zoom,
            last_valid_center: config.home_center,
            config,
            pending: None,
            flight: None,
            next_timer: 0,
            next_animation: 0,
        })
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Center of the last completed camera state.
    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn last_valid_center(&self) -> LatLng {
        self.last_valid_center
    }

    pub fn pending_timer(&self) -> Option<PendingTimer> {
        self.pending
    }

    pub fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    /// Where the camera is headed: the in-flight target, else the current state.
    pub fn target(&self) -> (LatLng, f64) {
        match self.flight {
            Some(f) => (f.center, f.zoom),
            None => (self.center, self.zoom),
        }
    }

    /// Fly to `position`. Supersedes any in-flight animation and cancels a
    /// pending snap-back or return-home timer.
    pub fn focus_on(&mut self, position: LatLng, zoom: f64, duration: Duration) -> Vec<ViewportEffect> {
        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        let center = self.config.bounds.clamp(position);
        let zoom = self.config.clamp_zoom(zoom);
        effects.push(self.start_flight(center, zoom, duration));
        effects
    }

    /// Schedule the return home after `delay`; a later `focus_on` cancels it.
    pub fn release_focus(&mut self, delay: Duration) -> Vec<ViewportEffect> {
        let mut effects = Vec::new();
        self.arm(TimerPurpose::ReturnHome, delay, &mut effects);
        effects
    }

    /// A user pan or zoom finished with `visible` on screen.
    ///
    /// Centers beyond the hard bounds are clamped at once. Inside the bounds
    /// but outside the home region, a snap-back is armed for the grace
    /// period; coming back into the region before it fires cancels it.
    pub fn on_viewport_moved(&mut self, visible: LatLngBounds, zoom: f64) -> Vec<ViewportEffect> {
        let mut effects = Vec::new();
        let observed = visible.center();
        if !(observed.lat.is_finite() && observed.lon.is_finite()) {
            // A flight in progress lands at its target.
            if let Some(flight) = self.flight.take() {
                self.commit(flight);
            }
            effects.push(ViewportEffect::JumpTo {
                center: self.center,
                zoom: self.zoom,
            });
            return effects;
        }
        if let Some(flight) = self.flight.take() {
            tracing::debug!(animation = flight.id.0, "flight interrupted by user gesture");
        }

        let center = self.config.bounds.clamp(observed);
        let clamped_zoom = self.config.clamp_zoom(zoom);
        self.center = center;
        self.zoom = clamped_zoom;
        if center != observed || clamped_zoom != zoom {
            tracing::debug!(%observed, %center, "viewport clamped to hard bounds");
            effects.push(ViewportEffect::JumpTo {
                center,
                zoom: clamped_zoom,
            });
        }

        if self.config.home_region.contains(center) {
            self.last_valid_center = center;
            if self.pending_purpose() == Some(TimerPurpose::SnapBack) {
                tracing::debug!("back inside home region, snap-back cancelled");
                self.cancel_pending(&mut effects);
            }
        } else if self.pending_purpose() != Some(TimerPurpose::ReturnHome) {
            // A pending return-home already brings the camera back sooner.
            let grace = self.config.snap_back_grace();
            self.arm(TimerPurpose::SnapBack, grace, &mut effects);
        }
        effects
    }

    /// A timer armed by this controller expired.
    pub fn on_timer_fired(&mut self, timer: TimerId) -> Vec<ViewportEffect> {
        match self.pending {
            Some(p) if p.id == timer => {
                self.pending = None;
                tracing::debug!(timer = timer.0, purpose = ?p.purpose, "viewport timer fired");
                let (home, zoom) = (self.config.home_center, self.config.home_zoom);
                let duration = self.config.return_duration();
                vec![self.start_flight(home, zoom, duration)]
            }
            _ => {
                tracing::debug!(timer = timer.0, "ignoring superseded timer");
                Vec::new()
            }
        }
    }

    /// An animation finished. Returns whether it was still the current one.
    pub fn on_animation_finished(&mut self, animation: AnimationId) -> bool {
        match self.flight {
            Some(f) if f.id == animation => {
                self.flight = None;
                self.commit(f);
                true
            }
            _ => false,
        }
    }

    fn commit(&mut self, flight: Flight) {
        self.center = flight.center;
        self.zoom = flight.zoom;
        if self.config.home_region.contains(flight.center) {
            self.last_valid_center = flight.center;
        }
    }

    fn pending_purpose(&self) -> Option<TimerPurpose> {
        self.pending.map(|p| p.purpose)
    }

    fn cancel_pending(&mut self, effects: &mut Vec<ViewportEffect>) {
        if let Some(p) = self.pending.take() {
            effects.push(ViewportEffect::CancelTimer { timer: p.id });
        }
    }

    fn arm(&mut self, purpose: TimerPurpose, delay: Duration, effects: &mut Vec<ViewportEffect>) {
        self.cancel_pending(effects);
        self.next_timer += 1;
        let id = TimerId(self.next_timer);
        self.pending = Some(PendingTimer { id, purpose });
        tracing::debug!(timer = id.0, ?purpose, delay_ms = delay.as_millis() as u64, "viewport timer armed");
        effects.push(ViewportEffect::ArmTimer { timer: id, delay });
    }

    fn start_flight(&mut self, center: LatLng, zoom: f64, duration: Duration) -> ViewportEffect {
        self.next_animation += 1;
        let id = AnimationId(self.next_animation);
        self.flight = Some(Flight { id, center, zoom });
        ViewportEffect::FlyTo {
            animation: id,
            center,
            zoom,
            duration,
        }
    }
}
