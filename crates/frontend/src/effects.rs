use std::time::Duration;

use dioxus::dioxus_core::Task;
use dioxus::prelude::*;
use forecast360_shared::geo::LatLng;
use forecast360_shared::viewport::{AnimationId, TimerId};
use forecast360_shared::{Dashboard, ViewportEffect};
use gloo_timers::future::TimeoutFuture;

/// Interval between animation frames, in milliseconds.
const FRAME_MS: u32 = 16;

/// What the map currently shows. Mid-flight this is an interpolated position
/// the controller never sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: LatLng,
    pub zoom: f64,
}

impl Camera {
    /// Point `t` (0..=1) of the way from `self` to `target`.
    pub fn interpolate(self, target: Camera, t: f64) -> Camera {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        Camera {
            center: LatLng::new(
                lerp(self.center.lat, target.center.lat),
                lerp(self.center.lon, target.center.lon),
            ),
            zoom: lerp(self.zoom, target.zoom),
        }
    }
}

/// Smoothstep easing for fly-to animations.
pub fn ease(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Number of frames a flight of `duration` is split into (at least one).
pub fn frame_count(duration: Duration) -> u32 {
    let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    (ms / FRAME_MS).max(1)
}

/// Executes viewport effects with cancellable tasks: one slot for the
/// running flight, one for the armed timer.
#[derive(Clone, Copy, PartialEq)]
pub struct ViewportRunner {
    pub dashboard: Signal<Dashboard>,
    pub camera: Signal<Camera>,
    flight: Signal<Option<Task>>,
    timer: Signal<Option<(TimerId, Task)>>,
}

pub fn use_viewport_runner(dashboard: Signal<Dashboard>) -> ViewportRunner {
    let camera = use_signal(|| {
        let dashboard = dashboard.peek();
        let viewport = dashboard.viewport();
        Camera {
            center: viewport.center(),
            zoom: viewport.zoom(),
        }
    });
    let flight = use_signal(|| None::<Task>);
    let timer = use_signal(|| None::<(TimerId, Task)>);
    ViewportRunner {
        dashboard,
        camera,
        flight,
        timer,
    }
}

impl ViewportRunner {
    pub fn run(mut self, effects: Vec<ViewportEffect>) {
        for effect in effects {
            match effect {
                ViewportEffect::FlyTo {
                    animation,
                    center,
                    zoom,
                    duration,
                } => self.fly(animation, Camera { center, zoom }, duration),
                ViewportEffect::JumpTo { center, zoom } => {
                    self.stop_flight();
                    self.camera.set(Camera { center, zoom });
                }
                ViewportEffect::ArmTimer { timer, delay } => self.arm(timer, delay),
                ViewportEffect::CancelTimer { timer } => self.cancel(timer),
            }
        }
    }

    /// Abort the running animation, leaving the camera where it is.
    pub fn stop_flight(&mut self) {
        if let Some(task) = self.flight.write().take() {
            task.cancel();
        }
    }

    fn fly(&mut self, animation: AnimationId, target: Camera, duration: Duration) {
        self.stop_flight();
        let start = *self.camera.peek();
        let frames = frame_count(duration);
        let mut runner = *self;
        let task = spawn(async move {
            for frame in 1..=frames {
                TimeoutFuture::new(FRAME_MS).await;
                let t = ease(f64::from(frame) / f64::from(frames));
                runner.camera.set(start.interpolate(target, t));
            }
            runner.flight.set(None);
            if !runner.dashboard.write().on_animation_finished(animation) {
                tracing::debug!(?animation, "finished flight was already superseded");
            }
        });
        self.flight.set(Some(task));
    }

    fn arm(&mut self, timer: TimerId, delay: Duration) {
        // The controller cancels before re-arming; this only guards the slot.
        if let Some((_, task)) = self.timer.write().take() {
            task.cancel();
        }
        let ms = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let mut runner = *self;
        let task = spawn(async move {
            TimeoutFuture::new(ms).await;
            let ours = matches!(*runner.timer.peek(), Some((id, _)) if id == timer);
            if ours {
                runner.timer.set(None);
            }
            let effects = runner.dashboard.write().on_timer_fired(timer);
            runner.run(effects);
        });
        self.timer.set(Some((timer, task)));
    }

    fn cancel(&mut self, timer: TimerId) {
        let armed = matches!(*self.timer.peek(), Some((id, _)) if id == timer);
        if armed {
            if let Some((_, task)) = self.timer.write().take() {
                task.cancel();
            }
        }
    }
}
