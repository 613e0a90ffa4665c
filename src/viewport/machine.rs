//! Viewport state machine: immediate gestures and animated fly-to transitions
//!
//! ```text
//! Idle --gesture--> Idle
//! Idle --fly_to--> Transitioning --tick--> Transitioning
//!                  Transitioning --tick (elapsed >= duration)--> Idle
//!                  Transitioning --fly_to / gesture--> Transitioning / Idle
//! ```

use std::time::{Duration, Instant};

use log::debug;
use serde::{Deserialize, Serialize};

use super::easing::{Easing, FlyToPath};
use super::state::{ViewportLimits, ViewportState};
use crate::cluster::point::{LngLat, Point, wrap_longitude};
use crate::cluster::projection::{project, unproject};
use crate::error::{GeoClusterError, Result};

/// Discrete input from the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Drag of the map surface in screen pixels; the content follows the
    /// pointer, so the centre moves the opposite way
    Pan { dx: f64, dy: f64 },
    /// Zoom change around the viewport centre
    Zoom { delta: f64 },
    /// Bearing and pitch changes in degrees
    Rotate { bearing_delta: f64, pitch_delta: f64 },
}

/// Camera a fly-to transition ends at; pitch and bearing are kept when `None`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: Option<f64>,
    pub bearing: Option<f64>,
}

impl CameraTarget {
    pub fn new(center: LngLat, zoom: f64) -> Self {
        CameraTarget {
            center,
            zoom,
            pitch: None,
            bearing: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.center.is_finite() {
            return Err(GeoClusterError::InvalidTarget(format!(
                "center ({}, {}) is not finite",
                self.center.lon, self.center.lat
            )));
        }
        if !(-90.0..=90.0).contains(&self.center.lat) {
            return Err(GeoClusterError::InvalidTarget(format!(
                "latitude {} is out of range",
                self.center.lat
            )));
        }
        if !self.zoom.is_finite() {
            return Err(GeoClusterError::InvalidTarget(format!(
                "zoom {} is not finite",
                self.zoom
            )));
        }
        for (name, value) in [("pitch", self.pitch), ("bearing", self.bearing)] {
            if let Some(v) = value
                && !v.is_finite()
            {
                return Err(GeoClusterError::InvalidTarget(format!(
                    "{name} {v} is not finite"
                )));
            }
        }
        Ok(())
    }
}

/// How long a fly-to transition takes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransitionDuration {
    Fixed(Duration),
    /// Derived from the path length: `1000 * S / speed` milliseconds
    Auto { speed: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyToOptions {
    pub duration: TransitionDuration,
    pub easing: Easing,
    /// Zoom-out curvature of the path (rho)
    pub curve: f64,
}

impl Default for FlyToOptions {
    fn default() -> Self {
        FlyToOptions {
            duration: TransitionDuration::Auto { speed: 2.0 },
            easing: Easing::Mapbox,
            curve: 1.414,
        }
    }
}

/// Phase of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Transitioning,
}

#[derive(Debug, Clone)]
struct Transition {
    from: ViewportState,
    to: ViewportState,
    path: FlyToPath,
    easing: Easing,
    started: Instant,
    duration: Duration,
}

/// ViewportMachine owns the camera and is its only writer
///
/// Every change bumps [`generation`](ViewportMachine::generation) so cluster
/// results computed for an older camera can be recognised and dropped.
#[derive(Debug, Clone)]
pub struct ViewportMachine {
    state: ViewportState,
    limits: ViewportLimits,
    transition: Option<Transition>,
    generation: u64,
}

impl ViewportMachine {
    pub fn new(initial: ViewportState, limits: ViewportLimits) -> Self {
        ViewportMachine {
            state: initial.clamped(&limits),
            limits,
            transition: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn limits(&self) -> &ViewportLimits {
        &self.limits
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        if self.transition.is_some() {
            Phase::Transitioning
        } else {
            Phase::Idle
        }
    }

    /// Camera the active transition ends at
    pub fn target(&self) -> Option<&ViewportState> {
        self.transition.as_ref().map(|t| &t.to)
    }

    fn set_state(&mut self, state: ViewportState) {
        self.state = state.clamped(&self.limits);
        self.generation += 1;
    }

    /// Drops the active transition, leaving the camera where it is
    pub fn cancel(&mut self) -> bool {
        match self.transition.take() {
            Some(t) => {
                debug!("Cancelled transition to zoom {:.2}", t.to.zoom);
                true
            }
            None => false,
        }
    }

    /// Map surface was resized
    pub fn resize(&mut self, width: f64, height: f64) {
        let mut state = self.state;
        state.width = width;
        state.height = height;
        if let Some(t) = &mut self.transition {
            for s in [&mut t.from, &mut t.to] {
                s.width = width;
                s.height = height;
            }
        }
        self.set_state(state);
    }

    /// Applies a gesture immediately, cancelling any transition
    ///
    /// # Errors
    ///
    /// Returns `InvalidGesture` for non-finite deltas; the camera is unchanged.
    pub fn apply_gesture(&mut self, gesture: Gesture) -> Result<()> {
        let mut state = self.state;
        match gesture {
            Gesture::Pan { dx, dy } => {
                if !dx.is_finite() || !dy.is_finite() {
                    return Err(GeoClusterError::InvalidGesture(format!(
                        "pan by ({dx}, {dy})"
                    )));
                }
                let scale = state.world_size();
                let center = project(state.center);
                state.center = unproject(&Point([
                    center.0[0] - dx / scale,
                    (center.0[1] - dy / scale).clamp(0.0, 1.0),
                ]));
            }
            Gesture::Zoom { delta } => {
                if !delta.is_finite() {
                    return Err(GeoClusterError::InvalidGesture(format!("zoom by {delta}")));
                }
                state.zoom += delta;
            }
            Gesture::Rotate {
                bearing_delta,
                pitch_delta,
            } => {
                if !bearing_delta.is_finite() || !pitch_delta.is_finite() {
                    return Err(GeoClusterError::InvalidGesture(format!(
                        "rotate by ({bearing_delta}, {pitch_delta})"
                    )));
                }
                state.bearing += bearing_delta;
                state.pitch += pitch_delta;
            }
        }

        self.cancel();
        self.set_state(state);
        Ok(())
    }

    /// Starts an animated transition towards `target`
    ///
    /// An out of range target zoom is clamped. A transition already in flight
    /// is superseded. A zero duration moves the camera at once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for non-finite values or a latitude outside
    /// `[-90, 90]`, and for a non-positive `Auto` speed; the camera is unchanged.
    pub fn fly_to(
        &mut self,
        target: CameraTarget,
        options: &FlyToOptions,
        now: Instant,
    ) -> Result<Phase> {
        target.validate()?;
        if !options.curve.is_finite() || options.curve <= 0.0 {
            return Err(GeoClusterError::InvalidTarget(format!(
                "curve {} must be positive",
                options.curve
            )));
        }

        let from = self.state;
        let to = ViewportState {
            center: target.center,
            zoom: target.zoom,
            pitch: target.pitch.unwrap_or(from.pitch),
            bearing: target.bearing.unwrap_or(from.bearing),
            ..from
        }
        .clamped(&self.limits);

        let path = FlyToPath::new(
            from.center,
            from.zoom,
            to.center,
            to.zoom,
            options.curve,
            from.width,
            from.height,
        );
        let duration = match options.duration {
            TransitionDuration::Fixed(d) => d,
            TransitionDuration::Auto { speed } => {
                if !speed.is_finite() || speed <= 0.0 {
                    return Err(GeoClusterError::InvalidTarget(format!(
                        "speed {speed} must be positive"
                    )));
                }
                Duration::try_from_secs_f64(path.length() / speed).unwrap_or(Duration::ZERO)
            }
        };

        self.cancel();

        if duration.is_zero() {
            self.set_state(to);
            return Ok(Phase::Idle);
        }

        debug!(
            "Flying from zoom {:.2} to {:.2} over {:?}",
            from.zoom, to.zoom, duration
        );
        self.transition = Some(Transition {
            from,
            to,
            path,
            easing: options.easing,
            started: now,
            duration,
        });
        self.generation += 1;
        Ok(Phase::Transitioning)
    }

    /// Advances the active transition to `now`
    ///
    /// Once the duration has elapsed the camera snaps exactly to the target.
    pub fn tick(&mut self, now: Instant) -> Phase {
        let Some(transition) = &self.transition else {
            return Phase::Idle;
        };

        let elapsed = now.saturating_duration_since(transition.started);
        if elapsed >= transition.duration {
            let to = transition.to;
            self.transition = None;
            self.set_state(to);
            debug!("Arrived at zoom {:.2}", to.zoom);
            return Phase::Idle;
        }

        let t = transition
            .easing
            .apply(elapsed.as_secs_f64() / transition.duration.as_secs_f64());
        let (center, zoom) = transition.path.at(t);
        let (from, to) = (transition.from, transition.to);
        let state = ViewportState {
            center,
            zoom,
            pitch: from.pitch + (to.pitch - from.pitch) * t,
            bearing: from.bearing + shortest_turn(from.bearing, to.bearing) * t,
            ..from
        };
        self.set_state(state);
        Phase::Transitioning
    }
}

/// Signed turn in degrees from bearing `a` to bearing `b` along the shorter arc
fn shortest_turn(a: f64, b: f64) -> f64 {
    wrap_longitude(b - a)
}
