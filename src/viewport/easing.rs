//! Easing curves and the fly-to camera path
//!
//! The fly-to path follows van Wijk & Nuij, "Smooth and efficient zooming and
//! panning" (2003): the camera zooms out, travels and zooms back in along the
//! path that is shortest in perceived screen movement.

use serde::{Deserialize, Serialize};

use crate::cluster::point::{LngLat, Point};
use crate::cluster::projection::{project, unproject, world_size};

/// Maps a linear time fraction in `[0, 1]` to an animation progress fraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    EaseOutCubic,
    EaseInOutCubic,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1)`, the default camera easing of web maps
    #[default]
    Mapbox,
}

impl Easing {
    /// Eases `t`; the result is exactly 0 at `t <= 0` and exactly 1 at `t >= 1`
    pub fn apply(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Mapbox => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
        }
    }
}

/// Solves the CSS cubic-bezier timing function with control points
/// `(p1x, p1y)` and `(p2x, p2y)` for progress at time `t`
fn cubic_bezier(p1x: f64, p1y: f64, p2x: f64, p2y: f64, t: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    let cx = 3.0 * p1x;
    let bx = 3.0 * (p2x - p1x) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * p1y;
    let by = 3.0 * (p2y - p1y) - cy;
    let ay = 1.0 - cy - by;

    let sample_x = |s: f64| ((ax * s + bx) * s + cx) * s;
    let sample_y = |s: f64| ((ay * s + by) * s + cy) * s;
    let slope_x = |s: f64| (3.0 * ax * s + 2.0 * bx) * s + cx;

    // Newton's method first, it converges in a few steps for sane curves
    let mut s = t;
    for _ in 0..8 {
        let x = sample_x(s) - t;
        if x.abs() < EPSILON {
            return sample_y(s);
        }
        let d = slope_x(s);
        if d.abs() < 1e-6 {
            break;
        }
        s -= x / d;
    }

    // Fall back to bisection
    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..64 {
        let x = sample_x(s);
        if (x - t).abs() < EPSILON {
            break;
        }
        if t > x {
            lo = s;
        } else {
            hi = s;
        }
        s = (hi - lo) / 2.0 + lo;
    }
    sample_y(s)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathShape {
    /// Zoom out, pan, zoom in
    Curved { r0: f64, u1: f64 },
    /// Centres coincide, only the zoom changes; `k` is the zoom direction
    ZoomOnly { k: f64 },
    /// Nothing to animate along the curve
    Still,
}

/// Camera path of a fly-to transition between two centres and zooms
#[derive(Debug, Clone, PartialEq)]
pub struct FlyToPath {
    from: Point,
    to: Point,
    start_zoom: f64,
    end_zoom: f64,
    rho: f64,
    w0: f64,
    length: f64,
    shape: PathShape,
}

impl FlyToPath {
    /// Plans the path for a `width` x `height` viewport
    ///
    /// `curve` (rho) trades zooming against panning; larger values zoom out
    /// further. 1.414 is the value the authors found most pleasing.
    pub fn new(
        start: LngLat,
        start_zoom: f64,
        end: LngLat,
        end_zoom: f64,
        curve: f64,
        width: f64,
        height: f64,
    ) -> Self {
        let from = project(start);
        let mut to = project(end);
        // Cross the antimeridian instead of going around the world
        if to.0[0] - from.0[0] > 0.5 {
            to.0[0] -= 1.0;
        } else if to.0[0] - from.0[0] < -0.5 {
            to.0[0] += 1.0;
        }
        let rho = curve;
        let rho2 = rho * rho;

        let w0 = width.max(height).max(1.0);
        let w1 = w0 / 2f64.powf(end_zoom - start_zoom);
        let u1 = from.sq_dist(&to).sqrt() * world_size(start_zoom);

        let mut path = FlyToPath {
            from,
            to,
            start_zoom,
            end_zoom,
            rho,
            w0,
            length: 0.0,
            shape: PathShape::Still,
        };

        let zoom_only = |path: &mut FlyToPath| {
            if (w0 - w1).abs() < 1e-6 {
                path.shape = PathShape::Still;
                path.length = 0.0;
            } else {
                path.shape = PathShape::ZoomOnly {
                    k: if w1 < w0 { -1.0 } else { 1.0 },
                };
                path.length = (w1 / w0).ln().abs() / rho;
            }
        };

        if u1 < 1e-6 {
            zoom_only(&mut path);
            return path;
        }

        let r = |end_side: bool| {
            let (sign, w) = if end_side { (-1.0, w1) } else { (1.0, w0) };
            let b = (w1 * w1 - w0 * w0 + sign * rho2 * rho2 * u1 * u1) / (2.0 * w * rho2 * u1);
            ((b * b + 1.0).sqrt() - b).ln()
        };
        let r0 = r(false);
        let length = (r(true) - r0) / rho;

        if length.is_finite() {
            path.shape = PathShape::Curved { r0, u1 };
            path.length = length;
        } else {
            zoom_only(&mut path);
        }
        path
    }

    /// Path length `S` in the units of the van Wijk model
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Centre and zoom at progress `t` in `[0, 1]`
    ///
    /// The longitude is not wrapped and leaves `[-180, 180]` on paths that
    /// cross the antimeridian.
    pub fn at(&self, t: f64) -> (LngLat, f64) {
        let s = t * self.length;
        let (w, u) = match self.shape {
            PathShape::Curved { r0, u1 } => {
                let w = r0.cosh() / (r0 + self.rho * s).cosh();
                let u = self.w0 * ((r0.cosh() * (r0 + self.rho * s).tanh() - r0.sinh()) / (self.rho * self.rho)) / u1;
                (w, u)
            }
            PathShape::ZoomOnly { k } => ((k * self.rho * s).exp(), t),
            PathShape::Still => {
                let zoom = self.start_zoom + (self.end_zoom - self.start_zoom) * t;
                return (self.center_at(t), zoom);
            }
        };
        (self.center_at(u), self.start_zoom - w.log2())
    }

    fn center_at(&self, u: f64) -> LngLat {
        unproject(&Point([
            self.from.0[0] + (self.to.0[0] - self.from.0[0]) * u,
            self.from.0[1] + (self.to.0[1] - self.from.0[1]) * u,
        ]))
    }
}
