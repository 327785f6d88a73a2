/// Brown-Conrady lens distortion, four radial and two tangential
/// coefficients, applied in normalized camera coordinates.
///
/// Forward-only: the engine never needs the analytic inverse, pixel
/// window queries against the point cloud stand in for unprojection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Distortion {
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub k4: f64,
    pub p1: f64,
    pub p2: f64,
}

impl Distortion {
    /// Apply distortion to normalized image coordinates
    pub fn distort(&self, x: f64, y: f64) -> (f64, f64) {
        let x2 = x * x;
        let y2 = y * y;
        let xy = x * y;
        let r2 = x2 + y2;

        // Radial factor in Horner form; the evaluation order is part
        // of the model's numerical contract
        let radial = 1.0 + r2 * (self.k1 + r2 * (self.k2 + r2 * (self.k3 + r2 * self.k4)));

        let x_dist = x * radial + 2.0 * self.p1 * xy + self.p2 * (r2 + 2.0 * x2);
        let y_dist = y * radial + self.p1 * (r2 + 2.0 * y2) + 2.0 * self.p2 * xy;

        (x_dist, y_dist)
    }
}
