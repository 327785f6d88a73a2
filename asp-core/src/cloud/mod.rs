//! Colored survey point cloud and its spatial queries
//!
//! Every query goes through [`Camera::project`] or the polygon
//! predicates; per-point anomalies (behind the camera, outside the
//! image, outside the window) are silently excluded from that query's
//! result and never abort the batch. An empty cloud is a valid input
//! everywhere and yields empty results.

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::mask::Mask;
use crate::polygon::Polygon;

/// Default half-width of a manual pixel-window crop
pub const CROP_WINDOW: f64 = 15.0;
/// Half-width of the window a ray cast aggregates over
pub const RAY_CAST_WINDOW: f64 = 5.0;
/// Default foreground fraction a point must exceed to survive a mask
/// crop
pub const MASK_VOTE_THRESHOLD: f64 = 0.8;

/// One survey point in the local ENU frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    pub position: Vector3<f64>,
    pub color: [u8; 3],
}

/// Reconstructed point cloud with per-point mask-vote accumulators.
///
/// The point array shrinks under the `filter_*` operations and never
/// grows after load. `vote` and `total` stay index-aligned with the
/// points through every filter; `vote[i] <= total[i]` always holds
/// and both only grow between filters.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    points: Vec<CloudPoint>,
    vote: Vec<u32>,
    total: Vec<u32>,
}

impl PointCloud {
    pub fn new(points: Vec<CloudPoint>) -> Self {
        let n = points.len();
        Self {
            points,
            vote: vec![0; n],
            total: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CloudPoint] {
        &self.points
    }

    pub fn vote(&self) -> &[u32] {
        &self.vote
    }

    pub fn total(&self) -> &[u32] {
        &self.total
    }

    /// Axis-aligned x/y bounds `(min_x, min_y, max_x, max_y)` of the
    /// current points, `None` when the cloud is empty
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.points.first()?.position;
        let mut bounds = (first.x, first.y, first.x, first.y);

        for p in &self.points[1..] {
            bounds.0 = bounds.0.min(p.position.x);
            bounds.1 = bounds.1.min(p.position.y);
            bounds.2 = bounds.2.max(p.position.x);
            bounds.3 = bounds.3.max(p.position.y);
        }
        Some(bounds)
    }

    fn project_all(&self, camera: &Camera) -> Vec<Option<(f64, f64)>> {
        self.points
            .par_iter()
            .map(|p| camera.project(&p.position))
            .collect()
    }

    /// Keep-mask for projections inside the half-open window
    /// `[u-h, u+h) x [v-h, v+h)` around `target`. Behind-camera
    /// points project to `None` and are excluded.
    fn window_mask(
        &self,
        camera: &Camera,
        target: (f64, f64),
        half_width: f64,
    ) -> Vec<bool> {
        self.project_all(camera)
            .iter()
            .map(|proj| match proj {
                Some((u, v)) => {
                    *u >= target.0 - half_width
                        && *u < target.0 + half_width
                        && *v >= target.1 - half_width
                        && *v < target.1 + half_width
                }
                None => false,
            })
            .collect()
    }

    /// Positions (no color) whose projection falls in the pixel
    /// window around `target`. Pure; the cloud is unchanged.
    pub fn select_pixel_window(
        &self,
        camera: &Camera,
        target: (f64, f64),
        half_width: f64,
    ) -> Vec<Vector3<f64>> {
        let keep = self.window_mask(camera, target, half_width);
        self.points
            .iter()
            .zip(&keep)
            .filter(|&(_, &k)| k)
            .map(|(p, _)| p.position)
            .collect()
    }

    /// In-place counterpart of [`select_pixel_window`]: replaces the
    /// point set (and its vote counters) with the window's contents.
    ///
    /// [`select_pixel_window`]: PointCloud::select_pixel_window
    pub fn filter_pixel_window(
        &mut self,
        camera: &Camera,
        target: (f64, f64),
        half_width: f64,
    ) {
        let keep = self.window_mask(camera, target, half_width);
        self.retain_by_mask(&keep);
    }

    /// Estimate the 3-D point under a viewing ray as the
    /// coordinate-wise median of the points projecting into a small
    /// window around `pixel`.
    ///
    /// `None` means the ray could not be resolved (no point projected
    /// into the window); callers must not treat that as a location.
    pub fn ray_cast(&self, camera: &Camera, pixel: (f64, f64)) -> Option<Vector3<f64>> {
        let cone = self.select_pixel_window(camera, pixel, RAY_CAST_WINDOW);
        if cone.is_empty() {
            return None;
        }

        Some(Vector3::new(
            median(cone.iter().map(|p| p.x).collect()),
            median(cone.iter().map(|p| p.y).collect()),
            median(cone.iter().map(|p| p.z).collect()),
        ))
    }

    /// Indices of points inside the polygon's axis-aligned bounds,
    /// narrowed by the exact even-odd containment test unless the
    /// cheap bbox approximation was asked for. The approximate result
    /// is always a superset of the exact one.
    pub fn select_polygon(&self, polygon: &Polygon, exact: bool) -> Vec<usize> {
        let Some((min_x, min_y, max_x, max_y)) = polygon.bounds() else {
            return Vec::new();
        };

        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                let (x, y) = (p.position.x, p.position.y);
                if x <= min_x || x >= max_x || y <= min_y || y >= max_y {
                    return false;
                }
                !exact || polygon.contains(x, y)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// In-place counterpart of [`select_polygon`]
    ///
    /// [`select_polygon`]: PointCloud::select_polygon
    pub fn filter_polygon(&mut self, polygon: &Polygon, exact: bool) {
        let selected = self.select_polygon(polygon, exact);
        let mut keep = vec![false; self.points.len()];
        for i in selected {
            keep[i] = true;
        }
        self.retain_by_mask(&keep);
    }

    /// Record one camera view's worth of mask evidence.
    ///
    /// Each point projecting inside the mask counts toward
    /// `total[i]`, and toward `vote[i]` when the nearest pixel is
    /// foreground. Points behind the camera or outside the image are
    /// skipped entirely, leaving both counters untouched, so a point
    /// no camera ever saw keeps `total == 0`. One call per camera
    /// view, calls run to completion sequentially.
    pub fn accumulate_mask_votes(&mut self, camera: &Camera, mask: &Mask) {
        let projected = self.project_all(camera);

        for (i, proj) in projected.iter().enumerate() {
            let Some((u, v)) = proj else {
                continue;
            };

            // Round to the nearest integer pixel
            let col = (u + 0.5) as i64;
            let row = (v + 0.5) as i64;
            if col < 0 || row < 0 || col >= mask.width() as i64 || row >= mask.height() as i64 {
                continue;
            }

            if mask.is_foreground(row as usize, col as usize) {
                self.vote[i] += 1;
            }
            self.total[i] += 1;
        }
    }

    /// Keep only points whose accumulated foreground fraction exceeds
    /// `threshold`.
    ///
    /// Points with `total == 0` were never evaluated by any camera;
    /// that is absence of evidence, not inclusion, and they are
    /// dropped before any ratio is formed.
    pub fn resolve_mask_crop(&mut self, threshold: f64) {
        let keep: Vec<bool> = self
            .vote
            .iter()
            .zip(&self.total)
            .map(|(&vote, &total)| total > 0 && (vote as f64 / total as f64) > threshold)
            .collect();
        self.retain_by_mask(&keep);
    }

    fn retain_by_mask(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.points.len());

        let points = std::mem::take(&mut self.points);
        let vote = std::mem::take(&mut self.vote);
        let total = std::mem::take(&mut self.total);

        self.points = points
            .into_iter()
            .zip(keep)
            .filter(|&(_, &k)| k)
            .map(|(p, _)| p)
            .collect();
        self.vote = vote
            .into_iter()
            .zip(keep)
            .filter(|&(_, &k)| k)
            .map(|(v, _)| v)
            .collect();
        self.total = total
            .into_iter()
            .zip(keep)
            .filter(|&(_, &k)| k)
            .map(|(t, _)| t)
            .collect();
    }
}

/// Median with numpy semantics: the two middle values average for an
/// even count
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Distortion, Sensor};
    use nalgebra::Matrix4;
    use ndarray::Array2;
    use std::sync::Arc;

    fn test_camera() -> Camera {
        let sensor = Arc::new(
            Sensor::new(1000, 1000, 1000.0, 1000.0, 500.0, 500.0, Distortion::default()).unwrap(),
        );
        Camera::new(Matrix4::identity(), sensor, "img_0001.jpg".into(), 0)
    }

    fn point(x: f64, y: f64, z: f64) -> CloudPoint {
        CloudPoint {
            position: Vector3::new(x, y, z),
            color: [128, 128, 128],
        }
    }

    /// Points at depth 10 spread across the image plus one behind
    /// the camera
    fn test_cloud() -> PointCloud {
        PointCloud::new(vec![
            point(0.0, 0.0, 10.0),    // center (500, 500)
            point(0.05, 0.0, 10.0),   // (505, 500)
            point(0.0, 0.05, 10.0),   // (500, 505)
            point(2.0, 2.0, 10.0),    // (700, 700)
            point(-2.0, -2.0, 10.0),  // (300, 300)
            point(0.0, 0.0, -10.0),   // behind the camera
        ])
    }

    #[test]
    fn test_window_select_containment() {
        let camera = test_camera();
        let cloud = test_cloud();

        let selected = cloud.select_pixel_window(&camera, (500.0, 500.0), 15.0);
        assert_eq!(selected.len(), 3);

        for p in &selected {
            let (u, v) = camera.project(p).unwrap();
            assert!(u >= 485.0 && u < 515.0);
            assert!(v >= 485.0 && v < 515.0);
        }
    }

    #[test]
    fn test_window_is_half_open() {
        let camera = test_camera();
        // Projects to exactly (510, 500)
        let cloud = PointCloud::new(vec![point(0.1, 0.0, 10.0)]);

        // Upper edge excluded
        assert!(cloud.select_pixel_window(&camera, (500.0, 500.0), 10.0).is_empty());
        // Lower edge included
        assert_eq!(cloud.select_pixel_window(&camera, (520.0, 500.0), 10.0).len(), 1);
    }

    #[test]
    fn test_filter_window_mutates_and_keeps_counters_aligned() {
        let camera = test_camera();
        let mut cloud = test_cloud();

        // Give the center point a distinctive counter state first
        let mask = Mask::new(Array2::from_elem((1000, 1000), 255u8));
        cloud.accumulate_mask_votes(&camera, &mask);

        cloud.filter_pixel_window(&camera, (500.0, 500.0), 15.0);
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.vote().len(), 3);
        assert_eq!(cloud.total().len(), 3);
        assert!(cloud.vote().iter().all(|&v| v == 1));
    }

    #[test]
    fn test_behind_camera_never_selected() {
        let camera = test_camera();
        let cloud = PointCloud::new(vec![point(0.0, 0.0, -10.0)]);

        // A behind-camera point must not sneak into any window
        assert!(cloud.select_pixel_window(&camera, (500.0, 500.0), 500.0).is_empty());
    }

    #[test]
    fn test_ray_cast_median() {
        let camera = test_camera();
        let cloud = PointCloud::new(vec![
            point(0.0, 0.0, 10.0),  // (500, 500)
            point(0.02, 0.0, 10.0), // (502, 500)
        ]);

        let hit = cloud.ray_cast(&camera, (500.0, 500.0)).unwrap();
        // Even count: coordinate-wise average of the two middles
        assert!((hit.x - 0.01).abs() < 1e-12);
        assert!(hit.y.abs() < 1e-12);
        assert!((hit.z - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_ray_cast_odd_window() {
        let camera = test_camera();
        let cloud = PointCloud::new(vec![
            point(-0.01, 0.0, 10.0),
            point(0.0, 0.0, 10.0),
            point(0.03, 0.0, 10.0),
        ]);

        let hit = cloud.ray_cast(&camera, (500.0, 500.0)).unwrap();
        assert_eq!(hit.x, 0.0);
        assert_eq!(hit.z, 10.0);
    }

    #[test]
    fn test_ray_cast_unresolved() {
        let camera = test_camera();
        let cloud = test_cloud();

        // Nothing projects near the image corner
        assert!(cloud.ray_cast(&camera, (10.0, 10.0)).is_none());

        let empty = PointCloud::default();
        assert!(empty.ray_cast(&camera, (500.0, 500.0)).is_none());
    }

    #[test]
    fn test_polygon_bbox_superset_of_exact() {
        // Concave polygon; bbox keeps the notch, exact drops it
        let polygon = Polygon::from_xy(
            &[0.0, 4.0, 4.0, 2.0, 2.0, 0.0],
            &[0.0, 0.0, 2.0, 2.0, 4.0, 4.0],
        );

        let cloud = PointCloud::new(vec![
            point(1.0, 1.0, 0.0), // inside
            point(3.0, 1.0, 0.0), // inside
            point(3.0, 3.0, 0.0), // in bbox, in the notch
            point(5.0, 1.0, 0.0), // outside bbox
        ]);

        let approx = cloud.select_polygon(&polygon, false);
        let exact = cloud.select_polygon(&polygon, true);

        assert_eq!(approx, vec![0, 1, 2]);
        assert_eq!(exact, vec![0, 1]);
        assert!(exact.iter().all(|i| approx.contains(i)));
    }

    #[test]
    fn test_filter_polygon() {
        let polygon = Polygon::from_xy(&[-1.0, 1.0, 1.0, -1.0], &[-1.0, -1.0, 1.0, 1.0]);
        let mut cloud = test_cloud();

        cloud.filter_polygon(&polygon, true);
        assert_eq!(cloud.len(), 4); // the two 2-meter outliers dropped
        assert_eq!(cloud.vote().len(), cloud.len());
    }

    #[test]
    fn test_mask_votes_monotone() {
        let camera = test_camera();
        let mut cloud = test_cloud();

        // Foreground only in the image's upper-left quadrant
        let mut data = Array2::<u8>::zeros((1000, 1000));
        data.slice_mut(ndarray::s![..500, ..500]).fill(255);
        let mask = Mask::new(data);

        cloud.accumulate_mask_votes(&camera, &mask);
        let vote_1: Vec<u32> = cloud.vote().to_vec();
        let total_1: Vec<u32> = cloud.total().to_vec();

        cloud.accumulate_mask_votes(&camera, &mask);

        for i in 0..cloud.len() {
            assert!(cloud.vote()[i] >= vote_1[i]);
            assert!(cloud.total()[i] >= total_1[i]);
            assert!(cloud.vote()[i] <= cloud.total()[i]);
        }

        // The behind-camera point was never evaluated
        assert_eq!(cloud.total()[5], 0);
        // The (300, 300) point sits in the foreground quadrant
        assert_eq!(cloud.vote()[4], 2);
        assert_eq!(cloud.total()[4], 2);
        // The (700, 700) point was seen but is background
        assert_eq!(cloud.vote()[3], 0);
        assert_eq!(cloud.total()[3], 2);
    }

    #[test]
    fn test_resolve_mask_crop_excludes_unseen() {
        let camera = test_camera();
        let mut cloud = test_cloud();

        let mut data = Array2::<u8>::zeros((1000, 1000));
        data.slice_mut(ndarray::s![..500, ..500]).fill(255);
        let mask = Mask::new(data);

        cloud.accumulate_mask_votes(&camera, &mask);
        cloud.resolve_mask_crop(MASK_VOTE_THRESHOLD);

        // Only the unanimous foreground point survives; total == 0
        // points are never retained
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud.points()[0].position, Vector3::new(-2.0, -2.0, 10.0));
        assert!(cloud.total().iter().all(|&t| t > 0));
    }

    #[test]
    fn test_resolve_threshold_is_strict() {
        let camera = test_camera();
        let mut cloud = PointCloud::new(vec![point(0.0, 0.0, 10.0)]);

        let foreground = Mask::new(Array2::from_elem((1000, 1000), 255u8));
        let background = Mask::new(Array2::zeros((1000, 1000)));

        // 1 of 2 views foreground: 0.5, not above 0.5
        cloud.accumulate_mask_votes(&camera, &foreground);
        cloud.accumulate_mask_votes(&camera, &background);

        let mut half = cloud.clone();
        half.resolve_mask_crop(0.5);
        assert!(half.is_empty());

        let mut lenient = cloud;
        lenient.resolve_mask_crop(0.4);
        assert_eq!(lenient.len(), 1);
    }

    #[test]
    fn test_bounds() {
        let cloud = test_cloud();
        let (min_x, min_y, max_x, max_y) = cloud.bounds().unwrap();
        assert_eq!((min_x, min_y), (-2.0, -2.0));
        assert_eq!((max_x, max_y), (2.0, 2.0));

        assert!(PointCloud::default().bounds().is_none());
    }

    #[test]
    fn test_empty_cloud_queries() {
        let camera = test_camera();
        let mut cloud = PointCloud::default();
        let polygon = Polygon::from_xy(&[0.0, 1.0, 1.0], &[0.0, 0.0, 1.0]);

        assert!(cloud.select_pixel_window(&camera, (500.0, 500.0), 15.0).is_empty());
        assert!(cloud.select_polygon(&polygon, true).is_empty());
        assert!(cloud.ray_cast(&camera, (500.0, 500.0)).is_none());

        let mask = Mask::new(Array2::zeros((1000, 1000)));
        cloud.accumulate_mask_votes(&camera, &mask);
        cloud.resolve_mask_crop(MASK_VOTE_THRESHOLD);
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(vec![7.0]), 7.0);
    }
}
