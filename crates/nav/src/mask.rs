//! # Object Masks
//!
//! Coarse spatial maps of where objects appear in the current frame. Each
//! bounding box is reduced to its center point, and the point is projected
//! onto a `size x size` grid by linear scaling of the pixel coordinates.
//! When several points land in the same cell the cell keeps the largest
//! value; untouched cells stay zero.
//!
//! Masks are always returned with shape `[1, 1, size, size]` and are indexed
//! `[.., .., x_cell, y_cell]`.

use crate::tensor::Tensor;
use crate::EnvError;
use world::{object_class, BoxMap, World};

/// A projected point: pixel center `(x, y)` and the value to write.
pub type MaskPoint = ((f32, f32), f32);

/// Projects `points` from a `frame` of `(height, width)` pixels onto a
/// `size x size` grid.
///
/// # Errors
///
/// Returns [`EnvError::MaskOutOfBounds`] if a point projects outside the
/// grid. The frame size and all points are logged first.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn downsample(frame: (usize, usize), size: usize, points: &[MaskPoint]) -> Result<Tensor, EnvError> {
    let (height, width) = frame;
    let ratio_h = size as f64 / height as f64;
    let ratio_w = size as f64 / width as f64;

    let mut grid = Tensor::zeros(vec![1, 1, size, size]);
    for &((x, y), value) in points {
        let cx = (f64::from(x) * ratio_w).floor();
        let cy = (f64::from(y) * ratio_h).floor();
        let in_grid = |c: f64| c >= 0.0 && c < size as f64;
        if !in_grid(cx) || !in_grid(cy) {
            tracing::error!(?frame, size, ?points, "bounding box center outside mask grid");
            return Err(EnvError::MaskOutOfBounds { x, y, size });
        }
        let cell = &mut grid.data[cx as usize * size + cy as usize];
        *cell = cell.max(value);
    }
    Ok(grid)
}

/// Cosine similarity of two vectors; zero if either has zero norm.
///
/// # Errors
///
/// Returns [`EnvError::DimensionMismatch`] for vectors of different length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, EnvError> {
    if a.len() != b.len() {
        return Err(EnvError::DimensionMismatch { left: a.len(), right: b.len() });
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

/// Every visible box, valued by how similar its class embedding is to
/// `target`.
///
/// # Errors
///
/// Fails when a box class is missing from the object table, when `target`
/// and the embeddings differ in length, or when a point leaves the grid.
pub fn similarity_mask(world: &World, boxes: &BoxMap, target: &[f32], size: usize) -> Result<Tensor, EnvError> {
    let mut points = Vec::with_capacity(boxes.len());
    for (key, bbox) in boxes {
        let class = object_class(key);
        let id = world.object_id(class).map_err(|e| {
            tracing::error!(key = %key, "bounding box class missing from object table");
            e
        })?;
        let embedding = world
            .embedding(id)
            .ok_or_else(|| world::WorldError::UnknownObject(class.to_string()))?;
        points.push((bbox.center(), cosine_similarity(target, embedding)?));
    }
    downsample(world.frame_size(), size, &points)
}

/// Cells holding a box of exactly `class` are one, the rest zero.
///
/// # Errors
///
/// Returns [`EnvError::MaskOutOfBounds`] if a box center leaves the grid.
pub fn goal_mask(world: &World, boxes: &BoxMap, class: &str, size: usize) -> Result<Tensor, EnvError> {
    let points: Vec<MaskPoint> = boxes
        .iter()
        .filter(|(key, _)| object_class(key) == class)
        .map(|(_, bbox)| (bbox.center(), 1.0))
        .collect();
    downsample(world.frame_size(), size, &points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_point_lands_in_its_cell() {
        // 300x400 frame onto 5x5: x cell = floor(250 * 5 / 400) = 3,
        // y cell = floor(130 * 5 / 300) = 2.
        let grid = downsample((300, 400), 5, &[((250.0, 130.0), 0.7)]).unwrap();
        assert_eq!(grid.shape, vec![1, 1, 5, 5]);
        for x in 0..5 {
            for y in 0..5 {
                let expected = if (x, y) == (3, 2) { 0.7 } else { 0.0 };
                assert_eq!(grid.get(&[0, 0, x, y]), Some(expected), "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn shared_cell_keeps_max() {
        let grid = downsample((10, 10), 2, &[((1.0, 1.0), 0.2), ((2.0, 3.0), 0.9), ((4.0, 0.0), 0.5)]).unwrap();
        assert_eq!(grid.get(&[0, 0, 0, 0]), Some(0.9));
        assert_eq!(grid.data.iter().filter(|v| **v != 0.0).count(), 1);
    }

    #[test]
    fn point_on_far_edge_is_out_of_bounds() {
        let err = downsample((300, 400), 5, &[((400.0, 10.0), 1.0)]).unwrap_err();
        assert!(matches!(err, EnvError::MaskOutOfBounds { size: 5, .. }));
        assert!(downsample((300, 400), 5, &[((-1.0, 10.0), 1.0)]).is_err());
    }

    #[test]
    fn cosine_similarity_edge_cases() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]).unwrap() - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).unwrap().abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
        assert!(matches!(
            cosine_similarity(&[1.0], &[1.0, 0.0]),
            Err(EnvError::DimensionMismatch { left: 1, right: 2 })
        ));
    }
}
