//! Incident-edge selection and Sutherland-Hodgman clipping.

use nalgebra::{Point2, Rotation2, Vector2};

use crate::features::{EdgeNumber, FeaturePair};

/// A clip vertex: a candidate contact position plus its feature tag.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClipVertex {
    pub position: Point2<f64>,
    pub feature: FeaturePair,
}

impl Default for ClipVertex {
    fn default() -> Self {
        Self {
            position: Point2::origin(),
            feature: FeaturePair::default(),
        }
    }
}

/// Clip a two-vertex segment against the half-plane `normal · x ≤ offset`.
///
/// Vertices behind the plane pass through unchanged. A crossing produces an
/// interpolated vertex whose feature inherits from the surviving side, with
/// the first body's in/out edge rewritten to `clip_edge` and the second
/// body's corresponding edge cleared.
///
/// Returns the surviving vertices and their count (0, 1, or 2).
pub(crate) fn clip_segment_to_line(
    v_in: &[ClipVertex; 2],
    normal: &Vector2<f64>,
    offset: f64,
    clip_edge: EdgeNumber,
) -> ([ClipVertex; 2], usize) {
    let mut v_out = [ClipVertex::default(); 2];
    let mut num_out = 0;

    // Signed distances of the endpoints to the clip line
    let distance0 = normal.dot(&v_in[0].position.coords) - offset;
    let distance1 = normal.dot(&v_in[1].position.coords) - offset;

    if distance0 <= 0.0 {
        v_out[num_out] = v_in[0];
        num_out += 1;
    }
    if distance1 <= 0.0 {
        v_out[num_out] = v_in[1];
        num_out += 1;
    }

    // Endpoints on opposite sides: emit the intersection
    if distance0 * distance1 < 0.0 {
        let interp = distance0 / (distance0 - distance1);
        v_out[num_out].position =
            v_in[0].position + interp * (v_in[1].position - v_in[0].position);

        if distance0 > 0.0 {
            v_out[num_out].feature = v_in[0].feature;
            v_out[num_out].feature.in_edge1 = clip_edge;
            v_out[num_out].feature.in_edge2 = EdgeNumber::None;
        } else {
            v_out[num_out].feature = v_in[1].feature;
            v_out[num_out].feature.out_edge1 = clip_edge;
            v_out[num_out].feature.out_edge2 = EdgeNumber::None;
        }
        num_out += 1;
    }

    (v_out, num_out)
}

/// The incident edge of a box: the face whose outward normal is most
/// antiparallel to the reference normal.
///
/// `h` is the box's half extents, `pos`/`rot` its pose, and `normal` the
/// reference face normal in world space. The returned vertices are the
/// endpoints of the incident face in world space, tagged with that face's
/// in/out edges on the "2" side of the feature pair.
pub(crate) fn incident_edge(
    h: &Vector2<f64>,
    pos: &Point2<f64>,
    rot: &Rotation2<f64>,
    normal: &Vector2<f64>,
) -> [ClipVertex; 2] {
    // Reference normal in the incident box's frame, sign flipped
    let n = -(rot.transpose() * *normal);
    let n_abs = n.abs();

    let mut c = [ClipVertex::default(); 2];

    if n_abs.x > n_abs.y {
        if n.x > 0.0 {
            c[0].position = Point2::new(h.x, -h.y);
            c[0].feature.in_edge2 = EdgeNumber::Edge3;
            c[0].feature.out_edge2 = EdgeNumber::Edge4;

            c[1].position = Point2::new(h.x, h.y);
            c[1].feature.in_edge2 = EdgeNumber::Edge4;
            c[1].feature.out_edge2 = EdgeNumber::Edge1;
        } else {
            c[0].position = Point2::new(-h.x, h.y);
            c[0].feature.in_edge2 = EdgeNumber::Edge1;
            c[0].feature.out_edge2 = EdgeNumber::Edge2;

            c[1].position = Point2::new(-h.x, -h.y);
            c[1].feature.in_edge2 = EdgeNumber::Edge2;
            c[1].feature.out_edge2 = EdgeNumber::Edge3;
        }
    } else if n.y > 0.0 {
        c[0].position = Point2::new(h.x, h.y);
        c[0].feature.in_edge2 = EdgeNumber::Edge4;
        c[0].feature.out_edge2 = EdgeNumber::Edge1;

        c[1].position = Point2::new(-h.x, h.y);
        c[1].feature.in_edge2 = EdgeNumber::Edge1;
        c[1].feature.out_edge2 = EdgeNumber::Edge2;
    } else {
        c[0].position = Point2::new(-h.x, -h.y);
        c[0].feature.in_edge2 = EdgeNumber::Edge2;
        c[0].feature.out_edge2 = EdgeNumber::Edge3;

        c[1].position = Point2::new(h.x, -h.y);
        c[1].feature.in_edge2 = EdgeNumber::Edge3;
        c[1].feature.out_edge2 = EdgeNumber::Edge4;
    }

    c[0].position = *pos + rot * c[0].position.coords;
    c[1].position = *pos + rot * c[1].position.coords;

    c
}
