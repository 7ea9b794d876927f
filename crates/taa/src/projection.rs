use glam::{Mat4, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    Perspective,
    Orthographic,
}

impl ProjectionKind {
    pub fn from_orthographic(orthographic: bool) -> Self {
        if orthographic {
            Self::Orthographic
        } else {
            Self::Perspective
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitteredProjection {
    pub matrix: Mat4,
    /// Raw offset divided by the target resolution
    pub normalized_offset: Vec2,
}

/// Shifts a projection matrix by a sub-pixel offset.
///
/// glam is column-major, so the cell at (row r, col c) lives in `col(c)[r]`.
/// Orthographic projections move the translation terms (0,3) and (1,3) by
/// `-2 * normalized`, perspective projections move the off-diagonal terms
/// (0,2) and (1,2) by `+2 * normalized`. Nothing else is touched.
pub fn apply_jitter(
    projection: Mat4,
    raw_offset: Vec2,
    width: u32,
    height: u32,
    kind: ProjectionKind,
) -> JitteredProjection {
    let normalized_offset = Vec2::new(
        raw_offset.x / width.max(1) as f32,
        raw_offset.y / height.max(1) as f32,
    );

    let mut matrix = projection;

    if normalized_offset != Vec2::ZERO {
        match kind {
            ProjectionKind::Orthographic => {
                matrix.w_axis.x -= 2.0 * normalized_offset.x;
                matrix.w_axis.y -= 2.0 * normalized_offset.y;
            }
            ProjectionKind::Perspective => {
                matrix.z_axis.x += 2.0 * normalized_offset.x;
                matrix.z_axis.y += 2.0 * normalized_offset.y;
            }
        }
    }

    JitteredProjection {
        matrix,
        normalized_offset,
    }
}
