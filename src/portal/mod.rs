pub mod set;

use glam::{Mat3, Vec2, Vec3};

use crate::geom::{rotate_ccw, rotate_cw};

pub use set::{PortalError, PortalId, PortalSet};

/// Smallest width/thickness a portal may have. Keeps width ratios finite.
pub const MIN_EXTENT: f32 = 1e-3;
/// Length of the normal/direction debug ticks drawn at the portal center.
pub const DEBUG_TICK_LEN: f32 = 10.0;

/// An oriented 2D segment with its own (normal, direction) frame.
///
/// `direction` is the depth axis (out of the portal's face), `normal` runs
/// along the segment. Both are unit length and perpendicular; `offset` is
/// `position` in that basis. Every setter keeps the three in sync.
#[derive(Debug, Clone)]
pub struct Portal {
    position: Vec2,
    direction: Vec2,
    normal: Vec2,
    offset: Vec2,
    /// Half-extent along `normal`.
    width: f32,
    /// Half-extent along `direction`.
    thickness: f32,
    sibling: Option<PortalId>,
}

impl Portal {
    /// A zero `direction` falls back to +Y.
    pub fn new(position: Vec2, direction: Vec2, width: f32, thickness: f32) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec2::Y);
        let mut portal = Self {
            position,
            direction,
            normal: rotate_cw(direction),
            offset: Vec2::ZERO,
            width: width.max(MIN_EXTENT),
            thickness: thickness.max(MIN_EXTENT),
            sibling: None,
        };
        portal.sync_offset();
        portal
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn sibling(&self) -> Option<PortalId> {
        self.sibling
    }

    pub fn is_linked(&self) -> bool {
        self.sibling.is_some()
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.sync_offset();
    }

    /// Ignores zero vectors.
    pub fn set_direction(&mut self, direction: Vec2) {
        let Some(direction) = direction.try_normalize() else {
            return;
        };
        self.direction = direction;
        self.normal = rotate_cw(direction);
        self.sync_offset();
    }

    /// Ignores zero vectors.
    pub fn set_normal(&mut self, normal: Vec2) {
        let Some(normal) = normal.try_normalize() else {
            return;
        };
        self.normal = normal;
        self.direction = rotate_ccw(normal);
        self.sync_offset();
    }

    /// Move the portal so its position in its own basis is `offset`.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.position = self.normal * offset.x + self.direction * offset.y;
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width.max(MIN_EXTENT);
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        self.thickness = thickness.max(MIN_EXTENT);
    }

    /// Spin the frame around `position` (scroll-to-rotate).
    pub fn rotate(&mut self, radians: f32) {
        self.set_direction(Vec2::from_angle(radians).rotate(self.direction));
    }

    pub(crate) fn set_sibling(&mut self, sibling: Option<PortalId>) {
        self.sibling = sibling;
    }

    fn sync_offset(&mut self) {
        self.offset = Vec2::new(
            self.position.dot(self.normal),
            self.position.dot(self.direction),
        );
    }

    /// Endpoints of the drawn segment.
    pub fn line(&self) -> (Vec2, Vec2) {
        let half = self.normal * self.width;
        (self.position - half, self.position + half)
    }

    /// Segment plus the normal and direction ticks at the center, for debug drawing.
    pub fn debug_lines(&self) -> [(Vec2, Vec2); 3] {
        [
            self.line(),
            (self.position, self.position + self.normal * DEBUG_TICK_LEN),
            (self.position, self.position + self.direction * DEBUG_TICK_LEN),
        ]
    }

    /// Is `point` inside the portal's active box (width x thickness)?
    pub fn check_overlap(&self, point: Vec2) -> bool {
        let local = self.to_local(point);
        local.x.abs() <= self.width && local.y.abs() <= self.thickness
    }

    /// World point -> (along normal, along direction) relative to `position`.
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        let rel = point - self.position;
        Vec2::new(rel.dot(self.normal), rel.dot(self.direction))
    }

    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.position + self.normal * local.x + self.direction * local.y
    }

    /// Rotate into the (normal, direction) basis, then translate by `-offset`.
    pub fn to_local_matrix(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::new(self.normal.x, self.direction.x, 0.0),
            Vec3::new(self.normal.y, self.direction.y, 0.0),
            Vec3::new(-self.offset.x, -self.offset.y, 1.0),
        )
    }

    /// Inverse of [`Portal::to_local_matrix`].
    pub fn to_world_matrix(&self) -> Mat3 {
        Mat3::from_cols(
            self.normal.extend(0.0),
            self.direction.extend(0.0),
            self.position.extend(1.0),
        )
    }

    /// Homogeneous world point `(x, y, 1)` into this portal's frame.
    pub fn map_to(&self, point: Vec3) -> Vec3 {
        self.to_local_matrix() * point
    }

    /// Homogeneous local point back out into world space.
    pub fn map_out(&self, point: Vec3) -> Vec3 {
        self.to_world_matrix() * point
    }
}
