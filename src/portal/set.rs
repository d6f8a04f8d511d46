use glam::{Mat3, Vec2, Vec3};

use super::Portal;

/// Non-owning handle to a portal inside a [`PortalSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortalId(usize);

impl PortalId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    /// `map_across` on a portal with no sibling.
    #[error("portal {} has no sibling", .0.index())]
    Unlinked(PortalId),
    /// Handle does not belong to this set.
    #[error("no portal with id {}", .0.index())]
    UnknownPortal(PortalId),
    /// A portal cannot be its own sibling.
    #[error("portal {} cannot link to itself", .0.index())]
    SelfLink(PortalId),
}

/// Owns every portal; siblings refer to each other by [`PortalId`].
///
/// Links are always symmetric: if `a.sibling() == Some(b)` then
/// `b.sibling() == Some(a)`.
#[derive(Debug, Default)]
pub struct PortalSet {
    portals: Vec<Portal>,
}

impl PortalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an unlinked portal. Any sibling the value carried is dropped.
    pub fn insert(&mut self, mut portal: Portal) -> PortalId {
        portal.set_sibling(None);
        let id = PortalId(self.portals.len());
        self.portals.push(portal);
        id
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    pub fn get(&self, id: PortalId) -> Result<&Portal, PortalError> {
        self.portals.get(id.0).ok_or(PortalError::UnknownPortal(id))
    }

    pub fn get_mut(&mut self, id: PortalId) -> Result<&mut Portal, PortalError> {
        self.portals
            .get_mut(id.0)
            .ok_or(PortalError::UnknownPortal(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PortalId, &Portal)> {
        self.portals
            .iter()
            .enumerate()
            .map(|(i, p)| (PortalId(i), p))
    }

    /// Portal whose center is nearest `point` within `radius`.
    pub fn nearest(&self, point: Vec2, radius: f32) -> Option<PortalId> {
        self.iter()
            .map(|(id, p)| (id, p.position().distance_squared(point)))
            .filter(|&(_, d2)| d2 <= radius * radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Link `a` and `b`, breaking any links either had before.
    pub fn link(&mut self, a: PortalId, b: PortalId) -> Result<(), PortalError> {
        if a == b {
            return Err(PortalError::SelfLink(a));
        }
        self.get(a)?;
        self.get(b)?;

        self.unlink(a)?;
        self.unlink(b)?;
        self.portals[a.0].set_sibling(Some(b));
        self.portals[b.0].set_sibling(Some(a));
        log::debug!("linked portals {} <-> {}", a.0, b.0);
        Ok(())
    }

    /// Clear the link on both ends. No-op if `id` is unlinked.
    pub fn unlink(&mut self, id: PortalId) -> Result<(), PortalError> {
        let Some(sibling) = self.get_mut(id)?.sibling.take() else {
            return Ok(());
        };
        if let Some(other) = self.portals.get_mut(sibling.0) {
            other.set_sibling(None);
        }
        log::debug!("unlinked portals {} <-> {}", id.0, sibling.0);
        Ok(())
    }

    /// Transform taking a point near `id` to the matching point near its sibling.
    ///
    /// Local coordinates are flipped (the sibling's negated basis) and scaled
    /// by `sibling.width / width`, so A -> B -> A is the identity.
    pub fn across_matrix(&self, id: PortalId) -> Result<Mat3, PortalError> {
        let from = self.get(id)?;
        let sibling = from.sibling().ok_or(PortalError::Unlinked(id))?;
        let to = self.get(sibling)?;

        let k = to.width() / from.width();
        let flip_scale = Mat3::from_diagonal(Vec3::new(-k, -k, 1.0));
        Ok(to.to_world_matrix() * flip_scale * from.to_local_matrix())
    }

    /// Teleport a homogeneous point through `id` to its sibling.
    pub fn map_across(&self, id: PortalId, point: Vec3) -> Result<Vec3, PortalError> {
        Ok(self.across_matrix(id)? * point)
    }

    /// [`PortalSet::map_across`] for a plain point.
    pub fn map_point_across(&self, id: PortalId, point: Vec2) -> Result<Vec2, PortalError> {
        Ok(self.map_across(id, point.extend(1.0))?.truncate())
    }

    /// Carry a direction or velocity through `id`: rotated and scaled, not translated.
    pub fn map_vector_across(&self, id: PortalId, vector: Vec2) -> Result<Vec2, PortalError> {
        Ok(self.map_across(id, vector.extend(0.0))?.truncate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::tests::approx;

    fn pair(width_a: f32, width_b: f32) -> (PortalSet, PortalId, PortalId) {
        let mut set = PortalSet::new();
        let a = set.insert(Portal::new(
            Vec2::new(100.0, 100.0),
            Vec2::from_angle(60f32.to_radians()),
            width_a,
            8.0,
        ));
        let b = set.insert(Portal::new(
            Vec2::new(400.0, 600.0),
            Vec2::from_angle(230f32.to_radians()),
            width_b,
            8.0,
        ));
        set.link(a, b).unwrap();
        (set, a, b)
    }

    #[test]
    fn links_are_symmetric() {
        let (mut set, a, b) = pair(50.0, 50.0);
        assert_eq!(set.get(a).unwrap().sibling(), Some(b));
        assert_eq!(set.get(b).unwrap().sibling(), Some(a));

        set.unlink(b).unwrap();
        assert_eq!(set.get(a).unwrap().sibling(), None);
        assert_eq!(set.get(b).unwrap().sibling(), None);
        set.unlink(a).unwrap();
    }

    #[test]
    fn relink_breaks_old_pair() {
        let (mut set, a, b) = pair(50.0, 50.0);
        let c = set.insert(Portal::new(Vec2::ZERO, Vec2::Y, 30.0, 4.0));
        set.link(a, c).unwrap();

        assert_eq!(set.get(a).unwrap().sibling(), Some(c));
        assert_eq!(set.get(c).unwrap().sibling(), Some(a));
        assert_eq!(set.get(b).unwrap().sibling(), None);
    }

    #[test]
    fn link_errors() {
        let (mut set, a, _) = pair(50.0, 50.0);
        assert_eq!(set.link(a, a), Err(PortalError::SelfLink(a)));
        let ghost = PortalId(42);
        assert_eq!(set.link(a, ghost), Err(PortalError::UnknownPortal(ghost)));
        // Failed link leaves the old pair alone.
        assert!(set.get(a).unwrap().is_linked());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            PortalError::Unlinked(PortalId(3)).to_string(),
            "portal 3 has no sibling"
        );
        assert_eq!(
            PortalError::SelfLink(PortalId(0)).to_string(),
            "portal 0 cannot link to itself"
        );
        let boxed: Box<dyn std::error::Error> = PortalError::UnknownPortal(PortalId(7)).into();
        assert_eq!(boxed.to_string(), "no portal with id 7");
    }

    #[test]
    fn across_unlinked_is_an_error() {
        let mut set = PortalSet::new();
        let a = set.insert(Portal::new(Vec2::ZERO, Vec2::Y, 50.0, 5.0));
        assert_eq!(
            set.map_across(a, Vec3::new(1.0, 2.0, 1.0)),
            Err(PortalError::Unlinked(a))
        );
    }

    #[test]
    fn center_maps_to_center() {
        let (set, a, b) = pair(50.0, 200.0);
        let pa = set.get(a).unwrap().position();
        let pb = set.get(b).unwrap().position();
        assert!(approx(set.map_point_across(a, pa).unwrap(), pb));
        assert!(approx(set.map_point_across(b, pb).unwrap(), pa));
    }

    #[test]
    fn same_size_round_trip() {
        let (set, a, b) = pair(50.0, 50.0);
        let center = set.get(a).unwrap().position();
        for delta in [
            Vec2::ZERO,
            Vec2::new(3.0, -4.0),
            Vec2::new(-20.0, 10.0),
            Vec2::new(40.0, 40.0),
            Vec2::new(-1.5, 0.25),
        ] {
            let p = (center + delta).extend(1.0);
            let there = set.map_across(a, p).unwrap();
            let back = set.map_across(b, there).unwrap();
            assert!(approx(back.truncate(), p.truncate()), "{p} -> {there} -> {back}");
        }
    }

    #[test]
    fn scaled_round_trip() {
        let (set, a, b) = pair(50.0, 200.0);
        let p = set.get(a).unwrap().position() + Vec2::new(7.0, -3.0);
        let there = set.map_point_across(a, p).unwrap();
        let back = set.map_point_across(b, there).unwrap();
        assert!(approx(back, p));
    }

    #[test]
    fn width_ratio_scales_distance() {
        let (set, a, b) = pair(50.0, 200.0);
        let pa = set.get(a).unwrap();
        let pb = set.get(b).unwrap();

        for d in [1.0, 2.5, -6.0] {
            let p = pa.position() + pa.direction() * d + pa.normal() * 3.0;
            let q = set.map_point_across(a, p).unwrap();

            // Distance from each portal's normal axis is the direction component.
            let local_a = pa.to_local(p);
            let local_b = pb.to_local(q);
            assert!((local_a.y.abs() - d.abs()).abs() < 1e-3);
            assert!((local_b.y.abs() - 4.0 * d.abs()).abs() < 1e-2);
            assert!((local_b.x.abs() - 12.0).abs() < 1e-2);
        }
    }

    #[test]
    fn entering_front_exits_front() {
        let (set, a, b) = pair(50.0, 50.0);
        let pa = set.get(a).unwrap();
        let pb = set.get(b).unwrap();
        // Just behind A's face (negative depth) comes out in front of B.
        let behind_a = pa.position() - pa.direction() * 2.0;
        let out = set.map_point_across(a, behind_a).unwrap();
        assert!(pb.to_local(out).y > 0.0);
    }

    #[test]
    fn vectors_rotate_without_translating() {
        let (set, a, b) = pair(50.0, 200.0);
        let pa = set.get(a).unwrap();
        let pb = set.get(b).unwrap();

        let p = pa.position() + Vec2::new(3.0, 1.0);
        let v = Vec2::new(-2.0, 5.0);
        let mapped = set.map_vector_across(a, v).unwrap();
        let expected =
            set.map_point_across(a, p + v).unwrap() - set.map_point_across(a, p).unwrap();
        assert!(approx(mapped, expected));
        assert!((mapped.length() - 4.0 * v.length()).abs() < 1e-2);

        // Moving into A's face comes out of B's face.
        let out = set.map_vector_across(a, -pa.direction()).unwrap();
        assert!(out.dot(pb.direction()) > 0.0);
    }

    #[test]
    fn nearest_portal() {
        let (set, a, b) = pair(50.0, 50.0);
        assert_eq!(set.nearest(Vec2::new(105.0, 98.0), 20.0), Some(a));
        assert_eq!(set.nearest(Vec2::new(390.0, 590.0), 20.0), Some(b));
        assert_eq!(set.nearest(Vec2::new(250.0, 350.0), 20.0), None);
    }
}
