use glam::Vec2;

use crate::geom::segment_intersection_fraction;
use crate::portal::{PortalError, PortalId, PortalSet};

/// Default seconds between teleports.
pub const DEFAULT_COOLDOWN: f64 = 0.25;

/// A completed jump through a portal pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Teleport {
    /// Portal whose segment was crossed.
    pub entered: PortalId,
    /// Its sibling, where the point came out.
    pub exited: PortalId,
    /// Fraction along last frame's motion where the crossing happened.
    pub fraction: f32,
    /// Position before the jump.
    pub from: Vec2,
    /// Position after the jump.
    pub to: Vec2,
}

/// Watches a moving point (cursor, avatar) and teleports it when its
/// path between two updates crosses a linked portal.
pub struct Teleporter {
    last_pos: Option<Vec2>,
    last_teleport: Option<f64>,
    pub cooldown: f64,
}

impl Teleporter {
    pub fn new(cooldown: f64) -> Self {
        Self {
            last_pos: None,
            last_teleport: None,
            cooldown,
        }
    }

    /// Forget the previous position, e.g. after the point was moved by hand.
    pub fn reset(&mut self) {
        self.last_pos = None;
    }

    pub fn last_pos(&self) -> Option<Vec2> {
        self.last_pos
    }

    /// Has the cooldown elapsed at time `now` (seconds)?
    pub fn ready(&self, now: f64) -> bool {
        self.last_teleport
            .map_or(true, |last| now - last >= self.cooldown)
    }

    /// Feed the point's current position. Call once per update.
    ///
    /// Returns the jump if the path since the last call crossed a linked
    /// portal; the caller should move the point to `Teleport::to`.
    /// Unlinked portals are ignored. With several crossings the earliest
    /// along the path wins.
    pub fn step(
        &mut self,
        portals: &PortalSet,
        pos: Vec2,
        now: f64,
    ) -> Result<Option<Teleport>, PortalError> {
        let Some(prev) = self.last_pos.replace(pos) else {
            return Ok(None);
        };
        if !self.ready(now) || prev == pos {
            return Ok(None);
        }

        let mut hit: Option<(PortalId, PortalId, f32)> = None;
        for (id, portal) in portals.iter() {
            let Some(sibling) = portal.sibling() else {
                continue;
            };
            let (a, b) = portal.line();
            if let Some(t) = segment_intersection_fraction(prev, pos, a, b) {
                if hit.map_or(true, |(_, _, best)| t < best) {
                    hit = Some((id, sibling, t));
                }
            }
        }

        let Some((entered, exited, fraction)) = hit else {
            return Ok(None);
        };
        let to = portals.map_point_across(entered, pos)?;
        self.last_pos = Some(to);
        self.last_teleport = Some(now);
        log::debug!(
            "teleport through {} -> {}: {pos} -> {to} (t = {fraction:.3})",
            entered.index(),
            exited.index(),
        );

        Ok(Some(Teleport {
            entered,
            exited,
            fraction,
            from: pos,
            to,
        }))
    }
}

impl Default for Teleporter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
