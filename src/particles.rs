use glam::Vec2;

use crate::util::pool::{Pool, PoolError};

/// Maximum concurrent particles.
pub const MAX_PARTICLES: usize = 256;
/// Downward pull in px/s^2 (y-up world).
const GRAVITY: f32 = 200.0;
/// Velocity damping per second.
const DRAG: f32 = 0.5;

/// A single spark. Lives in a [`Pool`] slot and is recycled when it dies.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifetime: f32,
    pub max_lifetime: f32,
}

/// Pool-backed particle bursts. Never allocates after `new`.
pub struct ParticleSystem {
    pool: Pool<Particle>,
    /// Spawns refused because the pool was full.
    pub dropped: u64,
}

impl ParticleSystem {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Pool::from_factory(capacity, |_| Particle::default()),
            dropped: 0,
        }
    }

    /// Spawn up to `count` sparks at `pos`. Returns how many fit.
    pub fn burst(&mut self, pos: Vec2, count: usize, rng: &mut fastrand::Rng) -> usize {
        for spawned in 0..count {
            let idx = match self.pool.get_index() {
                Ok(idx) => idx,
                Err(PoolError::Exhausted) => {
                    let missed = count - spawned;
                    self.dropped += missed as u64;
                    log::warn!("particle pool exhausted, dropped {missed} sparks");
                    return spawned;
                }
                Err(e) => {
                    log::error!("particle pool: {e}");
                    return spawned;
                }
            };

            let angle = rng.f32() * std::f32::consts::TAU;
            let speed = 60.0 + rng.f32() * 120.0;
            let lifetime = 0.5 + rng.f32() * 1.0;
            if let Some(p) = self.pool.item_mut(idx) {
                *p = Particle {
                    pos,
                    vel: Vec2::from_angle(angle) * speed,
                    lifetime,
                    max_lifetime: lifetime,
                };
            }
        }
        count
    }

    /// Move and age particles. Dead or off-screen ones go back to the pool.
    pub fn update(&mut self, dt: f32, bounds: Vec2) -> Result<(), PoolError> {
        let mut i = 0;
        while i < self.pool.next_index() {
            let alive = match self.pool.item_mut(i) {
                Some(p) => {
                    p.vel.y -= GRAVITY * dt;
                    p.vel *= 1.0 - DRAG * dt;
                    p.pos += p.vel * dt;
                    p.lifetime -= dt;
                    p.lifetime > 0.0
                        && p.pos.x >= 0.0
                        && p.pos.y >= 0.0
                        && p.pos.x <= bounds.x
                        && p.pos.y <= bounds.y
                }
                None => break,
            };

            if alive {
                i += 1;
            } else {
                // The boundary particle moves into slot i; look at it next.
                self.pool.give_at(i)?;
            }
        }
        Ok(())
    }

    /// Number of active particles.
    pub fn count(&self) -> usize {
        self.pool.given_items().len()
    }

    pub fn capacity(&self) -> usize {
        self.pool.size()
    }

    pub fn active(&self) -> &[Particle] {
        self.pool.given_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(1000.0, 1000.0);

    #[test]
    fn burst_respects_capacity() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut sys = ParticleSystem::new(8);
        assert_eq!(sys.burst(Vec2::splat(500.0), 5, &mut rng), 5);
        assert_eq!(sys.burst(Vec2::splat(500.0), 5, &mut rng), 3);
        assert_eq!(sys.count(), 8);
        assert_eq!(sys.dropped, 2);
    }

    #[test]
    fn expired_particles_are_recycled() {
        let mut rng = fastrand::Rng::with_seed(2);
        let mut sys = ParticleSystem::new(16);
        sys.burst(Vec2::splat(500.0), 16, &mut rng);

        // Longest lifetime is 1.5s.
        for _ in 0..120 {
            sys.update(1.0 / 60.0, BOUNDS).unwrap();
        }
        assert_eq!(sys.count(), 0);
        assert_eq!(sys.burst(Vec2::splat(500.0), 16, &mut rng), 16);
    }

    #[test]
    fn offscreen_particles_are_recycled() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut sys = ParticleSystem::new(4);
        sys.burst(Vec2::new(-10.0, 500.0), 4, &mut rng);
        sys.update(0.001, BOUNDS).unwrap();
        assert_eq!(sys.count(), 0);
    }

    #[test]
    fn survivors_stay_in_given_region() {
        let mut rng = fastrand::Rng::with_seed(4);
        let mut sys = ParticleSystem::new(32);
        sys.burst(Vec2::splat(500.0), 32, &mut rng);
        for _ in 0..50 {
            sys.update(1.0 / 60.0, BOUNDS).unwrap();
            assert!(sys.active().iter().all(|p| p.lifetime > 0.0));
        }
    }
}
