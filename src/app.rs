use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::debug::timer::{LogSection, Phase, PhaseTimers};
use crate::notify::Notifier;
use crate::particles::{ParticleSystem, MAX_PARTICLES};
use crate::portal::{Portal, PortalId, PortalSet};
use crate::teleport::{Teleport, Teleporter, DEFAULT_COOLDOWN};

/// Simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// How long the headless demo runs (simulated seconds).
const SIM_SECONDS: f64 = 60.0;
/// How often to log stats (simulated seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;
/// Fixed seed so demo runs are reproducible.
const RNG_SEED: u64 = 0x5eed_cafe;

/// Play area, y-up.
const SCREEN: Vec2 = Vec2::new(1280.0, 720.0);

/// Cursor wander speed in px/s.
const CURSOR_SPEED: f32 = 420.0;
/// Max heading change per second (radians).
const CURSOR_TURN_RATE: f32 = 6.0;
/// Chance per tick of a simulated click (spark burst).
const CLICK_CHANCE_PER_TICK: f32 = 0.05;
/// Sparks per click.
const SPARKS_PER_CLICK: usize = 24;
/// Sparks when something comes out of a portal.
const SPARKS_PER_TELEPORT: usize = 12;

/// Portal half-widths. Different sizes to exercise the rescale.
const PORTAL_A_WIDTH: f32 = 50.0;
const PORTAL_B_WIDTH: f32 = 200.0;
const PORTAL_THICKNESS: f32 = 6.0;
/// How often the demo "scrolls" portal B (simulated seconds).
const ROTATE_INTERVAL: f64 = 3.0;
/// Scroll step, same as one mouse-wheel notch in the toy.
const ROTATE_STEP_DEG: f32 = 10.0;

/// Payload broadcast after each jump.
#[derive(Debug, Clone, Copy)]
pub struct TeleportEvent {
    pub jump: Teleport,
    pub time: f64,
}

// ---------------------------------------------------------------------------
// Sim stats
// ---------------------------------------------------------------------------

struct SimStats {
    tick_count: u64,
    last_log_time: f64,
    ticks_since_log: u32,
    teleports: Rc<Cell<u32>>,
    teleports_at_last_log: u32,
    peak_particles: usize,
}

impl SimStats {
    fn new(teleports: Rc<Cell<u32>>) -> Self {
        Self {
            tick_count: 0,
            last_log_time: 0.0,
            ticks_since_log: 0,
            teleports,
            teleports_at_last_log: 0,
            peak_particles: 0,
        }
    }

    fn record_tick(&mut self, now: f64, particles: &ParticleSystem, timers: &PhaseTimers) {
        self.tick_count += 1;
        self.ticks_since_log += 1;
        self.peak_particles = self.peak_particles.max(particles.count());

        let elapsed = now - self.last_log_time;
        if elapsed >= STATS_LOG_INTERVAL {
            let teleports = self.teleports.get();
            log::info!(
                "t={:.1}s | ticks: {} | particles: {}/{} (peak {}) | teleports: +{} | {}",
                now,
                self.ticks_since_log,
                particles.count(),
                particles.capacity(),
                self.peak_particles,
                teleports - self.teleports_at_last_log,
                timers.summary(),
            );
            self.last_log_time = now;
            self.ticks_since_log = 0;
            self.teleports_at_last_log = teleports;
        }
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Stand-in for the mouse: wanders around and bounces off the edges.
struct Cursor {
    pos: Vec2,
    heading: f32,
}

impl Cursor {
    fn update(&mut self, dt: f32, rng: &mut fastrand::Rng) {
        self.heading += (rng.f32() * 2.0 - 1.0) * CURSOR_TURN_RATE * dt;
        let mut vel = Vec2::from_angle(self.heading) * CURSOR_SPEED;
        let next = self.pos + vel * dt;

        if next.x < 0.0 || next.x > SCREEN.x {
            vel.x = -vel.x;
        }
        if next.y < 0.0 || next.y > SCREEN.y {
            vel.y = -vel.y;
        }
        self.heading = vel.to_angle();
        self.pos = (self.pos + vel * dt).clamp(Vec2::ZERO, SCREEN);
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct App {
    portals: PortalSet,
    portal_b: PortalId,
    teleporter: Teleporter,
    cursor: Cursor,
    particles: ParticleSystem,
    notifier: Notifier<TeleportEvent>,
    rng: fastrand::Rng,
    timers: PhaseTimers,
    stats: SimStats,
    time: f64,
    next_rotate: f64,
}

impl App {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let mut portals = PortalSet::new();
        let portal_a = portals.insert(Portal::new(
            Vec2::new(320.0, 360.0),
            Vec2::from_angle(60f32.to_radians()),
            PORTAL_A_WIDTH,
            PORTAL_THICKNESS,
        ));
        let portal_b = portals.insert(Portal::new(
            Vec2::new(900.0, 360.0),
            Vec2::from_angle(230f32.to_radians()),
            PORTAL_B_WIDTH,
            PORTAL_THICKNESS,
        ));
        portals.link(portal_a, portal_b)?;

        let teleports = Rc::new(Cell::new(0u32));
        let mut notifier = Notifier::new();
        let counter = teleports.clone();
        notifier.add_listener(move |_: &TeleportEvent| counter.set(counter.get() + 1));
        notifier.add_listener(|e: &TeleportEvent| {
            log::debug!(
                "t={:.2}s cursor jumped {} -> {}",
                e.time,
                e.jump.from,
                e.jump.to
            );
        });

        Ok(Self {
            portals,
            portal_b,
            teleporter: Teleporter::new(DEFAULT_COOLDOWN),
            cursor: Cursor {
                pos: SCREEN * 0.5,
                heading: 0.0,
            },
            particles: ParticleSystem::new(MAX_PARTICLES),
            notifier,
            rng: fastrand::Rng::with_seed(RNG_SEED),
            timers: PhaseTimers::new(),
            stats: SimStats::new(teleports),
            time: 0.0,
            next_rotate: ROTATE_INTERVAL,
        })
    }

    /// One fixed-timestep tick.
    fn tick(&mut self, dt: f64) -> Result<(), Box<dyn std::error::Error>> {
        self.time += dt;
        let dt = dt as f32;

        self.timers.begin();
        self.cursor.update(dt, &mut self.rng);
        if self.time >= self.next_rotate {
            self.next_rotate += ROTATE_INTERVAL;
            self.portals
                .get_mut(self.portal_b)?
                .rotate(ROTATE_STEP_DEG.to_radians());
        }
        if self.rng.f32() < CLICK_CHANCE_PER_TICK {
            self.particles
                .burst(self.cursor.pos, SPARKS_PER_CLICK, &mut self.rng);
        }
        self.timers.end(Phase::Input);

        self.timers.begin();
        if let Some(jump) = self
            .teleporter
            .step(&self.portals, self.cursor.pos, self.time)?
        {
            self.cursor.pos = jump.to;
            let heading = Vec2::from_angle(self.cursor.heading);
            self.cursor.heading = self
                .portals
                .map_vector_across(jump.entered, heading)?
                .to_angle();
            self.particles
                .burst(jump.to, SPARKS_PER_TELEPORT, &mut self.rng);
            self.notifier.push(TeleportEvent {
                jump,
                time: self.time,
            });
        }
        self.timers.end(Phase::Teleport);

        self.timers.begin();
        self.particles.update(dt, SCREEN)?;
        self.timers.end(Phase::Particles);

        self.timers.begin();
        self.notifier.flush();
        self.timers.end(Phase::Dispatch);

        self.stats
            .record_tick(self.time, &self.particles, &self.timers);
        Ok(())
    }
}

/// Entry point: run the headless portal/pool demo to completion.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _section = LogSection::new("portal demo");
    let mut app = App::new()?;
    log::info!(
        "Running {SIM_SECONDS}s demo: {} portals, {} particle slots",
        app.portals.len(),
        app.particles.capacity()
    );

    let ticks = (SIM_SECONDS / TICK_RATE).round() as u64;
    for _ in 0..ticks {
        app.tick(TICK_RATE)?;
    }

    app.timers.report();
    log::info!(
        "Finished after {} ticks: {} teleports, {} sparks dropped",
        app.stats.tick_count,
        app.stats.teleports.get(),
        app.particles.dropped,
    );
    Ok(())
}
