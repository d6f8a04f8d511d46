use instant::Instant;

/// Which part of a demo tick is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Input = 0,
    Teleport = 1,
    Particles = 2,
    Dispatch = 3,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Self::Input, Self::Teleport, Self::Particles, Self::Dispatch];

    pub fn label(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Teleport => "Teleport",
            Self::Particles => "Particles",
            Self::Dispatch => "Dispatch",
        }
    }
}

const EMA_ALPHA: f64 = 0.1;

const PHASES: usize = Phase::ALL.len();

/// Smoothed and lifetime timings for each tick phase.
pub struct PhaseTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; PHASES],
    /// Times each phase has been recorded.
    pub calls: [u64; PHASES],
    /// Summed duration per phase, for the lifetime average.
    total_us: [f64; PHASES],
    /// Slowest recorded run per phase.
    peak_us: [f64; PHASES],
    start: Instant,
}

impl PhaseTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; PHASES],
            calls: [0; PHASES],
            total_us: [0.0; PHASES],
            peak_us: [0.0; PHASES],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes.
    pub fn end(&mut self, phase: Phase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    fn record(&mut self, phase: Phase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
        self.calls[idx] += 1;
        self.total_us[idx] += elapsed_us;
        self.peak_us[idx] = self.peak_us[idx].max(elapsed_us);
    }

    /// Sum of the smoothed phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }

    /// Mean over every recorded run, `None` if the phase never ran.
    pub fn average_us(&self, phase: Phase) -> Option<f64> {
        let idx = phase as usize;
        (self.calls[idx] > 0).then(|| self.total_us[idx] / self.calls[idx] as f64)
    }

    pub fn peak_us(&self, phase: Phase) -> f64 {
        self.peak_us[phase as usize]
    }

    /// Log one line per phase at debug: average, peak and call count.
    pub fn report(&self) {
        log::debug!("|--- PHASE TIMINGS ---|");
        for phase in Phase::ALL {
            match self.average_us(phase) {
                Some(avg) => log::debug!(
                    "- {} - avg: {:.3}ms - peak: {:.3}ms - count: {}",
                    phase.label(),
                    avg / 1000.0,
                    self.peak_us(phase) / 1000.0,
                    self.calls[phase as usize],
                ),
                None => log::debug!("- {} - uncalled", phase.label()),
            }
        }
    }

    /// `Input 1.2us | Teleport 0.4us | ...`
    pub fn summary(&self) -> String {
        Phase::ALL
            .iter()
            .map(|&p| format!("{} {:.1}us", p.label(), self.durations_us[p as usize]))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Default for PhaseTimers {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs `Starting {name}` now and `Done {name} (x.xxxms)` when dropped.
pub struct LogSection {
    name: &'static str,
    start: Instant,
}

impl LogSection {
    pub fn new(name: &'static str) -> Self {
        log::debug!("Starting {name}");
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for LogSection {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        log::debug!("Done {} ({ms:.3}ms)", self.name);
    }
}
