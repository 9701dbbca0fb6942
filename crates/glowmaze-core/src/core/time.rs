/// Fixed timestep accumulator. Game logic runs at a constant rate no matter
/// what the host's frame time does.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time and return how many fixed steps to run. Capped at 10
    /// steps per frame to avoid the spiral of death.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Monotonic tick counter. The AI's coarse state re-evaluation runs every
/// Nth tick rather than every tick, so the driver threads this value through.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickCounter {
    count: u64,
}

impl TickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick and return the tick that just ran.
    pub fn advance(&mut self) -> u64 {
        let current = self.count;
        self.count += 1;
        current
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}
