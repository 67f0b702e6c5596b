use std::time::Instant;

/// Longest frame step handed to the systems, so a stall doesn't fling the sun around.
const MAX_DT: f32 = 0.1;

pub struct FrameTimer {
    last: Instant,
    pub dt: f32,
    frames: u32,
    window_start: Instant,
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last: now,
            dt: 0.0,
            frames: 0,
            window_start: now,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.dt = now.duration_since(self.last).as_secs_f32().min(MAX_DT);
        self.last = now;
        self.frames += 1;
    }

    /// Frames per second over the last second, once a second has passed.
    pub fn fps(&mut self) -> Option<f32> {
        let elapsed = self.window_start.elapsed().as_secs_f32();
        if elapsed < 1.0 {
            return None;
        }
        let fps = self.frames as f32 / elapsed;
        self.frames = 0;
        self.window_start = Instant::now();
        Some(fps)
    }
}
