use log::warn;
use std::time::{Duration, Instant};

/// Fixed-timestep frame pacing for the display-refresh style loop.
pub struct FrameClock {
    frame_duration: Duration,
    frame_start: Instant,
    last_frame: Instant,
    frame: u64,
}

impl FrameClock {
    /// Create a clock targeting `framerate` frames per second (0 is treated as 1)
    pub fn new(framerate: u32) -> Self {
        let now = Instant::now();
        Self {
            frame_duration: Duration::from_secs_f64(1.0 / framerate.max(1) as f64),
            frame_start: now,
            last_frame: now,
            frame: 0,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Frames started so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Mark the start of a frame and return the time elapsed since the previous one
    pub fn begin_frame(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_start = now;
        self.frame += 1;
        delta
    }

    /// Sleep away whatever is left of the frame budget. Returns the time the frame's work took.
    pub fn end_frame(&mut self) -> Duration {
        let elapsed = self.frame_start.elapsed();
        if elapsed < self.frame_duration {
            spin_sleep::sleep(self.frame_duration - elapsed);
        } else if elapsed > self.frame_duration + self.frame_duration / 2 {
            warn!(
                "Frame lag detected: frame {} took {:?} (budget {:?})",
                self.frame, elapsed, self.frame_duration
            );
        }
        elapsed
    }
}

/// Frames-per-second measurement over windows of at least one second.
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    frames_in_window: u32,
    window: Duration,
    fps: u32,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame that took `delta` since the previous one
    pub fn record(&mut self, delta: Duration) {
        self.frames_in_window += 1;
        self.window += delta;

        if self.window >= Duration::from_secs(1) {
            self.fps = (self.frames_in_window as f64 / self.window.as_secs_f64()).round() as u32;
            self.frames_in_window = 0;
            self.window = Duration::ZERO;
        }
    }

    /// Last completed measurement
    pub fn fps(&self) -> u32 {
        self.fps
    }
}
