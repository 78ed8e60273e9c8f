/// Frame timing sampled around each tick.
#[derive(Debug, Default)]
pub struct FrameStats {
    frame_start: Option<f64>,
    window_start: Option<f64>,
    frames: u32,
    busy_ms: f64,
}

/// Summary of the last completed one-second window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub fps: f64,
    pub mean_frame_ms: f64,
}

const WINDOW_MS: f64 = 1000.0;

impl FrameStats {
    pub fn begin(&mut self, now_ms: f64) {
        self.frame_start = Some(now_ms);
        self.window_start.get_or_insert(now_ms);
    }

    /// Closes the current sample; returns a report once per second.
    pub fn end(&mut self, now_ms: f64) -> Option<FrameReport> {
        let start = self.frame_start.take()?;
        self.frames += 1;
        self.busy_ms += (now_ms - start).max(0.0);

        let window_start = self.window_start?;
        let elapsed = now_ms - window_start;
        if elapsed < WINDOW_MS {
            return None;
        }
        let report = FrameReport {
            fps: f64::from(self.frames) * 1000.0 / elapsed,
            mean_frame_ms: self.busy_ms / f64::from(self.frames),
        };
        log::debug!("{:.1} fps, {:.2} ms/frame", report.fps, report.mean_frame_ms);
        self.window_start = Some(now_ms);
        self.frames = 0;
        self.busy_ms = 0.0;
        Some(report)
    }
}
