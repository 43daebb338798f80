use shared::domain::TempoTarget;

/// Slider and pedometer-switch state for the real-time screen.
#[derive(Debug, Clone)]
pub struct TempoTargetController {
    target: TempoTarget,
    pedometer_enabled: bool,
}

impl Default for TempoTargetController {
    fn default() -> Self {
        Self {
            target: TempoTarget::default(),
            pedometer_enabled: true,
        }
    }
}

impl TempoTargetController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bpm` clamped to the slider range and returns what was stored.
    pub fn set_target(&mut self, bpm: i64) -> TempoTarget {
        self.target = TempoTarget::clamped(bpm);
        self.target
    }

    pub fn target(&self) -> TempoTarget {
        self.target
    }

    pub fn target_label(&self) -> String {
        format!("{} BPM", self.target.bpm())
    }

    pub fn set_pedometer_enabled(&mut self, enabled: bool) {
        self.pedometer_enabled = enabled;
    }

    pub fn pedometer_enabled(&self) -> bool {
        self.pedometer_enabled
    }
}
