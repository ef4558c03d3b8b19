/// Tunable booking rules.
///
/// Defaults match production (one hour of travel between studios, 30-minute
/// trial slots, one trial per rolling year); tests shrink them to exercise
/// boundaries without building year-wide fixtures.
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    /// Minimum gap between the trainer's commitments at two different
    /// studios, in minutes.
    pub inter_studio_buffer_minutes: i64,
    /// A slot of exactly this length is a trial slot.
    pub trial_slot_minutes: i64,
    /// Rolling window in which a client may hold at most one trial booking.
    pub trial_window_days: u64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            inter_studio_buffer_minutes: 60,
            trial_slot_minutes: 30,
            trial_window_days: 365,
        }
    }
}

impl BookingPolicy {
    /// Read overrides from the process environment, falling back to defaults
    /// for anything absent or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            inter_studio_buffer_minutes: env_parse(
                "BOOKING_INTER_STUDIO_BUFFER_MINUTES",
                defaults.inter_studio_buffer_minutes,
            ),
            trial_slot_minutes: env_parse("BOOKING_TRIAL_SLOT_MINUTES", defaults.trial_slot_minutes),
            trial_window_days: env_parse("BOOKING_TRIAL_WINDOW_DAYS", defaults.trial_window_days),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
