//! Per-stream alert debouncing.
//!
//! `DebounceState` is the only mutable state in the pipeline. It is owned
//! by the stream session and passed by `&mut` into every analysis call;
//! it must never be shared across concurrent streams. The caller supplies
//! a monotonic non-decreasing time source (seconds).

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::alert::AlertKind;

/// Per-kind cooldown configuration, in seconds.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Cooldowns {
    /// Minimum interval between LoneWoman alerts.
    pub lone_woman_secs: f64,
    /// Minimum interval between MoreMen alerts.
    pub more_men_secs: f64,
    /// Shared minimum interval between gesture alerts of any type.
    pub gesture_secs: f64,
    /// Minimum spacing between counted wave ticks.
    pub wave_tick_secs: f64,
    /// Ticks required before a wave converts into a WavingHands signal.
    pub min_wave_count: u32,
}

impl Default for Cooldowns {
    fn default() -> Self {
        Self {
            lone_woman_secs: 5.0,
            more_men_secs: 5.0,
            gesture_secs: 2.0,
            wave_tick_secs: 0.2,
            min_wave_count: 2,
        }
    }
}

impl Cooldowns {
    /// Reject unusable values eagerly; bad configuration is fatal at
    /// construction time, not at analysis time.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("lone_woman_secs", self.lone_woman_secs),
            ("more_men_secs", self.more_men_secs),
            ("gesture_secs", self.gesture_secs),
            ("wave_tick_secs", self.wave_tick_secs),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(anyhow!("cooldown {} must be a positive number", name));
            }
        }
        if self.min_wave_count == 0 {
            return Err(anyhow!("min_wave_count must be at least 1"));
        }
        Ok(())
    }

    fn for_kind(&self, kind: AlertKind) -> f64 {
        match kind {
            AlertKind::LoneWoman => self.lone_woman_secs,
            AlertKind::MoreMen => self.more_men_secs,
            AlertKind::SosGesture => self.gesture_secs,
        }
    }
}

/// Mutable debounce state for one stream.
///
/// Fresh state has never fired, so the first candidate of each kind always
/// passes. The wave counter is a micro-debounce feeding only the
/// WavingHands rule; it resets when that alert actually fires.
#[derive(Clone, Debug)]
pub struct DebounceState {
    cooldowns: Cooldowns,
    last_lone_woman: Option<f64>,
    last_more_men: Option<f64>,
    last_gesture: Option<f64>,
    wave_count: u32,
    last_wave_tick: Option<f64>,
}

impl DebounceState {
    pub fn new(cooldowns: Cooldowns) -> Self {
        Self {
            cooldowns,
            last_lone_woman: None,
            last_more_men: None,
            last_gesture: None,
            wave_count: 0,
            last_wave_tick: None,
        }
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    fn last_fired(&self, kind: AlertKind) -> Option<f64> {
        match kind {
            AlertKind::LoneWoman => self.last_lone_woman,
            AlertKind::MoreMen => self.last_more_men,
            AlertKind::SosGesture => self.last_gesture,
        }
    }

    /// Whether an alert of `kind` may fire at `now`. When this returns
    /// true the caller must emit the alert and call `record_fired` with
    /// the same `now`.
    pub fn should_fire(&self, kind: AlertKind, now: f64) -> bool {
        match self.last_fired(kind) {
            None => true,
            Some(last) => now - last >= self.cooldowns.for_kind(kind),
        }
    }

    /// Record an emitted alert.
    pub fn record_fired(&mut self, kind: AlertKind, now: f64) {
        let slot = match kind {
            AlertKind::LoneWoman => &mut self.last_lone_woman,
            AlertKind::MoreMen => &mut self.last_more_men,
            AlertKind::SosGesture => &mut self.last_gesture,
        };
        *slot = Some(now);
    }

    /// Feed one qualifying wave observation. The tick is counted only when
    /// at least `wave_tick_secs` elapsed since the previous counted tick.
    /// Returns true when the counted ticks reach `min_wave_count`, i.e.
    /// the wave converts into a WavingHands signal.
    pub fn register_wave_tick(&mut self, now: f64) -> bool {
        let spaced = match self.last_wave_tick {
            None => true,
            Some(last) => now - last > self.cooldowns.wave_tick_secs,
        };
        if !spaced {
            return false;
        }
        self.wave_count += 1;
        self.last_wave_tick = Some(now);
        self.wave_count >= self.cooldowns.min_wave_count
    }

    /// Reset the wave counter. Called when a WavingHands alert fires.
    pub fn reset_wave(&mut self) {
        self.wave_count = 0;
    }

    pub fn wave_count(&self) -> u32 {
        self.wave_count
    }
}

impl Default for DebounceState {
    fn default() -> Self {
        Self::new(Cooldowns::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_fires_immediately() {
        let state = DebounceState::default();
        assert!(state.should_fire(AlertKind::LoneWoman, 0.0));
        assert!(state.should_fire(AlertKind::MoreMen, 0.0));
        assert!(state.should_fire(AlertKind::SosGesture, 0.0));
    }

    #[test]
    fn second_candidate_within_cooldown_is_blocked() {
        let mut state = DebounceState::default();
        state.record_fired(AlertKind::MoreMen, 10.0);
        assert!(!state.should_fire(AlertKind::MoreMen, 12.0));
        assert!(!state.should_fire(AlertKind::MoreMen, 14.999));
        assert!(state.should_fire(AlertKind::MoreMen, 15.0));
    }

    #[test]
    fn kinds_are_debounced_independently() {
        let mut state = DebounceState::default();
        state.record_fired(AlertKind::LoneWoman, 10.0);
        assert!(!state.should_fire(AlertKind::LoneWoman, 11.0));
        assert!(state.should_fire(AlertKind::MoreMen, 11.0));
        assert!(state.should_fire(AlertKind::SosGesture, 11.0));
    }

    #[test]
    fn wave_ticks_need_spacing() {
        let mut state = DebounceState::default();
        assert!(!state.register_wave_tick(1.0)); // first counted tick
        assert_eq!(state.wave_count(), 1);
        // Too soon: not counted, no signal.
        assert!(!state.register_wave_tick(1.1));
        assert_eq!(state.wave_count(), 1);
        // Spaced: counted, reaches min_wave_count=2.
        assert!(state.register_wave_tick(1.25));
        assert_eq!(state.wave_count(), 2);
    }

    #[test]
    fn wave_reset_starts_over() {
        let mut state = DebounceState::default();
        state.register_wave_tick(1.0);
        state.register_wave_tick(1.3);
        state.reset_wave();
        assert_eq!(state.wave_count(), 0);
        assert!(!state.register_wave_tick(2.0));
    }

    #[test]
    fn bad_cooldowns_are_rejected() {
        let mut cooldowns = Cooldowns::default();
        cooldowns.gesture_secs = 0.0;
        assert!(cooldowns.validate().is_err());

        let mut cooldowns = Cooldowns::default();
        cooldowns.lone_woman_secs = -5.0;
        assert!(cooldowns.validate().is_err());

        let mut cooldowns = Cooldowns::default();
        cooldowns.min_wave_count = 0;
        assert!(cooldowns.validate().is_err());

        assert!(Cooldowns::default().validate().is_ok());
    }
}
