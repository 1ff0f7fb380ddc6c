use std::collections::BTreeMap;

use crate::render::scene::{ElementKey, Shape};

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// Time-based interpolation of one element from `from` to `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub from: Shape,
    pub to: Shape,
    pub start_ms: f64,
    pub delay_ms: f64,
    pub duration_ms: f64,
}

impl Tween {
    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.delay_ms + self.duration_ms
    }

    /// Linear progress in `[0, 1]`; 1 once the tween has ended.
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return if now_ms >= self.start_ms + self.delay_ms { 1.0 } else { 0.0 };
        }
        ((now_ms - self.start_ms - self.delay_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now_ms: f64) -> Shape {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            return self.to.clone();
        }
        self.from.lerp(&self.to, ease_cubic_in_out(t))
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        now_ms >= self.end_ms()
    }
}

/// In-flight tweens keyed by element. Starting a tween for a key replaces
/// (interrupts) whatever was running for it.
#[derive(Debug, Clone, Default)]
pub struct Transitions {
    tweens: BTreeMap<ElementKey, Tween>,
}

impl Transitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, key: ElementKey, tween: Tween) {
        self.tweens.insert(key, tween);
    }

    pub fn cancel(&mut self, key: &ElementKey) {
        self.tweens.remove(key);
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
    }

    pub fn get(&self, key: &ElementKey) -> Option<&Tween> {
        self.tweens.get(key)
    }

    /// Value of `key` at `now_ms`, falling back to `target` when nothing is running.
    pub fn sample_or(&self, key: &ElementKey, target: &Shape, now_ms: f64) -> Shape {
        match self.tweens.get(key) {
            Some(tween) => tween.sample(now_ms),
            None => target.clone(),
        }
    }

    /// Drop tweens whose element no longer exists or that have ended.
    pub fn prune(&mut self, now_ms: f64, keep: impl Fn(&ElementKey) -> bool) {
        self.tweens
            .retain(|key, tween| keep(key) && !tween.is_finished(now_ms));
    }

    pub fn is_animating(&self, now_ms: f64) -> bool {
        self.tweens.values().any(|tween| !tween.is_finished(now_ms))
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}
