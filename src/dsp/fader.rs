//! Slew-limited parameter smoothing.

/*
Declick Faders
==============

Jumping a gain or a delay time from one sample to the next is audible as a
click. A declick fader chases its target by at most `step` per sample:

    target ─────────────────────────────
                        ╱
                      ╱    ← |slope| ≤ step per proceed()
                    ╱
    value ────────╱

A fader with step s covers a distance d in ceil(d / s) samples, and lands
on the target exactly (it never overshoots). The sample count is fixed when
the target is set, so rounding in the accumulated value never costs an
extra sample.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclickFader {
    target: f64,
    step: f64,
    value: f64,
    remaining: u64,
}

impl DeclickFader {
    /// Start settled at `value`, moving at most `step` per `proceed()`.
    pub fn new(value: f64, step: f64) -> Self {
        Self {
            target: value,
            step: step.abs(),
            value,
            remaining: 0,
        }
    }

    /// Retarget, then take one step towards the new target.
    pub fn set(&mut self, target: f64) {
        self.target = target;
        // saturates: a zero step never arrives, a zero distance arrives now
        self.remaining = ((target - self.value).abs() / self.step).ceil() as u64;
        self.proceed();
    }

    pub fn set_with_step(&mut self, target: f64, step: f64) {
        self.step = step.abs();
        self.set(target);
    }

    /// Move one step towards the target.
    #[inline]
    pub fn proceed(&mut self) {
        if self.remaining <= 1 {
            self.value = self.target;
            self.remaining = 0;
        } else {
            self.value += self.step.copysign(self.target - self.value);
            self.remaining -= 1;
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}
