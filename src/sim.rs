use core::time::Duration;

use nalgebra as na;

pub enum WaveForm {
    Sine,
    Square,
}

/// Produces a time-varying goal position, for exercising commands that track a moving goal.
pub struct SignalGenerator {
    fcn: fn(f64) -> f64,
    amplitude: f64,
    offset: f64,
}

impl SignalGenerator {
    pub fn new(waveform: WaveForm, amplitude: f64, offset: f64) -> Self {
        Self {
            fcn: match waveform {
                WaveForm::Sine => f64::sin,
                WaveForm::Square => |x| x.sin().signum(),
            },
            amplitude,
            offset,
        }
    }

    pub fn generate(&self, elapsed: Duration) -> f64 {
        self.amplitude * (self.fcn)(elapsed.as_secs_f64()) + self.offset
    }
}

/// A position mechanism (elevator carriage, arm joint) driven by a DC motor, described by its
/// velocity and acceleration feedforward constants.
pub struct MotorMechanism {
    /// Volts per unit of velocity at steady state.
    pub kv: f64,
    /// Volts per unit of acceleration.
    pub ka: f64,
}

impl MotorMechanism {
    /// Implements the state-space realization of the mechanism:
    /// ┌     ┐   ┌              ┐┌    ┐   ┌      ┐
    /// │ p'  │ = │  0     1     ││ p  │ + │ 0    │ u
    /// │ p'' │   │  0  -kv/ka   ││ p' │   │ 1/ka │
    /// └     ┘   └              ┘└    ┘   └      ┘
    ///     ┌      ┐┌    ┐
    /// p = │ 1  0 ││ p  │
    ///     └      ┘│ p' │
    ///             └    ┘
    pub fn f(&self, x: na::Vector2<f64>, u: f64) -> na::Vector2<f64> {
        let mat_a = na::Matrix2::new(0.0, 1.0, 0.0, -self.kv / self.ka);
        let mat_b = na::Vector2::new(0.0, 1.0 / self.ka);

        mat_a * x + mat_b * u
    }

    pub fn h(&self, x: na::Vector2<f64>) -> f64 {
        x[0]
    }

    /// Advances the state by `dt` with the input held constant, using classic RK4.
    pub fn step(&self, x: na::Vector2<f64>, u: f64, dt: Duration) -> na::Vector2<f64> {
        let h = dt.as_secs_f64();
        let k1 = self.f(x, u);
        let k2 = self.f(x + k1 * (h / 2.0), u);
        let k3 = self.f(x + k2 * (h / 2.0), u);
        let k4 = self.f(x + k3 * h, u);
        x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
    }
}
