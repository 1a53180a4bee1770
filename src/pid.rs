use core::time::Duration;

use num_traits::Float;

/// Reasons a PID or motion-profile parameter was rejected.
///
/// Also returned by [`Constraints::new`](crate::profile::Constraints::new) for profile limits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PidConfigError {
    /// The proportional gain was negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("Proportional gain must be non-negative and finite")
    )]
    InvalidProportionalGain,

    /// The integral gain was negative or not finite.
    #[cfg_attr(feature = "std", error("Integral gain must be non-negative and finite"))]
    InvalidIntegralGain,

    /// The derivative gain was negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("Derivative gain must be non-negative and finite")
    )]
    InvalidDerivativeGain,

    /// The period was zero.
    #[cfg_attr(feature = "std", error("Period must be greater than zero"))]
    InvalidPeriod,

    /// The integrator range was empty or contained NaN.
    #[cfg_attr(
        feature = "std",
        error("Integrator minimum must be strictly less than integrator maximum")
    )]
    InvalidIntegratorRange,

    /// A tolerance was negative or NaN.
    #[cfg_attr(feature = "std", error("Tolerances must be non-negative"))]
    InvalidTolerance,

    /// The continuous input range was empty or not finite.
    #[cfg_attr(
        feature = "std",
        error("Continuous input range must be finite with minimum below maximum")
    )]
    InvalidInputRange,

    /// The profile velocity limit was not positive and finite.
    #[cfg_attr(
        feature = "std",
        error("Maximum velocity must be positive and finite")
    )]
    InvalidMaxVelocity,

    /// The profile acceleration limit was not positive and finite.
    #[cfg_attr(
        feature = "std",
        error("Maximum acceleration must be positive and finite")
    )]
    InvalidMaxAcceleration,
}

pub(crate) fn reject<T>(error: PidConfigError) -> Result<T, PidConfigError> {
    log::debug!("Rejected controller configuration: {:?}", error);
    Err(error)
}

/// Gains, timing and limits of a [`PidController`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidConfig {
    /// Proportional gain coefficient.
    /// Defaults to 1.0.
    kp: f64,

    /// Integral gain coefficient.
    /// Defaults to 0.0.
    ki: f64,

    /// Derivative gain coefficient.
    /// Defaults to 0.0.
    kd: f64,

    /// Period between two calls to `calculate`, used to scale the I and D terms.
    /// Defaults to 20ms, the tick of a typical 50Hz scheduler.
    period: Duration,

    /// Lower bound of the integral term's contribution to the output.
    /// Defaults to -1.0.
    integrator_min: f64,

    /// Upper bound of the integral term's contribution to the output.
    /// Defaults to 1.0.
    integrator_max: f64,

    /// Largest position error still considered at the setpoint.
    /// Defaults to 0.05.
    position_tolerance: f64,

    /// Largest velocity error still considered at the setpoint.
    /// Defaults to positive infinity, i.e. velocity is not checked.
    velocity_tolerance: f64,

    /// Range over which the measurement wraps around, e.g. [-pi, pi] for a turret.
    /// Defaults to None.
    input_range: Option<(f64, f64)>,
}

impl Default for PidConfig {
    fn default() -> Self {
        PidConfig {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            period: Duration::from_millis(20),
            integrator_min: -1.0,
            integrator_max: 1.0,
            position_tolerance: 0.05,
            velocity_tolerance: f64::INFINITY,
            input_range: None,
        }
    }
}

impl PidConfig {
    /// Returns the proportional gain.
    pub fn kp(&self) -> f64 {
        self.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> f64 {
        self.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> f64 {
        self.kd
    }

    /// Convenience method that returns the proportional, integral, and derivative gains together as a tuple.
    pub fn gains(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }

    /// Returns the period between two controller updates.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns the integrator range as `(min, max)`.
    pub fn integrator_range(&self) -> (f64, f64) {
        (self.integrator_min, self.integrator_max)
    }

    /// Returns the position tolerance.
    pub fn position_tolerance(&self) -> f64 {
        self.position_tolerance
    }

    /// Returns the velocity tolerance.
    pub fn velocity_tolerance(&self) -> f64 {
        self.velocity_tolerance
    }

    /// Returns the continuous input range, if continuous input is enabled.
    pub fn input_range(&self) -> Option<(f64, f64)> {
        self.input_range
    }

    /// Returns whether continuous input is enabled.
    pub fn is_continuous_input_enabled(&self) -> bool {
        self.input_range.is_some()
    }

    /// Sets the proportional gain.
    ///
    /// # Errors
    /// - `InvalidProportionalGain` if the gain is negative or not finite.
    pub fn set_kp(&mut self, kp: f64) -> Result<(), PidConfigError> {
        if kp < 0.0 || !kp.is_finite() {
            return reject(PidConfigError::InvalidProportionalGain);
        }
        self.kp = kp;
        Ok(())
    }

    /// Sets the integral gain.
    ///
    /// A zero integral gain disables integration entirely; the accumulated error is then held at
    /// whatever value it had.
    ///
    /// # Errors
    /// - `InvalidIntegralGain` if the gain is negative or not finite.
    pub fn set_ki(&mut self, ki: f64) -> Result<(), PidConfigError> {
        if ki < 0.0 || !ki.is_finite() {
            return reject(PidConfigError::InvalidIntegralGain);
        }
        self.ki = ki;
        Ok(())
    }

    /// Sets the derivative gain.
    ///
    /// # Errors
    /// - `InvalidDerivativeGain` if the gain is negative or not finite.
    pub fn set_kd(&mut self, kd: f64) -> Result<(), PidConfigError> {
        if kd < 0.0 || !kd.is_finite() {
            return reject(PidConfigError::InvalidDerivativeGain);
        }
        self.kd = kd;
        Ok(())
    }

    /// Convenience method to set the proportional, integral, and derivative gains together.
    ///
    /// Gains are applied in order and the first invalid one aborts the update, so earlier gains may
    /// already have changed when an error is returned.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) -> Result<(), PidConfigError> {
        self.set_kp(kp)?;
        self.set_ki(ki)?;
        self.set_kd(kd)
    }

    /// Sets the period between two controller updates.
    ///
    /// This must match the rate at which `calculate` is actually called, otherwise the integral
    /// and derivative terms and the motion profile are scaled incorrectly.
    ///
    /// # Errors
    /// - `InvalidPeriod` if the period is zero.
    pub fn set_period(&mut self, period: Duration) -> Result<(), PidConfigError> {
        if period.is_zero() {
            return reject(PidConfigError::InvalidPeriod);
        }
        self.period = period;
        Ok(())
    }

    /// Sets the range the integral term may contribute to the output.
    ///
    /// The accumulated error is clamped so that `ki * total_error` stays within this range,
    /// bounding windup. Infinite bounds are allowed.
    ///
    /// # Errors
    /// - `InvalidIntegratorRange` if `min >= max` or either bound is NaN.
    pub fn set_integrator_range(&mut self, min: f64, max: f64) -> Result<(), PidConfigError> {
        if min.is_nan() || max.is_nan() || min >= max {
            return reject(PidConfigError::InvalidIntegratorRange);
        }
        self.integrator_min = min;
        self.integrator_max = max;
        Ok(())
    }

    /// Sets the position and velocity tolerances used by `at_setpoint`.
    ///
    /// # Errors
    /// - `InvalidTolerance` if either tolerance is negative or NaN.
    pub fn set_tolerance(
        &mut self,
        position_tolerance: f64,
        velocity_tolerance: f64,
    ) -> Result<(), PidConfigError> {
        if position_tolerance.is_nan()
            || velocity_tolerance.is_nan()
            || position_tolerance < 0.0
            || velocity_tolerance < 0.0
        {
            return reject(PidConfigError::InvalidTolerance);
        }
        self.position_tolerance = position_tolerance;
        self.velocity_tolerance = velocity_tolerance;
        Ok(())
    }

    /// Treats `min` and `max` as the same point, so errors are taken along the shortest way
    /// around the range.
    ///
    /// # Errors
    /// - `InvalidInputRange` if `min >= max` or either bound is not finite.
    pub fn enable_continuous_input(&mut self, min: f64, max: f64) -> Result<(), PidConfigError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return reject(PidConfigError::InvalidInputRange);
        }
        self.input_range = Some((min, max));
        Ok(())
    }

    /// Turns continuous input off.
    pub fn disable_continuous_input(&mut self) {
        self.input_range = None;
    }

    /// Maps an error into `[-range / 2, range / 2]` when continuous input is enabled; returns it
    /// unchanged otherwise.
    pub fn continuous_error(&self, error: f64) -> f64 {
        match self.input_range {
            Some((min, max)) => {
                let range = max - min;
                let half_range = range / 2.0;
                let mut wrapped = error % range;
                if wrapped > half_range {
                    wrapped -= range;
                } else if wrapped < -half_range {
                    wrapped += range;
                }
                wrapped
            }
            None => error,
        }
    }

    fn period_secs(&self) -> f64 {
        self.period.as_secs_f64()
    }
}

/// Fluent construction of a validated [`PidConfig`].
///
/// Unset parameters keep their defaults. Validation happens in [`PidConfigBuilder::build`] with
/// the same rules as the corresponding setters.
#[derive(Copy, Clone, Debug, Default)]
pub struct PidConfigBuilder {
    kp: Option<f64>,
    ki: Option<f64>,
    kd: Option<f64>,
    period: Option<Duration>,
    integrator_range: Option<(f64, f64)>,
    tolerance: Option<(f64, f64)>,
    input_range: Option<(f64, f64)>,
}

impl PidConfigBuilder {
    /// Sets the proportional gain.
    pub fn kp(mut self, kp: f64) -> Self {
        self.kp = Some(kp);
        self
    }

    /// Sets the integral gain.
    pub fn ki(mut self, ki: f64) -> Self {
        self.ki = Some(ki);
        self
    }

    /// Sets the derivative gain.
    pub fn kd(mut self, kd: f64) -> Self {
        self.kd = Some(kd);
        self
    }

    /// Sets the period between two controller updates.
    pub fn period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }

    /// Sets the integrator range.
    pub fn integrator_range(mut self, min: f64, max: f64) -> Self {
        self.integrator_range = Some((min, max));
        self
    }

    /// Sets the position and velocity tolerances.
    pub fn tolerance(mut self, position_tolerance: f64, velocity_tolerance: f64) -> Self {
        self.tolerance = Some((position_tolerance, velocity_tolerance));
        self
    }

    /// Enables continuous input over `[min, max]`.
    pub fn continuous_input(mut self, min: f64, max: f64) -> Self {
        self.input_range = Some((min, max));
        self
    }

    /// Validates every parameter that was set and returns the resulting configuration.
    pub fn build(self) -> Result<PidConfig, PidConfigError> {
        let mut config = PidConfig::default();
        if let Some(kp) = self.kp {
            config.set_kp(kp)?;
        }
        if let Some(ki) = self.ki {
            config.set_ki(ki)?;
        }
        if let Some(kd) = self.kd {
            config.set_kd(kd)?;
        }
        if let Some(period) = self.period {
            config.set_period(period)?;
        }
        if let Some((min, max)) = self.integrator_range {
            config.set_integrator_range(min, max)?;
        }
        if let Some((position_tolerance, velocity_tolerance)) = self.tolerance {
            config.set_tolerance(position_tolerance, velocity_tolerance)?;
        }
        if let Some((min, max)) = self.input_range {
            config.enable_continuous_input(min, max)?;
        }
        Ok(config)
    }
}

/// A stateful, fixed-period PID controller.
///
/// Each call to `calculate` is assumed to happen exactly one period after the previous one, which
/// is what a periodic scheduler guarantees. The first call after construction or `reset` seeds the
/// previous error with the current one, so the derivative term does not kick.
#[derive(Copy, Clone, Debug)]
pub struct PidController {
    config: PidConfig,
    setpoint: f64,
    position_error: f64,
    velocity_error: f64,
    previous_error: f64,
    total_error: f64,
    need_initialize: bool,
}

impl PidController {
    /// Creates a controller that starts uninitialized: the first `calculate` seeds the error
    /// history.
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            setpoint: 0.0,
            position_error: 0.0,
            velocity_error: 0.0,
            previous_error: 0.0,
            total_error: 0.0,
            need_initialize: true,
        }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    /// Returns the configuration; changes apply from the next `calculate`.
    pub fn config_mut(&mut self) -> &mut PidConfig {
        &mut self.config
    }

    /// Returns the setpoint passed to the last `calculate`.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Returns the position error from the last `calculate`.
    pub fn position_error(&self) -> f64 {
        self.position_error
    }

    /// Returns the rate of change of the error from the last `calculate`.
    pub fn velocity_error(&self) -> f64 {
        self.velocity_error
    }

    /// Returns the accumulated (time-integrated) error.
    pub fn total_error(&self) -> f64 {
        self.total_error
    }

    /// Returns false until the first `calculate` after construction or `reset`.
    pub fn is_initialized(&self) -> bool {
        !self.need_initialize
    }

    /// Returns true if both errors are within the configured tolerances.
    pub fn at_setpoint(&self) -> bool {
        Float::abs(self.position_error) < self.config.position_tolerance
            && Float::abs(self.velocity_error) < self.config.velocity_tolerance
    }

    /// Computes the control output for `measurement` tracking `setpoint`, one period after the
    /// previous call.
    pub fn calculate(&mut self, measurement: f64, setpoint: f64) -> f64 {
        let period = self.config.period_secs();
        self.setpoint = setpoint;

        let error = self.config.continuous_error(setpoint - measurement);

        // First sample after (re)initialization has no history to differentiate against
        if self.need_initialize {
            self.previous_error = error;
            self.need_initialize = false;
        } else {
            self.previous_error = self.position_error;
        }

        self.position_error = error;
        self.velocity_error = (self.position_error - self.previous_error) / period;

        if self.config.ki != 0.0 {
            // Clamp the accumulator, not the term, so windup is bounded in output units
            self.total_error = (self.total_error + self.position_error * period).clamp(
                self.config.integrator_min / self.config.ki,
                self.config.integrator_max / self.config.ki,
            );
        }

        self.config.kp * self.position_error
            + self.config.ki * self.total_error
            + self.config.kd * self.velocity_error
    }

    /// Clears the accumulated error and the error history.
    pub fn reset(&mut self) {
        self.position_error = 0.0;
        self.velocity_error = 0.0;
        self.previous_error = 0.0;
        self.total_error = 0.0;
        self.need_initialize = true;
    }
}
