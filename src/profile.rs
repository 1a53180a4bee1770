use core::marker::PhantomData;
use core::time::Duration;

use num_traits::Float;

use crate::pid::{reject, PidConfigError};
use crate::units::Distance;

/// An instantaneous sample of a motion profile: where the mechanism should be and how fast it
/// should be moving there.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct State<D: Distance> {
    /// Position in the mechanism's dimension.
    pub position: D,
    /// Velocity in the mechanism's dimension per second.
    pub velocity: D::Velocity,
}

impl<D: Distance> State<D> {
    /// A state at `position` moving with `velocity`.
    pub fn new(position: D, velocity: D::Velocity) -> Self {
        Self { position, velocity }
    }

    /// A state at `position` with zero velocity.
    pub fn at_rest(position: D) -> Self {
        Self {
            position,
            velocity: D::velocity_from_base(0.0),
        }
    }

    /// Zero position, zero velocity.
    pub fn zero() -> Self {
        Self::at_rest(D::from_base(0.0))
    }

    /// Strips the units, leaving values in base units.
    pub fn to_base(self) -> State<f64> {
        State {
            position: self.position.to_base(),
            velocity: D::velocity_to_base(self.velocity),
        }
    }

    /// Attaches units to a state expressed in base units.
    pub fn from_base(state: State<f64>) -> Self {
        Self {
            position: D::from_base(state.position),
            velocity: D::velocity_from_base(state.velocity),
        }
    }
}

impl<D: Distance> Default for State<D> {
    fn default() -> Self {
        Self::zero()
    }
}

/// Velocity and acceleration limits of a trapezoidal profile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Constraints<D: Distance> {
    pub(crate) max_velocity: D::Velocity,
    pub(crate) max_acceleration: D::Acceleration,
}

impl<D: Distance> Constraints<D> {
    /// Validates the limits. Profile limits share [`PidConfigError`] with the PID parameters, so
    /// everything that configures a profiled controller fails with one error type.
    ///
    /// # Errors
    /// - `InvalidMaxVelocity` if the velocity limit is not positive and finite.
    /// - `InvalidMaxAcceleration` if the acceleration limit is not positive and finite.
    pub fn new(
        max_velocity: D::Velocity,
        max_acceleration: D::Acceleration,
    ) -> Result<Self, PidConfigError> {
        let velocity = D::velocity_to_base(max_velocity);
        if velocity <= 0.0 || !velocity.is_finite() {
            return reject(PidConfigError::InvalidMaxVelocity);
        }
        let acceleration = D::acceleration_to_base(max_acceleration);
        if acceleration <= 0.0 || !acceleration.is_finite() {
            return reject(PidConfigError::InvalidMaxAcceleration);
        }
        Ok(Self {
            max_velocity,
            max_acceleration,
        })
    }

    /// Returns the velocity limit.
    pub fn max_velocity(&self) -> D::Velocity {
        self.max_velocity
    }

    /// Returns the acceleration limit.
    pub fn max_acceleration(&self) -> D::Acceleration {
        self.max_acceleration
    }

    /// Strips the units, leaving limits in base units.
    pub fn to_base(self) -> Constraints<f64> {
        Constraints {
            max_velocity: D::velocity_to_base(self.max_velocity),
            max_acceleration: D::acceleration_to_base(self.max_acceleration),
        }
    }
}

/// A trapezoid-shaped velocity profile.
///
/// The profile accelerates at the maximum acceleration up to the maximum velocity, cruises, then
/// decelerates so that it arrives at the goal with the goal's velocity. When the distance is too
/// short to reach cruise velocity the trapezoid degenerates into a triangle.
///
/// A profile is cheap to build and is meant to be rebuilt from the latest setpoint on every tick,
/// which is how a moving goal is tracked:
///
/// ```rust
/// use core::time::Duration;
/// use profiled_pid_command::profile::{Constraints, State, TrapezoidProfile};
///
/// let constraints = Constraints::<f64>::new(1.0, 1.0).expect("Invalid constraints");
/// let mut setpoint = State::zero();
/// let goal = State::at_rest(10.0);
///
/// for _ in 0..50 {
///     let profile = TrapezoidProfile::new(constraints, goal, setpoint);
///     setpoint = profile.calculate(Duration::from_millis(20));
/// }
/// assert!(setpoint.velocity <= 1.0);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct TrapezoidProfile<D: Distance = f64> {
    // +1 if the profile moves towards increasing positions, -1 otherwise. Internally the profile
    // is always solved in the increasing direction.
    direction: f64,
    constraints: Constraints<f64>,
    initial: State<f64>,
    goal: State<f64>,
    end_accel: f64,
    end_full_speed: f64,
    end_deccel: f64,
    _dimension: PhantomData<D>,
}

impl<D: Distance> TrapezoidProfile<D> {
    /// Plans a profile from `initial` to `goal` under `constraints`.
    pub fn new(constraints: Constraints<D>, goal: State<D>, initial: State<D>) -> Self {
        let constraints = constraints.to_base();
        let goal = goal.to_base();
        let initial = initial.to_base();

        let direction = if initial.position > goal.position {
            -1.0
        } else {
            1.0
        };
        let mut initial = directed(initial, direction);
        let goal = directed(goal, direction);

        let max_velocity = constraints.max_velocity;
        let max_acceleration = constraints.max_acceleration;

        if initial.velocity > max_velocity {
            initial.velocity = max_velocity;
        }

        // Extend the trapezoid to where it would start and end at rest, solve the symmetric
        // shape, then cut off the parts that lie before the initial and after the goal state.
        let cutoff_begin = initial.velocity / max_acceleration;
        let cutoff_dist_begin = cutoff_begin * cutoff_begin * max_acceleration / 2.0;

        let cutoff_end = goal.velocity / max_acceleration;
        let cutoff_dist_end = cutoff_end * cutoff_end * max_acceleration / 2.0;

        let full_trapezoid_dist =
            cutoff_dist_begin + (goal.position - initial.position) + cutoff_dist_end;
        let mut accel_time = max_velocity / max_acceleration;

        let mut full_speed_dist = full_trapezoid_dist - accel_time * accel_time * max_acceleration;

        // Too short to reach cruise velocity
        if full_speed_dist < 0.0 {
            accel_time = Float::sqrt(full_trapezoid_dist / max_acceleration);
            full_speed_dist = 0.0;
        }

        let end_accel = accel_time - cutoff_begin;
        let end_full_speed = end_accel + full_speed_dist / max_velocity;
        let end_deccel = end_full_speed + accel_time - cutoff_end;

        Self {
            direction,
            constraints,
            initial,
            goal,
            end_accel,
            end_full_speed,
            end_deccel,
            _dimension: PhantomData,
        }
    }

    /// Returns the state of the profile `t` after its start.
    pub fn calculate(&self, t: Duration) -> State<D> {
        let sample = self.sample(t.as_secs_f64());
        State::from_base(directed(sample, self.direction))
    }

    /// Returns the time the profile takes to reach the goal.
    pub fn total_time(&self) -> Duration {
        secs_to_duration(self.end_deccel)
    }

    /// Returns true if the profile has reached the goal at time `t`.
    pub fn is_finished(&self, t: Duration) -> bool {
        t >= self.total_time()
    }

    /// Returns the time from the start of the profile until it first reaches `target`.
    ///
    /// Targets the profile never passes are clamped: positions behind the start give zero, and
    /// positions at or beyond the goal give the total time.
    pub fn time_left_until(&self, target: D) -> Duration {
        let target = target.to_base() * self.direction;
        let max_acceleration = self.constraints.max_acceleration;

        if target <= self.initial.position {
            return Duration::ZERO;
        }
        if target >= self.goal.position {
            return self.total_time();
        }

        let accel_end_position = self.sample(self.end_accel).position;
        let cruise_end_position = self.sample(self.end_full_speed).position;

        let secs = if target <= accel_end_position {
            // p0 + v0 t + a t^2 / 2 = target
            let v0 = self.initial.velocity;
            let distance = target - self.initial.position;
            (-v0 + Float::sqrt((v0 * v0 + 2.0 * max_acceleration * distance).max(0.0)))
                / max_acceleration
        } else if target <= cruise_end_position {
            self.end_accel + (target - accel_end_position) / self.constraints.max_velocity
        } else {
            // Solve backwards from the goal for the time remaining in the deceleration phase
            let vg = self.goal.velocity;
            let remaining = self.goal.position - target;
            let time_left = (-vg + Float::sqrt((vg * vg + 2.0 * max_acceleration * remaining).max(0.0)))
                / max_acceleration;
            self.end_deccel - time_left
        };

        secs_to_duration(secs)
    }

    // Samples the profile in the increasing direction.
    fn sample(&self, t: f64) -> State<f64> {
        let max_velocity = self.constraints.max_velocity;
        let max_acceleration = self.constraints.max_acceleration;
        let mut result = self.initial;

        if t < self.end_accel {
            result.velocity += t * max_acceleration;
            result.position += (self.initial.velocity + t * max_acceleration / 2.0) * t;
        } else if t < self.end_full_speed {
            result.velocity = max_velocity;
            result.position += (self.initial.velocity
                + self.end_accel * max_acceleration / 2.0)
                * self.end_accel
                + max_velocity * (t - self.end_accel);
        } else if t <= self.end_deccel {
            let time_left = self.end_deccel - t;
            result.velocity = self.goal.velocity + time_left * max_acceleration;
            result.position = self.goal.position
                - (self.goal.velocity + time_left * max_acceleration / 2.0) * time_left;
        } else {
            result = self.goal;
        }

        result
    }
}

fn directed(state: State<f64>, direction: f64) -> State<f64> {
    State {
        position: state.position * direction,
        velocity: state.velocity * direction,
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    // f64::max also maps NaN to zero
    let secs = secs.max(0.0);
    if secs >= Duration::MAX.as_secs_f64() {
        return Duration::MAX;
    }
    Duration::from_secs_f64(secs)
}
