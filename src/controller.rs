use core::marker::PhantomData;

use crate::pid::{PidConfig, PidController};
use crate::profile::{Constraints, State, TrapezoidProfile};
use crate::units::Distance;

/// The capabilities a command needs from a motion-profiled controller.
///
/// [`ProfiledPidController`] is the implementation shipped with this crate; test doubles and
/// other control laws can implement it too.
pub trait ProfiledController<D: Distance> {
    /// Clears the integral term and re-anchors the profile to the next measurement.
    fn reset(&mut self);

    /// Advances the profile one period toward `goal` and returns the control effort for
    /// `measurement`.
    fn calculate(&mut self, measurement: D, goal: State<D>) -> f64;

    /// Returns the profile sample produced by the last `calculate`.
    fn setpoint(&self) -> State<D>;
}

/// A PID controller whose reference follows a trapezoidal motion profile instead of jumping to
/// the goal.
///
/// Every `calculate` rebuilds the profile from the current setpoint to the (possibly moved) goal
/// and advances it by one PID period; the PID then regulates the measurement toward the new
/// setpoint position.
#[derive(Copy, Clone, Debug)]
pub struct ProfiledPidController<D: Distance = f64> {
    pid: PidController,
    constraints: Constraints<f64>,
    goal: State<f64>,
    setpoint: State<f64>,
    need_anchor: bool,
    _dimension: PhantomData<D>,
}

impl<D: Distance> ProfiledPidController<D> {
    /// The profile is anchored to the first measurement passed to `calculate`.
    pub fn new(config: PidConfig, constraints: Constraints<D>) -> Self {
        Self {
            pid: PidController::new(config),
            constraints: constraints.to_base(),
            goal: State::zero(),
            setpoint: State::zero(),
            need_anchor: true,
            _dimension: PhantomData,
        }
    }

    /// Returns the underlying PID controller.
    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    /// Returns the underlying PID controller, e.g. to retune gains between runs.
    pub fn pid_mut(&mut self) -> &mut PidController {
        &mut self.pid
    }

    /// Returns the profile limits.
    pub fn constraints(&self) -> Constraints<D> {
        Constraints {
            max_velocity: D::velocity_from_base(self.constraints.max_velocity),
            max_acceleration: D::acceleration_from_base(self.constraints.max_acceleration),
        }
    }

    /// Takes effect on the next `calculate`.
    pub fn set_constraints(&mut self, constraints: Constraints<D>) {
        self.constraints = constraints.to_base();
    }

    /// Returns the goal passed to the last `calculate`.
    pub fn goal(&self) -> State<D> {
        State::from_base(self.goal)
    }

    /// Returns the profile sample the last `calculate` regulated against.
    pub fn setpoint(&self) -> State<D> {
        State::from_base(self.setpoint)
    }

    /// Returns true if the measurement is within tolerance of the current setpoint.
    pub fn at_setpoint(&self) -> bool {
        self.pid.at_setpoint()
    }

    /// Returns true if the profile has finished and the measurement is within tolerance of it.
    ///
    /// Always false between construction or `reset` and the next `calculate`, since no goal has
    /// been tracked yet.
    pub fn at_goal(&self) -> bool {
        !self.need_anchor && self.at_setpoint() && self.setpoint == self.goal
    }

    /// Clears the PID state; the profile restarts from rest at the next measurement.
    pub fn reset(&mut self) {
        self.pid.reset();
        self.need_anchor = true;
    }

    /// Clears the PID state and restarts the profile from `state` right away.
    pub fn reset_to(&mut self, state: State<D>) {
        self.pid.reset();
        self.setpoint = state.to_base();
        self.need_anchor = false;
    }

    /// Advances the profile one period toward `goal` and returns the PID output for
    /// `measurement` against the new setpoint position.
    pub fn calculate(&mut self, measurement: D, goal: State<D>) -> f64 {
        let measurement = measurement.to_base();

        if self.need_anchor {
            self.setpoint = State::at_rest(measurement);
            self.need_anchor = false;
        }

        self.goal = goal.to_base();

        // Take the shortest way around: move goal and setpoint within half a range of the
        // measurement
        let config = self.pid.config();
        if config.is_continuous_input_enabled() {
            self.goal.position =
                measurement + config.continuous_error(self.goal.position - measurement);
            self.setpoint.position =
                measurement + config.continuous_error(self.setpoint.position - measurement);
        }

        let profile = TrapezoidProfile::<f64>::new(self.constraints, self.goal, self.setpoint);
        self.setpoint = profile.calculate(config.period());

        self.pid.calculate(measurement, self.setpoint.position)
    }
}

impl<D: Distance> ProfiledController<D> for ProfiledPidController<D> {
    fn reset(&mut self) {
        ProfiledPidController::reset(self);
    }

    fn calculate(&mut self, measurement: D, goal: State<D>) -> f64 {
        ProfiledPidController::calculate(self, measurement, goal)
    }

    fn setpoint(&self) -> State<D> {
        ProfiledPidController::setpoint(self)
    }
}
