use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use core::fmt;

use crate::command::{Command, SubsystemId};
use crate::controller::{ProfiledController, ProfiledPidController};
use crate::profile::State;
use crate::units::Distance;

/// The forms in which a goal can be handed to a [`ProfiledPidCommand`].
///
/// Whatever the form, the command only ever sees the canonical one: a closure returning a full
/// [`State`]. Position forms get a zero goal velocity.
pub enum GoalSource<'a, D: Distance> {
    /// A goal state sampled on every tick.
    DynamicState(Box<dyn FnMut() -> State<D> + 'a>),
    /// A goal position sampled on every tick.
    DynamicPosition(Box<dyn FnMut() -> D + 'a>),
    /// A fixed goal state.
    ConstantState(State<D>),
    /// A fixed goal position.
    ConstantPosition(D),
}

impl<'a, D: Distance> GoalSource<'a, D> {
    /// Normalizes any goal form into a closure returning a state.
    pub fn into_state_source(self) -> Box<dyn FnMut() -> State<D> + 'a> {
        match self {
            GoalSource::DynamicState(source) => source,
            GoalSource::DynamicPosition(mut source) => {
                Box::new(move || State::at_rest(source()))
            }
            GoalSource::ConstantState(goal) => Box::new(move || goal),
            GoalSource::ConstantPosition(position) => Box::new(move || State::at_rest(position)),
        }
    }
}

impl<'a, D: Distance> fmt::Debug for GoalSource<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalSource::DynamicState(_) => f.write_str("DynamicState(..)"),
            GoalSource::DynamicPosition(_) => f.write_str("DynamicPosition(..)"),
            GoalSource::ConstantState(goal) => f.debug_tuple("ConstantState").field(goal).finish(),
            GoalSource::ConstantPosition(position) => {
                f.debug_tuple("ConstantPosition").field(position).finish()
            }
        }
    }
}

/// A command that drives an output with a motion-profiled PID controller.
///
/// On every tick it samples the measurement and the goal, lets the controller compute the next
/// effort, and hands that effort together with the controller's intermediate setpoint to the
/// output. The controller is reset when the command starts and the output is zeroed when it ends.
///
/// The command runs forever by default. Use [`Command::until`] to add an exit condition, or wrap
/// it in your own [`Command`] to change how it ends, e.g. for a mechanism that should keep
/// holding its position instead of receiving a zero output.
///
/// The callbacks may borrow user state for `'a`; they are called from the scheduler thread only,
/// once per tick each, and must not block.
pub struct ProfiledPidCommand<'a, D: Distance, C = ProfiledPidController<D>> {
    controller: C,
    measurement: Box<dyn FnMut() -> D + 'a>,
    goal: Box<dyn FnMut() -> State<D> + 'a>,
    output: Box<dyn FnMut(f64, State<D>) + 'a>,
    requirements: BTreeSet<SubsystemId>,
}

impl<'a, D: Distance, C: ProfiledController<D>> ProfiledPidCommand<'a, D, C> {
    /// Creates a command tracking a goal state that may change on every tick.
    ///
    /// # Arguments
    /// - `controller`: The controller computing the output. It is reset in `initialize`, not here.
    /// - `measurement`: Returns the current process variable.
    /// - `goal`: Returns the current goal state.
    /// - `output`: Receives the effort and the intermediate setpoint.
    /// - `requirements`: The subsystems this command drives. Duplicates are ignored.
    pub fn new<M, G, O, R>(
        controller: C,
        measurement: M,
        goal: G,
        output: O,
        requirements: R,
    ) -> Self
    where
        M: FnMut() -> D + 'a,
        G: FnMut() -> State<D> + 'a,
        O: FnMut(f64, State<D>) + 'a,
        R: IntoIterator<Item = SubsystemId>,
    {
        Self::from_goal_source(
            controller,
            measurement,
            GoalSource::DynamicState(Box::new(goal)),
            output,
            requirements,
        )
    }

    /// Creates a command tracking a goal position that may change on every tick. The goal
    /// velocity is zero.
    pub fn with_position_source<M, G, O, R>(
        controller: C,
        measurement: M,
        goal: G,
        output: O,
        requirements: R,
    ) -> Self
    where
        M: FnMut() -> D + 'a,
        G: FnMut() -> D + 'a,
        O: FnMut(f64, State<D>) + 'a,
        R: IntoIterator<Item = SubsystemId>,
    {
        Self::from_goal_source(
            controller,
            measurement,
            GoalSource::DynamicPosition(Box::new(goal)),
            output,
            requirements,
        )
    }

    /// Creates a command with a fixed goal state.
    pub fn with_constant_state<M, O, R>(
        controller: C,
        measurement: M,
        goal: State<D>,
        output: O,
        requirements: R,
    ) -> Self
    where
        M: FnMut() -> D + 'a,
        O: FnMut(f64, State<D>) + 'a,
        R: IntoIterator<Item = SubsystemId>,
    {
        Self::from_goal_source(
            controller,
            measurement,
            GoalSource::ConstantState(goal),
            output,
            requirements,
        )
    }

    /// Creates a command with a fixed goal position and zero goal velocity.
    pub fn with_constant_position<M, O, R>(
        controller: C,
        measurement: M,
        goal: D,
        output: O,
        requirements: R,
    ) -> Self
    where
        M: FnMut() -> D + 'a,
        O: FnMut(f64, State<D>) + 'a,
        R: IntoIterator<Item = SubsystemId>,
    {
        Self::from_goal_source(
            controller,
            measurement,
            GoalSource::ConstantPosition(goal),
            output,
            requirements,
        )
    }

    /// Creates a command from any [`GoalSource`]. All other constructors end up here.
    pub fn from_goal_source<M, O, R>(
        controller: C,
        measurement: M,
        goal: GoalSource<'a, D>,
        output: O,
        requirements: R,
    ) -> Self
    where
        M: FnMut() -> D + 'a,
        O: FnMut(f64, State<D>) + 'a,
        R: IntoIterator<Item = SubsystemId>,
    {
        Self {
            controller,
            measurement: Box::new(measurement),
            goal: goal.into_state_source(),
            output: Box::new(output),
            requirements: requirements.into_iter().collect(),
        }
    }

    /// Returns the controller.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Returns the controller, e.g. to retune it or to query `at_goal` from an exit condition
    /// owned by a wrapping command.
    ///
    /// Changes apply from the next tick on.
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }
}

impl<'a, D: Distance, C: ProfiledController<D>> Command for ProfiledPidCommand<'a, D, C> {
    fn initialize(&mut self) {
        log::trace!(
            "Initializing profiled PID command requiring {:?}",
            self.requirements
        );
        self.controller.reset();
    }

    fn execute(&mut self) {
        let measurement = (self.measurement)();
        let goal = (self.goal)();
        let effort = self.controller.calculate(measurement, goal);
        // Must be read after calculate so it belongs to the same profile step as the effort
        let setpoint = self.controller.setpoint();
        (self.output)(effort, setpoint);
    }

    fn end(&mut self, interrupted: bool) {
        log::trace!(
            "Ending profiled PID command requiring {:?} (interrupted: {})",
            self.requirements,
            interrupted
        );
        (self.output)(0.0, State::zero());
    }

    fn requirements(&self) -> &BTreeSet<SubsystemId> {
        &self.requirements
    }
}

impl<'a, D: Distance, C: fmt::Debug> fmt::Debug for ProfiledPidCommand<'a, D, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfiledPidCommand")
            .field("controller", &self.controller)
            .field("requirements", &self.requirements)
            .finish_non_exhaustive()
    }
}
