#![warn(missing_docs)]

//! # Profiled PID Command
//!
//! This library provides a scheduler command that drives an actuator through a motion-profiled
//! PID controller, together with the controller itself.
//!
//! On every scheduler tick the command samples the process variable, asks the controller for the
//! next control effort toward a (possibly moving) goal, and forwards that effort plus the
//! controller's intermediate setpoint to an output.
//!
//! ## Features
//!
//! - A well-defined lifecycle:
//!   - The controller is reset every time the command starts, never at construction.
//!   - Every tick calls the measurement, the goal, the controller and the output exactly once,
//!     in that order.
//!   - The output always receives a zero effort and a zero state when the command ends.
//!
//! - Flexible goals: a goal state or a goal position, either sampled on every tick or constant.
//!
//! - Dimension-aware positions via [`uom`]: drive a linear mechanism in meters or a rotary one in
//!   radians (or plain `f64`) without mixing them up.
//!
//! - A trapezoidal motion profile and a fixed-period PID controller with validated
//!   configuration, integrator clamping and continuous input.
//!
//! ## Usage
//!
//! ### Driving a mechanism
//!
//! ```rust
//! use std::cell::Cell;
//!
//! use profiled_pid_command::command::{Command, SubsystemId};
//! use profiled_pid_command::controller::ProfiledPidController;
//! use profiled_pid_command::pid::PidConfigBuilder;
//! use profiled_pid_command::profile::Constraints;
//! use profiled_pid_command::profiled_pid_command::ProfiledPidCommand;
//!
//! const ELEVATOR: SubsystemId = SubsystemId::new("elevator");
//!
//! let config = PidConfigBuilder::default()
//!     .kp(8.0)
//!     .kd(0.1)
//!     .build()
//!     .expect("Invalid PID config");
//! let constraints = Constraints::<f64>::new(1.5, 3.0).expect("Invalid constraints");
//! let controller = ProfiledPidController::new(config, constraints);
//!
//! let height = Cell::new(0.0);
//! let voltage = Cell::new(0.0);
//!
//! let mut command = ProfiledPidCommand::with_constant_position(
//!     controller,
//!     || height.get(),
//!     1.2,
//!     |effort, _setpoint| voltage.set(effort),
//!     [ELEVATOR],
//! );
//!
//! command.initialize();
//! command.execute();
//! assert!(voltage.get() > 0.0);
//!
//! command.end(true);
//! assert_eq!(voltage.get(), 0.0);
//! ```
//!
//! ### Using units
//!
//! ```rust
//! use uom::si::f64::{Acceleration, Angle, AngularAcceleration, AngularVelocity, Length, Velocity};
//! use uom::si::{acceleration, angle, angular_acceleration, angular_velocity, length, velocity};
//!
//! use profiled_pid_command::controller::ProfiledPidController;
//! use profiled_pid_command::pid::PidConfig;
//! use profiled_pid_command::profile::{Constraints, State};
//!
//! let arm_constraints = Constraints::<Angle>::new(
//!     AngularVelocity::new::<angular_velocity::radian_per_second>(1.5),
//!     AngularAcceleration::new::<angular_acceleration::radian_per_second_squared>(3.0),
//! )
//! .expect("Invalid constraints");
//! let mut arm = ProfiledPidController::new(PidConfig::default(), arm_constraints);
//! let _effort = arm.calculate(
//!     Angle::new::<angle::degree>(0.0),
//!     State::at_rest(Angle::new::<angle::degree>(45.0)),
//! );
//!
//! let lift_constraints = Constraints::<Length>::new(
//!     Velocity::new::<velocity::meter_per_second>(1.0),
//!     Acceleration::new::<acceleration::meter_per_second_squared>(2.0),
//! )
//! .expect("Invalid constraints");
//! let lift = ProfiledPidController::<Length>::new(PidConfig::default(), lift_constraints);
//! assert_eq!(lift.setpoint().position, Length::new::<length::meter>(0.0));
//! ```
//!
//! ## License
//!
//! MIT
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// The scheduler-facing command interface and subsystem identifiers.
pub mod command;

/// The profiled PID controller and the capability trait commands depend on.
pub mod controller;

/// The fixed-period PID controller and its validated configuration.
pub mod pid;

/// The command binding a profiled controller to measurement, goal and output callbacks.
pub mod profiled_pid_command;

/// Trapezoidal motion profiles and the profile state.
pub mod profile;

/// Mapping of physical quantities onto the controller's base units.
pub mod units;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
