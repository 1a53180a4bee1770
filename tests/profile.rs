// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use core::time::Duration;

use approx::assert_relative_eq;
use uom::si::f64::{Acceleration, Length, Velocity};
use uom::si::{acceleration, length, velocity};

use profiled_pid_command::pid::PidConfigError;
use profiled_pid_command::profile::{Constraints, State, TrapezoidProfile};

const PERIOD: Duration = Duration::from_millis(20);

fn unit_constraints() -> Constraints<f64> {
    Constraints::new(1.0, 1.0).unwrap()
}

/// Rebuilds the profile from the last setpoint every period, the way the profiled controller
/// drives it, and returns every setpoint until the goal is reached
fn run_to_goal(
    constraints: Constraints<f64>,
    goal: State<f64>,
    start: State<f64>,
) -> Vec<State<f64>> {
    let mut setpoint = start;
    let mut setpoints = vec![];
    for _ in 0..10_000 {
        setpoint = TrapezoidProfile::new(constraints, goal, setpoint).calculate(PERIOD);
        setpoints.push(setpoint);
        if setpoint == goal {
            break;
        }
    }
    setpoints
}

mod test_constraints {
    use super::*;

    #[test]
    fn test_invalid_constraints_are_rejected() {
        for velocity in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            assert_eq!(
                Constraints::<f64>::new(velocity, 1.0),
                Err(PidConfigError::InvalidMaxVelocity)
            );
        }
        for acceleration in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            assert_eq!(
                Constraints::<f64>::new(1.0, acceleration),
                Err(PidConfigError::InvalidMaxAcceleration)
            );
        }
    }

    #[test]
    fn test_constraints_keep_units() {
        let constraints = Constraints::<Length>::new(
            Velocity::new::<velocity::centimeter_per_second>(50.0),
            Acceleration::new::<acceleration::meter_per_second_squared>(2.0),
        )
        .unwrap();

        let base = constraints.to_base();
        assert_relative_eq!(base.max_velocity(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(base.max_acceleration(), 2.0, epsilon = 1e-12);
    }
}

mod test_trapezoid_shape {
    use super::*;

    #[test]
    fn test_trapezoid_timing() {
        // 1s to accelerate, 9s at cruise, 1s to decelerate
        let profile = TrapezoidProfile::new(unit_constraints(), State::at_rest(10.0), State::zero());

        assert_relative_eq!(profile.total_time().as_secs_f64(), 11.0, epsilon = 1e-9);
        assert!(!profile.is_finished(Duration::from_secs(10)));
        assert!(profile.is_finished(Duration::from_secs(11)));
    }

    #[test]
    fn test_trapezoid_samples() {
        let profile = TrapezoidProfile::new(unit_constraints(), State::at_rest(10.0), State::zero());

        let accelerating = profile.calculate(Duration::from_millis(500));
        assert_relative_eq!(accelerating.velocity, 0.5, epsilon = 1e-12);
        assert_relative_eq!(accelerating.position, 0.125, epsilon = 1e-12);

        let cruising = profile.calculate(Duration::from_secs(5));
        assert_relative_eq!(cruising.velocity, 1.0, epsilon = 1e-12);
        assert_relative_eq!(cruising.position, 4.5, epsilon = 1e-12);

        let decelerating = profile.calculate(Duration::from_millis(10_500));
        assert_relative_eq!(decelerating.velocity, 0.5, epsilon = 1e-9);
        assert_relative_eq!(decelerating.position, 10.0 - 0.125, epsilon = 1e-9);

        assert_eq!(profile.calculate(Duration::from_secs(12)), State::at_rest(10.0));
    }

    #[test]
    fn test_triangular_profile_never_reaches_cruise() {
        let goal = State::at_rest(0.5);
        let profile = TrapezoidProfile::new(unit_constraints(), goal, State::zero());

        // Accelerate for sqrt(0.5)s, then decelerate for as long
        let half_time = 0.5_f64.sqrt();
        assert_relative_eq!(profile.total_time().as_secs_f64(), 2.0 * half_time, epsilon = 1e-6);

        let peak = profile.calculate(Duration::from_secs_f64(half_time));
        assert_relative_eq!(peak.velocity, half_time, epsilon = 1e-6);
        assert_relative_eq!(peak.position, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_reverse_profile_mirrors_forward_profile() {
        let forward = TrapezoidProfile::new(unit_constraints(), State::at_rest(3.0), State::zero());
        let backward =
            TrapezoidProfile::new(unit_constraints(), State::at_rest(-3.0), State::zero());

        assert_eq!(forward.total_time(), backward.total_time());
        for millis in [100, 900, 1500, 3000, 3900] {
            let t = Duration::from_millis(millis);
            let f = forward.calculate(t);
            let b = backward.calculate(t);
            assert_relative_eq!(f.position, -b.position, epsilon = 1e-12);
            assert_relative_eq!(f.velocity, -b.velocity, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_initial_velocity_above_limit_is_clamped() {
        let profile =
            TrapezoidProfile::new(unit_constraints(), State::at_rest(10.0), State::new(0.0, 5.0));

        let first = profile.calculate(PERIOD);
        assert!(first.velocity <= 1.0 + 1e-12);
    }

    #[test]
    fn test_profile_in_units() {
        let constraints = Constraints::<Length>::new(
            Velocity::new::<velocity::meter_per_second>(1.0),
            Acceleration::new::<acceleration::meter_per_second_squared>(1.0),
        )
        .unwrap();
        let goal = State::at_rest(Length::new::<length::centimeter>(50.0));
        let profile = TrapezoidProfile::new(constraints, goal, State::zero());

        let peak = profile.calculate(Duration::from_secs_f64(0.5_f64.sqrt()));
        assert_relative_eq!(peak.position.get::<length::centimeter>(), 25.0, epsilon = 1e-4);
        let end = profile.calculate(Duration::from_secs(2));
        assert_relative_eq!(end.position.get::<length::meter>(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(end.velocity.get::<velocity::meter_per_second>(), 0.0);
    }
}

mod test_time_left {
    use super::*;

    #[test]
    fn test_time_left_until_in_each_phase() {
        let profile = TrapezoidProfile::new(unit_constraints(), State::at_rest(10.0), State::zero());

        // Accelerating: x = t^2 / 2
        assert_relative_eq!(profile.time_left_until(0.125).as_secs_f64(), 0.5, epsilon = 1e-9);
        // Cruising: x = 0.5 + (t - 1)
        assert_relative_eq!(profile.time_left_until(4.5).as_secs_f64(), 5.0, epsilon = 1e-9);
        // Decelerating: symmetric to accelerating
        assert_relative_eq!(
            profile.time_left_until(10.0 - 0.125).as_secs_f64(),
            10.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_time_left_until_clamps_unreached_targets() {
        let profile = TrapezoidProfile::new(unit_constraints(), State::at_rest(10.0), State::zero());

        assert_eq!(profile.time_left_until(-1.0), Duration::ZERO);
        assert_eq!(profile.time_left_until(0.0), Duration::ZERO);
        assert_eq!(profile.time_left_until(20.0), profile.total_time());
    }

    #[test]
    fn test_huge_distances_saturate_durations() {
        let profile =
            TrapezoidProfile::new(unit_constraints(), State::at_rest(1e25), State::zero());

        let first = profile.calculate(PERIOD);
        assert_relative_eq!(first.position, 0.0002, epsilon = 1e-12);
        assert_relative_eq!(first.velocity, 0.02, epsilon = 1e-12);

        assert_eq!(profile.total_time(), Duration::MAX);
        assert_eq!(profile.time_left_until(5e24), Duration::MAX);
        assert!(!profile.is_finished(Duration::from_secs(1_000_000)));
    }

    #[test]
    fn test_time_left_until_reverse() {
        let profile =
            TrapezoidProfile::new(unit_constraints(), State::at_rest(-10.0), State::zero());

        assert_relative_eq!(profile.time_left_until(-0.125).as_secs_f64(), 0.5, epsilon = 1e-9);
        assert_eq!(profile.time_left_until(1.0), Duration::ZERO);
    }
}

mod test_replanning {
    use super::*;

    #[test]
    fn test_replanned_profile_reaches_goal_exactly() {
        let goal = State::at_rest(2.0);
        let setpoints = run_to_goal(unit_constraints(), goal, State::zero());

        assert_eq!(setpoints.last(), Some(&goal));
        // About 3s for 2 units under unit constraints
        assert_relative_eq!(
            setpoints.len() as f64 * PERIOD.as_secs_f64(),
            3.0,
            epsilon = 2.0 * PERIOD.as_secs_f64()
        );
    }

    #[test]
    fn test_replanned_profile_respects_constraints() {
        let constraints = Constraints::new(1.5, 3.0).unwrap();
        let setpoints = run_to_goal(constraints, State::at_rest(-4.0), State::at_rest(1.0));
        let dt = PERIOD.as_secs_f64();

        for pair in setpoints.windows(2) {
            assert!(pair[1].velocity.abs() <= 1.5 + 1e-9);
            let acceleration = (pair[1].velocity - pair[0].velocity) / dt;
            assert!(acceleration.abs() <= 3.0 + 1e-6, "acceleration {acceleration}");
        }
    }

    #[test]
    fn test_nonzero_goal_velocity_is_reached() {
        let goal = State::new(5.0, 0.5);
        let profile = TrapezoidProfile::new(unit_constraints(), goal, State::zero());

        let end = profile.calculate(profile.total_time());
        assert_relative_eq!(end.position, 5.0, epsilon = 1e-9);
        assert_relative_eq!(end.velocity, 0.5, epsilon = 1e-9);
    }
}
