// Maps physical position-like quantities onto the controller's base units

use core::fmt::Debug;

use uom::si::f64::{
    Acceleration, Angle, AngularAcceleration, AngularVelocity, Length, Velocity,
};
use uom::si::{acceleration, angle, angular_acceleration, angular_velocity, length, velocity};

/// A position-like quantity the profiled controller can regulate.
///
/// Implementors pick a dimension (length, angle, ...) and provide lossless conversions to and
/// from the base SI unit of that dimension. The controller and the motion profile do all their
/// arithmetic on those base-unit `f64` values; the conversions only happen at the boundary, so a
/// `Distance` never has to support arithmetic itself.
///
/// `f64` implements this trait as a dimensionless quantity whose velocity and acceleration are
/// also plain `f64`.
pub trait Distance: Copy + Debug + PartialEq + 'static {
    /// The time derivative of this quantity.
    type Velocity: Copy + Debug + PartialEq + 'static;

    /// The second time derivative of this quantity.
    type Acceleration: Copy + Debug + PartialEq + 'static;

    /// Builds a quantity from a value in base units.
    fn from_base(value: f64) -> Self;

    /// Returns the value of this quantity in base units.
    fn to_base(self) -> f64;

    /// Builds a velocity from a value in base units per second.
    fn velocity_from_base(value: f64) -> Self::Velocity;

    /// Returns a velocity in base units per second.
    fn velocity_to_base(velocity: Self::Velocity) -> f64;

    /// Builds an acceleration from a value in base units per second squared.
    fn acceleration_from_base(value: f64) -> Self::Acceleration;

    /// Returns an acceleration in base units per second squared.
    fn acceleration_to_base(acceleration: Self::Acceleration) -> f64;
}

impl Distance for f64 {
    type Velocity = f64;
    type Acceleration = f64;

    fn from_base(value: f64) -> Self {
        value
    }

    fn to_base(self) -> f64 {
        self
    }

    fn velocity_from_base(value: f64) -> Self::Velocity {
        value
    }

    fn velocity_to_base(velocity: Self::Velocity) -> f64 {
        velocity
    }

    fn acceleration_from_base(value: f64) -> Self::Acceleration {
        value
    }

    fn acceleration_to_base(acceleration: Self::Acceleration) -> f64 {
        acceleration
    }
}

/// Linear mechanisms: base units are meters.
impl Distance for Length {
    type Velocity = Velocity;
    type Acceleration = Acceleration;

    fn from_base(value: f64) -> Self {
        Length::new::<length::meter>(value)
    }

    fn to_base(self) -> f64 {
        self.get::<length::meter>()
    }

    fn velocity_from_base(value: f64) -> Self::Velocity {
        Velocity::new::<velocity::meter_per_second>(value)
    }

    fn velocity_to_base(velocity: Self::Velocity) -> f64 {
        velocity.get::<velocity::meter_per_second>()
    }

    fn acceleration_from_base(value: f64) -> Self::Acceleration {
        Acceleration::new::<acceleration::meter_per_second_squared>(value)
    }

    fn acceleration_to_base(acceleration: Self::Acceleration) -> f64 {
        acceleration.get::<acceleration::meter_per_second_squared>()
    }
}

/// Rotary mechanisms: base units are radians.
impl Distance for Angle {
    type Velocity = AngularVelocity;
    type Acceleration = AngularAcceleration;

    fn from_base(value: f64) -> Self {
        Angle::new::<angle::radian>(value)
    }

    fn to_base(self) -> f64 {
        self.get::<angle::radian>()
    }

    fn velocity_from_base(value: f64) -> Self::Velocity {
        AngularVelocity::new::<angular_velocity::radian_per_second>(value)
    }

    fn velocity_to_base(velocity: Self::Velocity) -> f64 {
        velocity.get::<angular_velocity::radian_per_second>()
    }

    fn acceleration_from_base(value: f64) -> Self::Acceleration {
        AngularAcceleration::new::<angular_acceleration::radian_per_second_squared>(value)
    }

    fn acceleration_to_base(acceleration: Self::Acceleration) -> f64 {
        acceleration.get::<angular_acceleration::radian_per_second_squared>()
    }
}
