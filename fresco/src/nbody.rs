//! Dimensionless N-body units.
//!
//! The converter is fixed by a mass scale `M` (total system mass) and a
//! length scale `L` (image width). The time scale follows from `G = 1`:
//! `T = sqrt(L³ / (G M))`. Quantities in N-body units carry their dimension
//! at runtime so adding a length to a mass is an error rather than a silent
//! wrong number.

use std::fmt;
use std::ops::{Div, Mul};

use shared::units::{
    Length, LengthExt, Mass, MassExt, Time, TimeExt, GRAVITATIONAL_CONSTANT, PARSEC_M,
    SOLAR_MASS_KG,
};
use thiserror::Error;

/// Exponents of the base dimensions (length, mass, time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
}

impl Dimension {
    pub const NONE: Self = Self::new(0, 0, 0);
    pub const LENGTH: Self = Self::new(1, 0, 0);
    pub const MASS: Self = Self::new(0, 1, 0);
    pub const TIME: Self = Self::new(0, 0, 1);
    pub const SURFACE_DENSITY: Self = Self::new(-2, 1, 0);

    pub const fn new(length: i8, mass: i8, time: i8) -> Self {
        Self { length, mass, time }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L^{} M^{} T^{}", self.length, self.mass, self.time)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NBodyError {
    #[error("unit mismatch: cannot combine {left} with {right}")]
    UnitMismatch { left: Dimension, right: Dimension },
    #[error("invalid N-body scale: mass {mass_msun} MSun, length {length_pc} pc")]
    InvalidScale { mass_msun: f64, length_pc: f64 },
}

/// A value in N-body units tagged with its dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NBodyQuantity {
    pub value: f64,
    pub dimension: Dimension,
}

impl NBodyQuantity {
    pub fn new(value: f64, dimension: Dimension) -> Self {
        Self { value, dimension }
    }

    pub fn checked_add(self, other: Self) -> Result<Self, NBodyError> {
        self.same_dimension(&other)?;
        Ok(Self::new(self.value + other.value, self.dimension))
    }

    pub fn checked_sub(self, other: Self) -> Result<Self, NBodyError> {
        self.same_dimension(&other)?;
        Ok(Self::new(self.value - other.value, self.dimension))
    }

    fn same_dimension(&self, other: &Self) -> Result<(), NBodyError> {
        if self.dimension == other.dimension {
            Ok(())
        } else {
            Err(NBodyError::UnitMismatch {
                left: self.dimension,
                right: other.dimension,
            })
        }
    }
}

impl Mul for NBodyQuantity {
    type Output = NBodyQuantity;

    fn mul(self, rhs: Self) -> Self::Output {
        NBodyQuantity::new(
            self.value * rhs.value,
            Dimension::new(
                self.dimension.length + rhs.dimension.length,
                self.dimension.mass + rhs.dimension.mass,
                self.dimension.time + rhs.dimension.time,
            ),
        )
    }
}

impl Div for NBodyQuantity {
    type Output = NBodyQuantity;

    fn div(self, rhs: Self) -> Self::Output {
        NBodyQuantity::new(
            self.value / rhs.value,
            Dimension::new(
                self.dimension.length - rhs.dimension.length,
                self.dimension.mass - rhs.dimension.mass,
                self.dimension.time - rhs.dimension.time,
            ),
        )
    }
}

impl Mul<f64> for NBodyQuantity {
    type Output = NBodyQuantity;

    fn mul(self, rhs: f64) -> Self::Output {
        NBodyQuantity::new(self.value * rhs, self.dimension)
    }
}

/// Bidirectional physical <-> N-body unit converter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NBodyConverter {
    mass_unit: Mass,
    length_unit: Length,
}

impl NBodyConverter {
    /// Build a converter from a total mass and a characteristic length
    ///
    /// Both scales must be finite and strictly positive.
    pub fn new(mass: Mass, length: Length) -> Result<Self, NBodyError> {
        let (m, l) = (mass.as_solar_masses(), length.as_parsecs());
        if !(m.is_finite() && m > 0.0 && l.is_finite() && l > 0.0) {
            return Err(NBodyError::InvalidScale {
                mass_msun: m,
                length_pc: l,
            });
        }
        Ok(Self {
            mass_unit: mass,
            length_unit: length,
        })
    }

    pub fn mass_unit(&self) -> Mass {
        self.mass_unit
    }

    pub fn length_unit(&self) -> Length {
        self.length_unit
    }

    /// N-body time unit `sqrt(L³ / (G M))`
    pub fn time_unit(&self) -> Time {
        let l = self.length_unit.as_meters();
        let m = self.mass_unit.as_kilograms();
        let seconds = (l * l * l / (GRAVITATIONAL_CONSTANT * m)).sqrt();
        Time::from_years(seconds / shared::units::YEAR_S)
    }

    /// SI base-unit factor (m^a kg^b s^c) of one N-body unit of `dimension`
    fn si_scale(&self, dimension: Dimension) -> f64 {
        self.length_unit.as_meters().powi(dimension.length as i32)
            * self.mass_unit.as_kilograms().powi(dimension.mass as i32)
            * self.time_unit().as_seconds().powi(dimension.time as i32)
    }

    /// Convert a value in SI base units of `dimension` into N-body units
    pub fn to_nbody(&self, si_value: f64, dimension: Dimension) -> NBodyQuantity {
        NBodyQuantity::new(si_value / self.si_scale(dimension), dimension)
    }

    /// Convert an N-body quantity back into SI base units
    pub fn to_si(&self, quantity: NBodyQuantity) -> f64 {
        quantity.value * self.si_scale(quantity.dimension)
    }

    pub fn length_to_nbody(&self, length: Length) -> NBodyQuantity {
        self.to_nbody(length.as_meters(), Dimension::LENGTH)
    }

    pub fn mass_to_nbody(&self, mass: Mass) -> NBodyQuantity {
        self.to_nbody(mass.as_kilograms(), Dimension::MASS)
    }

    pub fn length_to_si(&self, quantity: NBodyQuantity) -> Result<Length, NBodyError> {
        self.expect_dimension(&quantity, Dimension::LENGTH)?;
        Ok(Length::from_meters(self.to_si(quantity)))
    }

    pub fn mass_to_si(&self, quantity: NBodyQuantity) -> Result<Mass, NBodyError> {
        self.expect_dimension(&quantity, Dimension::MASS)?;
        Ok(Mass::from_solar_masses(self.to_si(quantity) / SOLAR_MASS_KG))
    }

    /// Surface density in solar masses per square parsec
    pub fn surface_density_to_msun_per_pc2(
        &self,
        quantity: NBodyQuantity,
    ) -> Result<f64, NBodyError> {
        self.expect_dimension(&quantity, Dimension::SURFACE_DENSITY)?;
        Ok(self.to_si(quantity) * PARSEC_M * PARSEC_M / SOLAR_MASS_KG)
    }

    fn expect_dimension(
        &self,
        quantity: &NBodyQuantity,
        expected: Dimension,
    ) -> Result<(), NBodyError> {
        if quantity.dimension == expected {
            Ok(())
        } else {
            Err(NBodyError::UnitMismatch {
                left: quantity.dimension,
                right: expected,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn converter() -> NBodyConverter {
        NBodyConverter::new(Mass::from_solar_masses(1000.0), Length::from_parsecs(5.0)).unwrap()
    }

    #[test]
    fn test_scales_map_to_unity() {
        let conv = converter();
        assert_relative_eq!(
            conv.length_to_nbody(Length::from_parsecs(5.0)).value,
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            conv.mass_to_nbody(Mass::from_solar_masses(250.0)).value,
            0.25,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_round_trip_length() {
        let conv = converter();
        let q = conv.length_to_nbody(Length::from_parsecs(1.25));
        let back = conv.length_to_si(q).unwrap();
        assert_relative_eq!(back.as_parsecs(), 1.25, max_relative = 1e-12);
    }

    #[test]
    fn test_time_unit() {
        // 1000 MSun within 5 pc gives a crossing time of order a few Myr
        let t = converter().time_unit().as_megayears();
        assert!(t > 1.0 && t < 10.0, "time unit {t} Myr");
    }

    #[test]
    fn test_surface_density() {
        let conv = converter();
        let sigma = conv.mass_to_nbody(Mass::from_solar_masses(1000.0))
            / (conv.length_to_nbody(Length::from_parsecs(5.0))
                * conv.length_to_nbody(Length::from_parsecs(5.0)));
        assert_eq!(sigma.dimension, Dimension::SURFACE_DENSITY);
        let msun_pc2 = conv.surface_density_to_msun_per_pc2(sigma).unwrap();
        assert_relative_eq!(msun_pc2, 40.0, max_relative = 1e-9);
    }

    #[test]
    fn test_mixing_dimensions_is_an_error() {
        let conv = converter();
        let l = conv.length_to_nbody(Length::from_parsecs(1.0));
        let m = conv.mass_to_nbody(Mass::from_solar_masses(1.0));
        assert!(matches!(
            l.checked_add(m),
            Err(NBodyError::UnitMismatch { .. })
        ));
        assert!(l.checked_sub(l).is_ok());
        assert!(conv.mass_to_si(l).is_err());
    }

    #[test]
    fn test_invalid_scale() {
        assert!(NBodyConverter::new(Mass::from_solar_masses(0.0), Length::from_parsecs(1.0)).is_err());
        assert!(NBodyConverter::new(Mass::from_solar_masses(1.0), Length::from_parsecs(-1.0)).is_err());
    }
}
