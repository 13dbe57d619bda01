//! Type-safe physical units for particle-based observation synthesis
//!
//! This module provides strongly-typed quantities using the `uom` crate so that
//! lengths, masses, ages and luminosities can never be mixed up at compile time.
//! The extension traits add the astronomical units the rest of the workspace
//! thinks in (parsec, solar mass, megayear, solar luminosity).

use uom::si::angle::{degree, radian};
use uom::si::length::meter;
use uom::si::mass::kilogram;
use uom::si::power::watt;
use uom::si::thermodynamic_temperature::kelvin;
use uom::si::time::second;

/// Type alias for length measurements (positions, widths, smoothing lengths)
pub type Length = uom::si::f64::Length;

/// Type alias for particle masses
pub type Mass = uom::si::f64::Mass;

/// Type alias for stellar ages and durations
pub type Time = uom::si::f64::Time;

/// Type alias for rotation angles
pub type Angle = uom::si::f64::Angle;

/// Bolometric or per-band luminosity
pub type Luminosity = uom::si::f64::Power;

/// Effective stellar temperature
pub type Temperature = uom::si::f64::ThermodynamicTemperature;

/// One parsec in meters (IAU 2015)
pub const PARSEC_M: f64 = 3.085_677_581_491_367e16;

/// Solar mass in kilograms
pub const SOLAR_MASS_KG: f64 = 1.98892e30;

/// Nominal solar luminosity in watts
pub const SOLAR_LUMINOSITY_W: f64 = 3.839e26;

/// Tropical year in seconds
pub const YEAR_S: f64 = 3.155_692_597_47e7;

/// Newtonian gravitational constant in m³ kg⁻¹ s⁻²
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67428e-11;

/// Extension trait for lengths in astronomical units
pub trait LengthExt {
    /// Create length from parsecs
    fn from_parsecs(pc: f64) -> Self;

    /// Get length in parsecs
    fn as_parsecs(&self) -> f64;

    /// Create length from meters
    fn from_meters(m: f64) -> Self;

    /// Get length in meters
    fn as_meters(&self) -> f64;
}

/// Extension trait for masses in solar units
pub trait MassExt {
    /// Create mass from solar masses
    fn from_solar_masses(msun: f64) -> Self;

    /// Get mass in solar masses
    fn as_solar_masses(&self) -> f64;

    /// Get mass in kilograms
    fn as_kilograms(&self) -> f64;
}

/// Extension trait for stellar ages
pub trait TimeExt {
    /// Create time from years
    fn from_years(yr: f64) -> Self;

    /// Create time from megayears
    fn from_megayears(myr: f64) -> Self;

    /// Create time from gigayears
    fn from_gigayears(gyr: f64) -> Self;

    /// Get time in megayears
    fn as_megayears(&self) -> f64;

    /// Get time in gigayears
    fn as_gigayears(&self) -> f64;

    /// Get time in seconds
    fn as_seconds(&self) -> f64;
}

/// Extension trait for rotation angles
pub trait AngleExt {
    /// Create angle from degrees
    fn from_degrees(deg: f64) -> Self;

    /// Get angle in degrees
    fn as_degrees(&self) -> f64;

    /// Create angle from radians
    fn from_radians(rad: f64) -> Self;

    /// Get angle in radians
    fn as_radians(&self) -> f64;
}

/// Extension trait for luminosities in solar units
pub trait LuminosityExt {
    /// Create luminosity from solar luminosities
    fn from_solar_luminosities(lsun: f64) -> Self;

    /// Get luminosity in solar luminosities
    fn as_solar_luminosities(&self) -> f64;
}

/// Extension trait for temperatures
pub trait TemperatureExt {
    /// Create temperature from Kelvin
    fn from_kelvin(kelvin: f64) -> Self;

    /// Get temperature in Kelvin
    fn as_kelvin(&self) -> f64;
}

impl LengthExt for Length {
    fn from_parsecs(pc: f64) -> Self {
        Length::new::<meter>(pc * PARSEC_M)
    }

    fn as_parsecs(&self) -> f64 {
        self.get::<meter>() / PARSEC_M
    }

    fn from_meters(m: f64) -> Self {
        Length::new::<meter>(m)
    }

    fn as_meters(&self) -> f64 {
        self.get::<meter>()
    }
}

impl MassExt for Mass {
    fn from_solar_masses(msun: f64) -> Self {
        Mass::new::<kilogram>(msun * SOLAR_MASS_KG)
    }

    fn as_solar_masses(&self) -> f64 {
        self.get::<kilogram>() / SOLAR_MASS_KG
    }

    fn as_kilograms(&self) -> f64 {
        self.get::<kilogram>()
    }
}

impl TimeExt for Time {
    fn from_years(yr: f64) -> Self {
        Time::new::<second>(yr * YEAR_S)
    }

    fn from_megayears(myr: f64) -> Self {
        Self::from_years(myr * 1e6)
    }

    fn from_gigayears(gyr: f64) -> Self {
        Self::from_years(gyr * 1e9)
    }

    fn as_megayears(&self) -> f64 {
        self.get::<second>() / YEAR_S / 1e6
    }

    fn as_gigayears(&self) -> f64 {
        self.get::<second>() / YEAR_S / 1e9
    }

    fn as_seconds(&self) -> f64 {
        self.get::<second>()
    }
}

impl AngleExt for Angle {
    fn from_degrees(deg: f64) -> Self {
        Angle::new::<degree>(deg)
    }

    fn as_degrees(&self) -> f64 {
        self.get::<degree>()
    }

    fn from_radians(rad: f64) -> Self {
        Angle::new::<radian>(rad)
    }

    fn as_radians(&self) -> f64 {
        self.get::<radian>()
    }
}

impl LuminosityExt for Luminosity {
    fn from_solar_luminosities(lsun: f64) -> Self {
        Luminosity::new::<watt>(lsun * SOLAR_LUMINOSITY_W)
    }

    fn as_solar_luminosities(&self) -> f64 {
        self.get::<watt>() / SOLAR_LUMINOSITY_W
    }
}

impl TemperatureExt for Temperature {
    fn from_kelvin(k: f64) -> Self {
        Temperature::new::<kelvin>(k)
    }

    fn as_kelvin(&self) -> f64 {
        self.get::<kelvin>()
    }
}
