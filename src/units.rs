//! Unit newtypes for the scaled quantities read from lab notebooks.
//!
//! Readings are stored in the unit they were taken in; every change of scale
//! goes through a `From` impl (pure rescaling) or a named method (anything
//! involving a physical constant or instrument calibration).

/// Speed of light used for wavelength → frequency conversion, m/s.
pub const SPEED_OF_LIGHT: f64 = 3e8;

macro_rules! unit {
    ($(#[$meta:meta])* $name:ident, $symbol:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            pub const SYMBOL: &'static str = $symbol;

            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match f.precision() {
                    Some(p) => write!(f, "{:.p$} {}", self.0, $symbol),
                    None => write!(f, "{} {}", self.0, $symbol),
                }
            }
        }
    };
}

unit!(Millivolts, "mV");
unit!(
    /// Absolute or gauge pressure.
    Pascals,
    "Pa"
);
unit!(Grams, "g");
unit!(Kilograms, "kg");
unit!(Millimeters, "mm");
unit!(Centimeters, "cm");
unit!(Meters, "m");
unit!(Nanometers, "nm");
unit!(Hertz, "Hz");

impl From<Grams> for Kilograms {
    fn from(g: Grams) -> Self {
        Kilograms(g.0 * 1e-3)
    }
}

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 * 1e-2)
    }
}

impl From<Millimeters> for Centimeters {
    fn from(mm: Millimeters) -> Self {
        Centimeters(mm.0 * 0.1)
    }
}

impl From<Nanometers> for Meters {
    fn from(nm: Nanometers) -> Self {
        Meters(nm.0 * 1e-9)
    }
}

impl Nanometers {
    /// Frequency of light with this vacuum wavelength.
    pub fn to_frequency(self) -> Hertz {
        Hertz(SPEED_OF_LIGHT / Meters::from(self).0)
    }
}

/// Linear calibration of a pressure transducer: gauge pressure per millivolt.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct SensorGain {
    pub pascals_per_millivolt: f64,
}

impl Default for SensorGain {
    fn default() -> Self {
        SensorGain {
            pascals_per_millivolt: 50.0,
        }
    }
}

impl Millivolts {
    /// Gauge pressure (relative to atmosphere) indicated by this reading.
    pub fn to_gauge(self, gain: SensorGain) -> Pascals {
        Pascals(self.0 * gain.pascals_per_millivolt)
    }
}

impl Pascals {
    /// Absolute pressure from a gauge reading and the ambient pressure.
    pub fn absolute_from_gauge(gauge: Pascals, ambient: Pascals) -> Pascals {
        Pascals(ambient.0 + gauge.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use statrs::assert_almost_eq;

    #[test]
    fn test_scale_conversions() {
        assert_almost_eq!(Kilograms::from(Grams(1.5)).0, 1.5e-3, 1e-15);
        assert_almost_eq!(Meters::from(Centimeters(3.2)).0, 0.032, 1e-15);
        assert_almost_eq!(Centimeters::from(Millimeters(2.495)).0, 0.2495, 1e-15);
    }

    #[test]
    fn test_wavelength_to_frequency() {
        let f = Nanometers(365.0).to_frequency();
        assert_almost_eq!(f.0 / 8.219178e14, 1.0, 1e-6);
    }

    #[test]
    fn test_sensor_gain() {
        let gauge = Millivolts(20.0).to_gauge(SensorGain::default());
        assert_eq!(gauge, Pascals(1000.0));
        let abs = Pascals::absolute_from_gauge(gauge, Pascals(100345.0));
        assert_eq!(abs, Pascals(101345.0));
    }

    #[test]
    fn test_display_with_precision() {
        assert_eq!(format!("{:.1}", Pascals(100345.0)), "100345.0 Pa");
        assert_eq!(Hertz(50.0).to_string(), "50 Hz");
    }
}
