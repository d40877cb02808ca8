//! Station units.
//!
//! Stations cross the public API in metres. Element lengths and model
//! coordinates are millimetres.

/// Millimetres per metre.
pub const MM_PER_M: f64 = 1000.0;

/// Decimal places kept when rounding a station (millimetre precision).
pub const STATION_DECIMALS: i32 = 3;

/// Slack allowed when checking a station against the alignment ends, in
/// metres. Covers the half-millimetre that rounding can add.
pub const STATION_TOLERANCE: f64 = 5e-4;

/// Convert a boundary value in metres to model millimetres.
pub fn to_internal(metres: f64) -> f64 {
    metres * MM_PER_M
}

/// Convert model millimetres to a boundary value in metres.
pub fn to_boundary(millimetres: f64) -> f64 {
    millimetres / MM_PER_M
}

/// Round a station to millimetre precision.
pub fn round_station(station: f64) -> f64 {
    let scale = 10f64.powi(STATION_DECIMALS);
    (station * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round_station() {
        assert_eq!(round_station(123.45678), 123.457);
        assert_eq!(round_station(100.0), 100.0);
        assert_eq!(round_station(0.0004), 0.0);
    }

    proptest! {
        #[test]
        fn test_conversions_are_inverses(m in -1.0e6f64..1.0e6f64) {
            let back = to_boundary(to_internal(m));
            prop_assert!((back - m).abs() <= 1e-9 * m.abs().max(1.0));
            let mm = to_internal(m);
            let again = to_internal(to_boundary(mm));
            prop_assert!((again - mm).abs() <= 1e-9 * mm.abs().max(1.0));
        }
    }
}
