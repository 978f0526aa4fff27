//! PM2.5 concentration to US AQI conversion
//!
//! Piecewise-linear interpolation over the EPA breakpoint table (2024
//! revision of the PM2.5 NAAQS). Concentrations are truncated to one decimal
//! place before lookup, as the EPA method prescribes.

/// `(c_low, c_high, i_low, i_high)` in µg/m³ and index units
const PM25_BREAKPOINTS: [(f64, f64, u32, u32); 6] = [
    (0.0, 9.0, 0, 50),
    (9.1, 35.4, 51, 100),
    (35.5, 55.4, 101, 150),
    (55.5, 125.4, 151, 200),
    (125.5, 225.4, 201, 300),
    (225.5, 325.4, 301, 500),
];

/// Highest index the table defines; larger concentrations are capped here
pub const MAX_AQI: u32 = 500;

/// Convert a 24h PM2.5 concentration to an AQI value.
///
/// Returns `None` for non-finite input. Negative readings (sensor noise) are
/// treated as zero.
#[must_use]
pub fn pm25_to_aqi(concentration: f64) -> Option<u32> {
    if !concentration.is_finite() {
        return None;
    }
    let c = ((concentration.max(0.0) * 10.0) + 1e-9).floor() / 10.0;

    for (c_low, c_high, i_low, i_high) in PM25_BREAKPOINTS {
        if c <= c_high {
            let slope = f64::from(i_high - i_low) / (c_high - c_low);
            let index = slope * (c - c_low) + f64::from(i_low);
            return Some(index.round() as u32);
        }
    }
    Some(MAX_AQI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0)]
    #[case(9.0, 50)]
    #[case(9.1, 51)]
    #[case(12.0, 56)]
    #[case(35.4, 100)]
    #[case(35.5, 101)]
    #[case(55.4, 150)]
    #[case(55.5, 151)]
    #[case(325.4, 500)]
    #[case(900.0, 500)]
    fn test_breakpoints(#[case] concentration: f64, #[case] expected: u32) {
        assert_eq!(pm25_to_aqi(concentration), Some(expected));
    }

    #[test]
    fn test_truncates_before_lookup() {
        // 9.05 truncates to 9.0, staying in the first bucket
        assert_eq!(pm25_to_aqi(9.05), Some(50));
    }

    #[test]
    fn test_negative_and_nan() {
        assert_eq!(pm25_to_aqi(-3.0), Some(0));
        assert_eq!(pm25_to_aqi(f64::NAN), None);
        assert_eq!(pm25_to_aqi(f64::INFINITY), None);
    }
}
