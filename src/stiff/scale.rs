//! Signed log-distance transform shared by point placement and tick labels.
//!
//! Distance from the center line is `|log10(v) + OFFSET|` decades, so the
//! reference concentration `10^-OFFSET` (0.1 meq/L) sits on the center.
//! Tick `k` is labelled with `10^(|k| - OFFSET)`, the exact inverse.
//!
//! Zero policy: values `<= 0` (and non-finite values) are pinned to
//! distance 0, i.e. drawn on the center line, and never reach `log10`.
//!
//! The absolute value folds the scale at the reference: a value `n` decades
//! below 0.1 meq/L lands at the same distance as one `n` decades above it
//! (0.01 and 1 meq/L both sit one decade out). Tick labels only describe
//! values at or above the reference.

/// Decades added to `log10(v)` before taking the absolute value.
pub const OFFSET: f64 = 1.0;

/// Concentration (meq/L) drawn on the center line.
pub const REFERENCE_MEQ_L: f64 = 0.1;

/// True when `v` takes part in the logarithmic transform.
pub fn is_plottable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Unsigned distance from the center line, in decades.
pub fn distance(meq_l: f64) -> f64 {
    if is_plottable(meq_l) {
        (meq_l.log10() + OFFSET).abs()
    } else {
        0.0
    }
}

/// Concentration labelled at tick position `k` (decades from center).
pub fn concentration_at(k: i32) -> f64 {
    10f64.powi(k.abs() - OFFSET as i32)
}

/// Smallest symmetric decade span covering every plottable value; never below 1.
pub fn decade_span<I>(values: I) -> i32
where
    I: IntoIterator<Item = f64>,
{
    let max = values
        .into_iter()
        .filter(|v| is_plottable(*v))
        .map(distance)
        .fold(0.0_f64, f64::max);
    (max.ceil() as i32).max(1)
}

/// Above this, labels switch to exponent form (`1e23`).
const EXPONENT_LABEL_FROM: f64 = 1e15;

/// Tick label text: integers without a fraction, sub-unit values as decimals,
/// very large values as `<mantissa>e<exponent>`.
pub fn format_label(v: f64) -> String {
    if v >= EXPONENT_LABEL_FROM && v.is_finite() {
        let mut exp = v.log10().floor() as i32;
        let mut mantissa = ((v / 10f64.powi(exp)) * 1e6).round() / 1e6;
        if mantissa >= 10.0 {
            mantissa /= 10.0;
            exp += 1;
        }
        format!("{mantissa}e{exp}")
    } else if v >= 1.0 {
        format!("{v:.0}")
    } else {
        format!("{}", (v * 1e6).round() / 1e6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_concentration_sits_on_center() {
        assert!(distance(REFERENCE_MEQ_L) < 1e-12);
        assert!((concentration_at(0) - REFERENCE_MEQ_L).abs() < 1e-15);
    }

    #[test]
    fn zero_and_negative_are_pinned_to_center() {
        assert_eq!(distance(0.0), 0.0);
        assert_eq!(distance(-3.0), 0.0);
        assert_eq!(distance(f64::NAN), 0.0);
    }

    #[test]
    fn distance_grows_by_one_per_decade() {
        assert!((distance(1.0) - 1.0).abs() < 1e-12);
        assert!((distance(10.0) - 2.0).abs() < 1e-12);
        assert!((distance(0.01) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ticks_invert_the_forward_transform() {
        for k in 1..6 {
            let v = concentration_at(k);
            assert!((distance(v) - f64::from(k)).abs() < 1e-9);
            assert_eq!(concentration_at(-k), v);
        }
    }

    #[test]
    fn decade_span_has_a_floor_of_one() {
        assert_eq!(decade_span([0.0, -1.0]), 1);
        assert_eq!(decade_span([0.1]), 1);
        assert_eq!(decade_span([1205.0, 3.0]), 5);
    }

    #[test]
    fn labels_drop_trailing_fraction() {
        assert_eq!(format_label(0.1), "0.1");
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1000.0), "1000");
    }

    #[test]
    fn labels_for_far_decades_use_exponent_form() {
        assert_eq!(format_label(concentration_at(15)), "100000000000000");
        assert_eq!(format_label(concentration_at(17)), "1e16");
        assert_eq!(format_label(concentration_at(24)), "1e23");
        assert_eq!(format_label(concentration_at(-31)), "1e30");
        assert_eq!(format_label(2.5e20), "2.5e20");
    }
}
