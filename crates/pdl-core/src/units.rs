//! Known physical quantities and their units.
//!
//! Each unit maps to the factor converting a value in that unit to SI.

/// `(quantity, &[(unit, factor to SI)])`
const UNITS: &[(&str, &[(&str, f64)])] = &[
    (
        "length",
        &[
            ("m", 1.0),
            ("mm", 1e-3),
            ("cm", 1e-2),
            ("km", 1e3),
            ("um", 1e-6),
            ("in", 0.0254),
            ("ft", 0.3048),
        ],
    ),
    ("area", &[("m2", 1.0), ("cm2", 1e-4), ("mm2", 1e-6)]),
    ("volume", &[("m3", 1.0), ("l", 1e-3), ("cm3", 1e-6), ("mm3", 1e-9)]),
    (
        "time",
        &[
            ("s", 1.0),
            ("ms", 1e-3),
            ("min", 60.0),
            ("h", 3600.0),
            ("d", 86400.0),
        ],
    ),
    ("mass", &[("kg", 1.0), ("g", 1e-3), ("t", 1e3)]),
    (
        "velocity",
        &[("m_per_s", 1.0), ("km_per_h", 1.0 / 3.6), ("kn", 1852.0 / 3600.0)],
    ),
    ("acceleration", &[("m_per_s2", 1.0)]),
    ("angle", &[("rad", 1.0), ("deg", std::f64::consts::PI / 180.0)]),
    ("angularvelocity", &[("rad_per_s", 1.0), ("rpm", std::f64::consts::PI / 30.0)]),
    ("force", &[("N", 1.0), ("kN", 1e3), ("MN", 1e6)]),
    (
        "pressure",
        &[("Pa", 1.0), ("kPa", 1e3), ("MPa", 1e6), ("GPa", 1e9), ("bar", 1e5)],
    ),
    ("density", &[("kg_per_m3", 1.0), ("g_per_cm3", 1e3)]),
    ("temperature", &[("K", 1.0)]),
    ("power", &[("W", 1.0), ("kW", 1e3), ("MW", 1e6)]),
    ("dimensionless", &[("1", 1.0), ("percent", 1e-2)]),
];

/// Returns the factor converting `unit` of `quantity` to SI.
///
/// Returns `None` if the quantity or the unit is unknown.
///
/// # Examples
///
/// ```
/// use pdl_core::units;
///
/// assert_eq!(units::lookup("length", "mm"), Some(1e-3));
/// assert_eq!(units::lookup("length", "kg"), None);
/// ```
pub fn lookup(quantity: &str, unit: &str) -> Option<f64> {
    UNITS
        .iter()
        .find(|(q, _)| *q == quantity)
        .and_then(|(_, units)| units.iter().find(|(u, _)| *u == unit))
        .map(|(_, factor)| *factor)
}

/// Returns `true` if `quantity` names a known quantity.
pub fn is_quantity(quantity: &str) -> bool {
    UNITS.iter().any(|(q, _)| *q == quantity)
}

/// Returns the unit names of `quantity`, or an empty list if it is unknown.
pub fn units_of(quantity: &str) -> Vec<&'static str> {
    UNITS
        .iter()
        .find(|(q, _)| *q == quantity)
        .map(|(_, units)| units.iter().map(|(u, _)| *u).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("pressure", "bar"), Some(1e5));
        assert_eq!(lookup("unknown", "m"), None);
    }

    #[test]
    fn test_quantities() {
        assert!(is_quantity("angle"));
        assert!(!is_quantity("happiness"));
        assert_eq!(units_of("mass"), vec!["kg", "g", "t"]);
        assert!(units_of("happiness").is_empty());
    }
}
