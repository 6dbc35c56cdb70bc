//! The fixed catalogue of makerspace facilities a visitor can report using.

pub const FACILITIES: [&str; 12] = [
    "3D Printer",
    "Laser Cutter",
    "Robotics",
    "Tablet",
    "Desktop Computer",
    "Cricut",
    "Polymer Clay",
    "Heat Press",
    "Heat Shrink",
    "Button Pin",
    "Art Supplies",
    "Jewelry Making",
];

/// Catalogue spelling of `name`, matched case-insensitively after trimming.
pub fn canonical_facility(name: &str) -> Option<&'static str> {
    let wanted = name.trim();
    FACILITIES
        .iter()
        .copied()
        .find(|facility| facility.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_facility() {
        assert_eq!(canonical_facility("laser cutter"), Some("Laser Cutter"));
        assert_eq!(canonical_facility("  3D Printer "), Some("3D Printer"));
        assert_eq!(canonical_facility("Welding"), None);
    }
}
