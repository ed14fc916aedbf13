//! This module defines the unit types used for power-plant quantities.

macro_rules! unit_struct {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            PartialOrd,
            derive_more::Add,
            derive_more::Sub,
            serde::Deserialize,
            serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the value is finite and not negative
            pub fn is_finite_non_negative(self) -> bool {
                self.0.is_finite() && self.0 >= 0.0
            }
        }

        impl From<f64> for $name {
            fn from(val: f64) -> Self {
                Self(val)
            }
        }
    };
}

unit_struct!(Capacity, "Installed electrical capacity in MW.");
unit_struct!(Energy, "Yearly energy production in MWh.");
unit_struct!(MoneyPerEnergy, "A tariff rate in CHF per kWh.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_arithmetic() {
        assert_eq!(Capacity(1.5) + Capacity(2.0), Capacity(3.5));
        assert_eq!(Energy(10.0) - Energy(4.0), Energy(6.0));
    }

    #[test]
    fn test_is_finite_non_negative() {
        assert!(Capacity(0.0).is_finite_non_negative());
        assert!(!Capacity(-1.0).is_finite_non_negative());
        assert!(!Energy(f64::NAN).is_finite_non_negative());
        assert!(!Energy(f64::INFINITY).is_finite_non_negative());
    }
}
