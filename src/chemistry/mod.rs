//! Chemistry module: ion reference data and unit conversion for Stiff diagrams.
//!
//! This module provides:
//! - Molar masses (g/mol) and valences for the major ions plotted on a Stiff diagram
//! - Equivalent weights derived as molar mass / valence
//! - Conversions between mass concentration (mg/L) and equivalent concentration (meq/L)
//! - The two fixed ion sets (basic 8-ion, extended 13-ion) and their default rank orders
//!
//! Units conventions:
//! - Mass concentrations are mg/L
//! - Equivalent concentrations are meq/L
//! - Equivalent weights are mg/meq (numerically g/eq)
//!
//! Design notes:
//! - The reference table is a `static` slice; nothing mutates it at runtime
//! - Lookups trim whitespace and ignore ASCII case, returning the canonical symbol
//! - Unknown ions return `None` rather than a NaN-producing factor
//!
//! # Examples
//! ```rust
//! use stiff_rs::chemistry::{ion_spec, mg_l_to_meq_l, meq_l_to_mg_l};
//!
//! let na = ion_spec("Na").unwrap();
//! let meq = mg_l_to_meq_l(22.989_769, na);
//! assert!((meq - 1.0).abs() < 1e-9);
//! assert!((meq_l_to_mg_l(meq, na) - 22.989_769).abs() < 1e-9);
//! ```
//!
//! # Limitations
//! Iron is always treated as Fe(II). Carbonate species are taken as reported;
//! no pH-driven partitioning between HCO3 and CO3 is attempted.
use crate::models::IonSet;

/// Molar masses (g/mol), IUPAC standard atomic weights.
pub const M_NA: f64 = 22.989_769_28;
pub const M_K: f64 = 39.098_3;
pub const M_CA: f64 = 40.078;
pub const M_MG: f64 = 24.305;
pub const M_FE: f64 = 55.845;
pub const M_SR: f64 = 87.62;
pub const M_BA: f64 = 137.327;
pub const M_CL: f64 = 35.453;
pub const M_HCO3: f64 = 61.016_8; // H + C + 3 O
pub const M_SO4: f64 = 96.062_6; // S + 4 O
pub const M_CO3: f64 = 60.008_9; // C + 3 O
pub const M_NO3: f64 = 62.004_9; // N + 3 O
pub const M_F: f64 = 18.998_403_163;

/// Natural charge sign of an ion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Cation,
    Anion,
}

/// Static reference data for one ion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IonSpec {
    pub symbol: &'static str,
    pub polarity: Polarity,
    /// g/mol
    pub molar_mass: f64,
    /// Absolute ionic charge.
    pub valence: u8,
}

impl IonSpec {
    /// mg per meq (molar mass / valence).
    pub fn equivalent_weight(&self) -> f64 {
        self.molar_mass / f64::from(self.valence)
    }
}

const fn spec(symbol: &'static str, polarity: Polarity, molar_mass: f64, valence: u8) -> IonSpec {
    IonSpec {
        symbol,
        polarity,
        molar_mass,
        valence,
    }
}

/// Every ion this crate knows about (the extended set).
pub static IONS: [IonSpec; 13] = [
    spec("Na", Polarity::Cation, M_NA, 1),
    spec("K", Polarity::Cation, M_K, 1),
    spec("Ca", Polarity::Cation, M_CA, 2),
    spec("Mg", Polarity::Cation, M_MG, 2),
    spec("Fe", Polarity::Cation, M_FE, 2),
    spec("Sr", Polarity::Cation, M_SR, 2),
    spec("Ba", Polarity::Cation, M_BA, 2),
    spec("Cl", Polarity::Anion, M_CL, 1),
    spec("HCO3", Polarity::Anion, M_HCO3, 1),
    spec("SO4", Polarity::Anion, M_SO4, 2),
    spec("CO3", Polarity::Anion, M_CO3, 2),
    spec("NO3", Polarity::Anion, M_NO3, 1),
    spec("F", Polarity::Anion, M_F, 1),
];

/// Top-to-bottom rank orders for the basic set.
pub const BASIC_CATIONS: [&str; 4] = ["Na", "Ca", "Mg", "Fe"];
pub const BASIC_ANIONS: [&str; 4] = ["Cl", "HCO3", "SO4", "CO3"];

/// Top-to-bottom rank orders for the extended set.
pub const EXTENDED_CATIONS: [&str; 7] = ["Na", "K", "Ca", "Mg", "Sr", "Ba", "Fe"];
pub const EXTENDED_ANIONS: [&str; 6] = ["Cl", "HCO3", "SO4", "CO3", "NO3", "F"];

impl IonSet {
    pub fn cation_order(self) -> &'static [&'static str] {
        match self {
            IonSet::Basic => &BASIC_CATIONS,
            IonSet::Extended => &EXTENDED_CATIONS,
        }
    }

    pub fn anion_order(self) -> &'static [&'static str] {
        match self {
            IonSet::Basic => &BASIC_ANIONS,
            IonSet::Extended => &EXTENDED_ANIONS,
        }
    }

    pub fn contains(self, symbol: &str) -> bool {
        self.cation_order().contains(&symbol) || self.anion_order().contains(&symbol)
    }

    /// Reference entry for `raw` if it belongs to this set.
    pub fn lookup(self, raw: &str) -> Option<&'static IonSpec> {
        ion_spec(raw).filter(|s| self.contains(s.symbol))
    }
}

/// Look up an ion by symbol, ignoring surrounding whitespace and ASCII case.
pub fn ion_spec(raw: &str) -> Option<&'static IonSpec> {
    let wanted = raw.trim();
    IONS.iter()
        .find(|s| s.symbol.eq_ignore_ascii_case(wanted))
}

/// mg/L -> meq/L.
pub fn mg_l_to_meq_l(mg_l: f64, ion: &IonSpec) -> f64 {
    mg_l / ion.equivalent_weight()
}

/// meq/L -> mg/L.
pub fn meq_l_to_mg_l(meq_l: f64, ion: &IonSpec) -> f64 {
    meq_l * ion.equivalent_weight()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalent_weights_match_published_values() {
        let cases = [
            ("Na", 22.99),
            ("Ca", 20.04),
            ("Mg", 12.15),
            ("Fe", 27.92),
            ("Cl", 35.45),
            ("HCO3", 61.02),
            ("SO4", 48.03),
            ("CO3", 30.00),
        ];
        for (sym, expected) in cases {
            let w = ion_spec(sym).unwrap().equivalent_weight();
            assert!((w - expected).abs() < 0.01, "{sym}: {w} vs {expected}");
        }
    }

    #[test]
    fn lookup_is_case_insensitive_and_canonical() {
        assert_eq!(ion_spec(" hco3 ").map(|s| s.symbol), Some("HCO3"));
        assert!(ion_spec("Br").is_none());
    }

    #[test]
    fn basic_set_excludes_extended_ions() {
        assert!(IonSet::Basic.lookup("K").is_none());
        assert!(IonSet::Extended.lookup("K").is_some());
        assert_eq!(IonSet::Extended.cation_order().len() + IonSet::Extended.anion_order().len(), 13);
    }

    #[test]
    fn rank_orders_agree_with_polarity() {
        for set in [IonSet::Basic, IonSet::Extended] {
            for sym in set.cation_order() {
                assert_eq!(ion_spec(sym).unwrap().polarity, Polarity::Cation);
            }
            for sym in set.anion_order() {
                assert_eq!(ion_spec(sym).unwrap().polarity, Polarity::Anion);
            }
        }
    }
}
