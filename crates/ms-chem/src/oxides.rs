//! Major-element oxide definitions.

use serde::{Deserialize, Serialize};

/// The 16 major-element oxides every melt composition carries.
///
/// The vocabulary is fixed; compositions store a dense value for every
/// variant so no lookup can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Oxide {
    SiO2,
    TiO2,
    Al2O3,
    Fe2O3,
    Cr2O3,
    FeO,
    MnO,
    MgO,
    NiO,
    CoO,
    CaO,
    Na2O,
    K2O,
    P2O5,
    H2O,
    CO2,
}

impl Oxide {
    pub const COUNT: usize = 16;

    pub const ALL: [Oxide; Oxide::COUNT] = [
        Oxide::SiO2,
        Oxide::TiO2,
        Oxide::Al2O3,
        Oxide::Fe2O3,
        Oxide::Cr2O3,
        Oxide::FeO,
        Oxide::MnO,
        Oxide::MgO,
        Oxide::NiO,
        Oxide::CoO,
        Oxide::CaO,
        Oxide::Na2O,
        Oxide::K2O,
        Oxide::P2O5,
        Oxide::H2O,
        Oxide::CO2,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn key(&self) -> &'static str {
        match self {
            Oxide::SiO2 => "SiO2",
            Oxide::TiO2 => "TiO2",
            Oxide::Al2O3 => "Al2O3",
            Oxide::Fe2O3 => "Fe2O3",
            Oxide::Cr2O3 => "Cr2O3",
            Oxide::FeO => "FeO",
            Oxide::MnO => "MnO",
            Oxide::MgO => "MgO",
            Oxide::NiO => "NiO",
            Oxide::CoO => "CoO",
            Oxide::CaO => "CaO",
            Oxide::Na2O => "Na2O",
            Oxide::K2O => "K2O",
            Oxide::P2O5 => "P2O5",
            Oxide::H2O => "H2O",
            Oxide::CO2 => "CO2",
        }
    }

    /// Formula weight [g/mol].
    pub fn molar_mass(&self) -> f64 {
        match self {
            Oxide::SiO2 => 60.085,
            Oxide::TiO2 => 79.867,
            Oxide::Al2O3 => 101.964,
            Oxide::Fe2O3 => 159.69,
            Oxide::Cr2O3 => 151.992,
            Oxide::FeO => 71.845,
            Oxide::MnO => 70.938,
            Oxide::MgO => 40.305,
            Oxide::NiO => 74.693,
            Oxide::CoO => 74.933,
            Oxide::CaO => 56.078,
            Oxide::Na2O => 61.98,
            Oxide::K2O => 94.196,
            Oxide::P2O5 => 141.948,
            Oxide::H2O => 18.02,
            Oxide::CO2 => 44.01,
        }
    }

    /// Cations per formula unit.
    pub fn cation_count(&self) -> f64 {
        match self {
            Oxide::SiO2
            | Oxide::TiO2
            | Oxide::FeO
            | Oxide::MnO
            | Oxide::MgO
            | Oxide::NiO
            | Oxide::CoO
            | Oxide::CaO
            | Oxide::CO2 => 1.0,
            Oxide::Al2O3
            | Oxide::Fe2O3
            | Oxide::Cr2O3
            | Oxide::Na2O
            | Oxide::K2O
            | Oxide::P2O5
            | Oxide::H2O => 2.0,
        }
    }

    /// Oxygens per formula unit (single-oxygen-basis conversions).
    pub fn oxygen_count(&self) -> f64 {
        match self {
            Oxide::SiO2 | Oxide::TiO2 | Oxide::CO2 => 2.0,
            Oxide::Al2O3 | Oxide::Fe2O3 | Oxide::Cr2O3 => 3.0,
            Oxide::P2O5 => 5.0,
            Oxide::FeO
            | Oxide::MnO
            | Oxide::MgO
            | Oxide::NiO
            | Oxide::CoO
            | Oxide::CaO
            | Oxide::Na2O
            | Oxide::K2O
            | Oxide::H2O => 1.0,
        }
    }

    /// Formal charge of the cation.
    pub fn cation_charge(&self) -> f64 {
        match self {
            Oxide::SiO2 | Oxide::TiO2 | Oxide::CO2 => 4.0,
            Oxide::Al2O3 | Oxide::Fe2O3 | Oxide::Cr2O3 => 3.0,
            Oxide::P2O5 => 5.0,
            Oxide::H2O | Oxide::Na2O | Oxide::K2O => 1.0,
            Oxide::FeO
            | Oxide::MnO
            | Oxide::MgO
            | Oxide::NiO
            | Oxide::CoO
            | Oxide::CaO => 2.0,
        }
    }

    /// Atomic mass of the cation [g/mol].
    pub fn cation_mass(&self) -> f64 {
        match self {
            Oxide::SiO2 => 28.085,
            Oxide::TiO2 => 47.867,
            Oxide::Al2O3 => 26.982,
            Oxide::Fe2O3 => 55.845,
            Oxide::Cr2O3 => 51.996,
            Oxide::FeO => 55.845,
            Oxide::MnO => 54.938,
            Oxide::MgO => 24.305,
            Oxide::NiO => 58.693,
            Oxide::CoO => 58.933,
            Oxide::CaO => 40.078,
            Oxide::Na2O => 22.99,
            Oxide::K2O => 39.098,
            Oxide::P2O5 => 30.974,
            Oxide::H2O => 1.008,
            Oxide::CO2 => 12.01,
        }
    }

    /// Whether this oxide is one of the two volatile species.
    pub fn is_volatile(&self) -> bool {
        matches!(self, Oxide::H2O | Oxide::CO2)
    }
}

impl std::str::FromStr for Oxide {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SiO2" => Ok(Oxide::SiO2),
            "TiO2" => Ok(Oxide::TiO2),
            "Al2O3" => Ok(Oxide::Al2O3),
            "Fe2O3" => Ok(Oxide::Fe2O3),
            "Cr2O3" => Ok(Oxide::Cr2O3),
            "FeO" => Ok(Oxide::FeO),
            "MnO" => Ok(Oxide::MnO),
            "MgO" => Ok(Oxide::MgO),
            "NiO" => Ok(Oxide::NiO),
            "CoO" => Ok(Oxide::CoO),
            "CaO" => Ok(Oxide::CaO),
            "Na2O" => Ok(Oxide::Na2O),
            "K2O" => Ok(Oxide::K2O),
            "P2O5" => Ok(Oxide::P2O5),
            "H2O" => Ok(Oxide::H2O),
            "CO2" => Ok(Oxide::CO2),
            _ => Err("unknown oxide"),
        }
    }
}

/// The two volatile species the solubility framework models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Volatile {
    H2O,
    CO2,
}

impl Volatile {
    pub fn oxide(&self) -> Oxide {
        match self {
            Volatile::H2O => Oxide::H2O,
            Volatile::CO2 => Oxide::CO2,
        }
    }

    pub fn key(&self) -> &'static str {
        self.oxide().key()
    }

    /// Molar mass of the fluid species [g/mol].
    pub fn molar_mass(&self) -> f64 {
        self.oxide().molar_mass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_covers_every_variant() {
        assert_eq!(Oxide::ALL.len(), Oxide::COUNT);
        for (i, ox) in Oxide::ALL.iter().enumerate() {
            assert_eq!(ox.index(), i);
        }
    }

    #[test]
    fn key_round_trip() {
        for ox in Oxide::ALL {
            let parsed = ox.key().parse::<Oxide>().expect("canonical key parses");
            assert_eq!(parsed, ox);
        }
        assert!("FooO2".parse::<Oxide>().is_err());
    }

    #[test]
    fn volatile_subset() {
        assert!(Oxide::H2O.is_volatile());
        assert!(Oxide::CO2.is_volatile());
        assert!(!Oxide::SiO2.is_volatile());
        assert_eq!(Volatile::CO2.molar_mass(), 44.01);
        assert_eq!(Volatile::H2O.molar_mass(), 18.02);
    }
}
