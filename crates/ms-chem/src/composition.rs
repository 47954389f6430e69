//! Melt compositions in oxide weight percent.

use crate::error::{ChemError, ChemResult};
use crate::oxides::{Oxide, Volatile};
use serde::{Deserialize, Serialize};

/// Dense per-oxide value map.
///
/// Conversion results (mole fractions, cation fractions, ...) come back as
/// one of these: every oxide has a slot, so lookups cannot fail and absent
/// species read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OxideMap([f64; Oxide::COUNT]);

impl OxideMap {
    pub(crate) fn zeros() -> Self {
        Self([0.0; Oxide::COUNT])
    }

    #[inline]
    pub fn get(&self, oxide: Oxide) -> f64 {
        self.0[oxide.index()]
    }

    #[inline]
    pub(crate) fn set(&mut self, oxide: Oxide, value: f64) {
        self.0[oxide.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Oxide, f64)> + '_ {
        Oxide::ALL.iter().map(|&ox| (ox, self.get(ox)))
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Normalization strategies for oxide weight-percent compositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Scale everything, volatiles included, to a 100 wt% total.
    Standard,
    /// Hold H2O and CO2 fixed; scale the remaining oxides so the grand
    /// total is 100 wt%.
    FixedVolatiles,
    /// Scale the volatile-free part to 100 wt% and carry the volatiles on
    /// top unchanged (totals above 100 are expected).
    AdditionalVolatiles,
    /// Drop H2O and CO2 entirely and scale the rest to 100 wt%.
    Anhydrous,
}

/// A melt composition as oxide weight percent.
///
/// All 16 oxides are always present (missing input oxides default to 0.0).
/// Transformations return new values; no method mutates `self` or any
/// caller-supplied data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    wt: OxideMap,
}

impl Composition {
    /// Build a composition from oxide/wt% pairs.
    ///
    /// Unlisted oxides default to 0.0. Values must be finite and
    /// non-negative. Listing the same oxide twice keeps the last value.
    pub fn new(pairs: impl IntoIterator<Item = (Oxide, f64)>) -> ChemResult<Self> {
        let mut wt = OxideMap::zeros();
        for (oxide, value) in pairs {
            if !value.is_finite() {
                return Err(ChemError::NonPhysical {
                    what: "non-finite oxide weight percent",
                });
            }
            if value < 0.0 {
                return Err(ChemError::NonPhysical {
                    what: "negative oxide weight percent",
                });
            }
            wt.set(oxide, value);
        }
        Ok(Self { wt })
    }

    /// Build a composition from oxide mole-percent (or mole-fraction)
    /// pairs, converting to weight percent.
    pub fn from_mole_percent(pairs: impl IntoIterator<Item = (Oxide, f64)>) -> ChemResult<Self> {
        let mols = Composition::new(pairs)?;
        let mut mass = OxideMap::zeros();
        for (oxide, m) in mols.wt.iter() {
            mass.set(oxide, m * oxide.molar_mass());
        }
        let total = mass.sum();
        if total <= 0.0 {
            return Err(ChemError::NonPhysical {
                what: "mole percent sums to zero",
            });
        }
        let mut wt = OxideMap::zeros();
        for (oxide, m) in mass.iter() {
            wt.set(oxide, 100.0 * m / total);
        }
        Ok(Self { wt })
    }

    /// Weight percent of one oxide.
    #[inline]
    pub fn get(&self, oxide: Oxide) -> f64 {
        self.wt.get(oxide)
    }

    /// Weight percent of a volatile species.
    #[inline]
    pub fn volatile(&self, species: Volatile) -> f64 {
        self.get(species.oxide())
    }

    /// A copy of this composition with one oxide replaced.
    pub fn with(&self, oxide: Oxide, value: f64) -> ChemResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(ChemError::NonPhysical {
                what: "oxide weight percent must be finite and non-negative",
            });
        }
        let mut wt = self.wt;
        wt.set(oxide, value);
        Ok(Self { wt })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Oxide, f64)> + '_ {
        self.wt.iter()
    }

    /// Grand total including volatiles [wt%].
    pub fn total(&self) -> f64 {
        self.wt.sum()
    }

    /// Total of the volatile-free part [wt%].
    pub fn total_anhydrous(&self) -> f64 {
        self.iter()
            .filter(|(ox, _)| !ox.is_volatile())
            .map(|(_, v)| v)
            .sum()
    }

    /// Apply a normalization strategy, returning the normalized copy.
    pub fn normalized(&self, strategy: Normalization) -> ChemResult<Self> {
        let mut wt = OxideMap::zeros();
        match strategy {
            Normalization::Standard => {
                let total = self.total();
                if total <= 0.0 {
                    return Err(ChemError::NonPhysical {
                        what: "composition sums to zero",
                    });
                }
                for (oxide, v) in self.iter() {
                    wt.set(oxide, 100.0 * v / total);
                }
            }
            Normalization::FixedVolatiles => {
                let volatiles = self.get(Oxide::H2O) + self.get(Oxide::CO2);
                let anhydrous = self.total_anhydrous();
                if anhydrous <= 0.0 {
                    return Err(ChemError::NonPhysical {
                        what: "volatile-free part sums to zero",
                    });
                }
                if volatiles >= 100.0 {
                    return Err(ChemError::NonPhysical {
                        what: "volatiles meet or exceed 100 wt%",
                    });
                }
                let scale = (100.0 - volatiles) / anhydrous;
                for (oxide, v) in self.iter() {
                    if oxide.is_volatile() {
                        wt.set(oxide, v);
                    } else {
                        wt.set(oxide, v * scale);
                    }
                }
            }
            Normalization::AdditionalVolatiles => {
                let anhydrous = self.total_anhydrous();
                if anhydrous <= 0.0 {
                    return Err(ChemError::NonPhysical {
                        what: "volatile-free part sums to zero",
                    });
                }
                for (oxide, v) in self.iter() {
                    if oxide.is_volatile() {
                        wt.set(oxide, v);
                    } else {
                        wt.set(oxide, 100.0 * v / anhydrous);
                    }
                }
            }
            Normalization::Anhydrous => {
                let anhydrous = self.total_anhydrous();
                if anhydrous <= 0.0 {
                    return Err(ChemError::NonPhysical {
                        what: "volatile-free part sums to zero",
                    });
                }
                for (oxide, v) in self.iter() {
                    if !oxide.is_volatile() {
                        wt.set(oxide, 100.0 * v / anhydrous);
                    }
                }
            }
        }
        Ok(Self { wt })
    }

    /// Molar oxide fractions on the full (hydrous) basis.
    pub fn mole_oxide_fractions(&self) -> OxideMap {
        self.mole_fractions_with(|_| true, |_| 1.0)
    }

    /// Molar oxide fractions with H2O and CO2 excluded.
    pub fn mole_oxide_fractions_anhydrous(&self) -> OxideMap {
        self.mole_fractions_with(|ox| !ox.is_volatile(), |_| 1.0)
    }

    /// Cation mole fractions on the full basis (each oxide weighted by its
    /// cations per formula unit).
    pub fn cation_fractions(&self) -> OxideMap {
        self.mole_fractions_with(|_| true, |ox| ox.cation_count())
    }

    /// Cation mole fractions with the volatiles excluded.
    pub fn cation_fractions_anhydrous(&self) -> OxideMap {
        self.mole_fractions_with(|ox| !ox.is_volatile(), |ox| ox.cation_count())
    }

    /// Single-oxygen-basis fractions (each oxide weighted by its oxygens
    /// per formula unit).
    pub fn single_oxygen_fractions(&self) -> OxideMap {
        self.mole_fractions_with(|_| true, |ox| ox.oxygen_count())
    }

    /// Mole fraction of one volatile among all oxides in the bulk.
    ///
    /// This is the "total" mole fraction the lever rule balances against
    /// when splitting the system between melt and fluid.
    pub fn bulk_volatile_mole_fraction(&self, species: Volatile) -> f64 {
        self.mole_oxide_fractions().get(species.oxide())
    }

    fn mole_fractions_with(
        &self,
        include: impl Fn(Oxide) -> bool,
        weight: impl Fn(Oxide) -> f64,
    ) -> OxideMap {
        let mut mols = OxideMap::zeros();
        for (oxide, wtpct) in self.iter() {
            if include(oxide) {
                mols.set(oxide, weight(oxide) * wtpct / oxide.molar_mass());
            }
        }
        let total = mols.sum();
        let mut out = OxideMap::zeros();
        if total > 0.0 {
            for (oxide, m) in mols.iter() {
                out.set(oxide, m / total);
            }
        }
        out
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn standard_normalization_total_is_100(
            si in 1.0_f64..80.0,
            al in 0.0_f64..25.0,
            mg in 0.0_f64..20.0,
            h2o in 0.0_f64..10.0,
        ) {
            let comp = Composition::new([
                (Oxide::SiO2, si),
                (Oxide::Al2O3, al),
                (Oxide::MgO, mg),
                (Oxide::H2O, h2o),
            ]).unwrap();
            let norm = comp.normalized(Normalization::Standard).unwrap();
            prop_assert!((norm.total() - 100.0).abs() < 1e-9);
        }

        #[test]
        fn normalization_is_idempotent(
            si in 1.0_f64..80.0,
            ca in 0.0_f64..20.0,
            co2 in 0.0_f64..5.0,
        ) {
            let comp = Composition::new([
                (Oxide::SiO2, si),
                (Oxide::CaO, ca),
                (Oxide::CO2, co2),
            ]).unwrap();
            for strategy in [
                Normalization::Standard,
                Normalization::FixedVolatiles,
                Normalization::AdditionalVolatiles,
                Normalization::Anhydrous,
            ] {
                let once = comp.normalized(strategy).unwrap();
                let twice = once.normalized(strategy).unwrap();
                for (ox, v) in once.iter() {
                    prop_assert!((v - twice.get(ox)).abs() < 1e-9);
                }
            }
        }
    }
}
