//! Published solubility-law variants.

pub mod allison;
pub mod dixon;
pub mod iacono_marziano;
pub mod liu;
pub mod shishkina;

pub use allison::{AllisonCarbon, AllisonForm, AllisonLocation};
pub use dixon::{DixonCarbon, DixonWater};
pub use iacono_marziano::{IaconoMarzianoCarbon, IaconoMarzianoWater, Parameterization};
pub use liu::{LiuCarbon, LiuWater};
pub use shishkina::{ShishkinaCarbon, ShishkinaWater};
