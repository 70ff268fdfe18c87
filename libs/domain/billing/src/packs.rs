// [libs/domain/billing/src/packs.rs]
/*!
 * APARATO: ENERGY PACK CATALOG (L2)
 * RESPONSABILIDAD: TABLA COMPILE-TIME DE PACKS COMERCIALES
 *
 * Precios, cantidades y el bono de primera compra (`calculate_first_purchase_bonus`)
 * son los valores comerciales vigentes del catálogo de packs de energía.
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PackCode {
    CafeLuna,
    PetitDejLuna,
    RepasLuna,
    LunaUnlimited,
}

impl PackCode {
    pub fn as_str(self) -> &'static str {
        match self {
            PackCode::CafeLuna => "cafe_luna",
            PackCode::PetitDejLuna => "petit_dej_luna",
            PackCode::RepasLuna => "repas_luna",
            PackCode::LunaUnlimited => "luna_unlimited",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "cafe_luna" => Some(PackCode::CafeLuna),
            "petit_dej_luna" => Some(PackCode::PetitDejLuna),
            "repas_luna" => Some(PackCode::RepasLuna),
            "luna_unlimited" => Some(PackCode::LunaUnlimited),
            _ => None,
        }
    }
}

/// Un pack concede `energy_amount` de energía (subiendo hasta `max_energy`,
/// nunca más) salvo `LunaUnlimited`, que en su lugar conmuta la cuenta a
/// `SubscriptionType::Unlimited` y no registra una cantidad de energía.
#[derive(Debug, Clone, Copy)]
pub struct EnergyPack {
    pub code: PackCode,
    pub price_minor_units: u32,
    pub energy_amount: Option<f64>,
    pub bonus_first_purchase_pct: u32,
    pub is_subscription: bool,
}

pub const ENERGY_PACKS: &[EnergyPack] = &[
    EnergyPack {
        code: PackCode::CafeLuna,
        price_minor_units: 299,
        energy_amount: Some(100.0),
        bonus_first_purchase_pct: 10,
        is_subscription: false,
    },
    EnergyPack {
        code: PackCode::PetitDejLuna,
        price_minor_units: 599,
        energy_amount: Some(100.0),
        bonus_first_purchase_pct: 0,
        is_subscription: false,
    },
    EnergyPack {
        code: PackCode::RepasLuna,
        price_minor_units: 999,
        energy_amount: Some(100.0),
        bonus_first_purchase_pct: 0,
        is_subscription: false,
    },
    EnergyPack {
        code: PackCode::LunaUnlimited,
        price_minor_units: 2999,
        energy_amount: None,
        bonus_first_purchase_pct: 0,
        is_subscription: true,
    },
];

pub fn pack_by_code(code: PackCode) -> &'static EnergyPack {
    ENERGY_PACKS
        .iter()
        .find(|pack| pack.code == code)
        .expect("every PackCode variant must have a catalog entry")
}

/// Rounds down, matching the Python reference's integer-cents bonus math
/// (`calculate_first_purchase_bonus("cafe_luna", 100) == 10`).
pub fn first_purchase_bonus_units(pack: &EnergyPack, base_units: f64) -> f64 {
    if pack.bonus_first_purchase_pct == 0 {
        return 0.0;
    }
    (base_units * pack.bonus_first_purchase_pct as f64 / 100.0).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cafe_luna_grants_a_ten_percent_first_purchase_bonus() {
        let pack = pack_by_code(PackCode::CafeLuna);
        assert_eq!(first_purchase_bonus_units(pack, 100.0), 10.0);
    }

    #[test]
    fn other_packs_grant_no_bonus() {
        let pack = pack_by_code(PackCode::PetitDejLuna);
        assert_eq!(first_purchase_bonus_units(pack, 220.0), 0.0);
    }

    #[test]
    fn luna_unlimited_has_no_energy_amount() {
        let pack = pack_by_code(PackCode::LunaUnlimited);
        assert!(pack.energy_amount.is_none());
        assert!(pack.is_subscription);
    }

    #[test]
    fn pack_codes_round_trip_through_their_name() {
        for pack in ENERGY_PACKS {
            assert_eq!(PackCode::from_str(pack.code.as_str()), Some(pack.code));
        }
    }
}
