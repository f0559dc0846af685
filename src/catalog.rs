//! The fixed list of items scraped on every run.

use crate::error::{Error, Result};
use crate::quote::ItemId;
use std::collections::HashSet;
use std::sync::Arc;

/// Item slugs as they appear in marketplace URLs.
pub const ITEMS: &[&str] = &[
    "primed_continuity",
    "transient_fortitude",
    "primed_flow",
    "blind_rage",
    "primed_ravage",
    "primed_ammo_stock",
    "primed_bane_of_corpus",
    "primed_bane_of_grineer",
    "primed_bane_of_infested",
    "primed_bane_of_corrupted",
    "primed_animal_instinct",
    "primed_redirection",
    "primed_reach",
    "primed_regen",
    "primed_rubedo_lined_barrel",
    "primed_charged_shell",
    "primed_chilling_grasp",
    "primed_cleanse_corpus",
    "primed_cleanse_grineer",
    "primed_cleanse_infested",
    "primed_cleanse_corrupted",
    "primed_convulsion",
    "primed_cryo_rounds",
    "primed_deadly_efficiency",
    "primed_dual_rounds",
    "primed_expel_corpus",
    "primed_expel_grineer",
    "primed_expel_infested",
    "primed_expel_corrupted",
    "primed_fast_hands",
    "primed_fever_strike",
    "primed_firestorm",
    "primed_fulmination",
    "primed_heated_charge",
    "primed_heavy_trauma",
    "primed_magazine_warp",
    "primed_morphic_transformer",
    "primed_pack_leader",
    "primed_pistol_ammo_mutation",
    "primed_pistol_gambit",
    "primed_point_blank",
    "primed_pressure_point",
    "primed_quickdraw",
    "primed_rifle_ammo_mutation",
    "primed_shotgun_ammo_mutation",
    "primed_slip_magazine",
    "primed_smite_corpus",
    "primed_smite_grineer",
    "primed_smite_infested",
    "primed_smite_corrupted",
    "primed_sniper_ammo_mutation",
    "primed_tactical_pump",
    "primed_target_cracker",
    "galvanized_aptitude",
    "galvanized_acceleration",
    "galvanized_chamber",
    "galvanized_crosshairs",
    "galvanized_diffusion",
    "galvanized_hell",
];

/// Ordered, read-only set of item ids. Cloning shares the underlying list.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Arc<[ItemId]>,
}

impl Catalog {
    /// Builds a catalog, rejecting empty lists and duplicate ids.
    pub fn new<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<ItemId> = items.into_iter().map(ItemId::new).collect();
        if items.is_empty() {
            return Err(Error::Config("catalog is empty".into()));
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.as_str().trim().is_empty() {
                return Err(Error::Config("catalog contains a blank item id".into()));
            }
            if !seen.insert(item.as_str()) {
                return Err(Error::Config(format!("duplicate catalog entry: {item}")));
            }
        }

        Ok(Self {
            items: items.into(),
        })
    }

    /// The compiled-in catalog.
    pub fn builtin() -> Result<Self> {
        Self::new(ITEMS.iter().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), ITEMS.len());
        assert_eq!(catalog.iter().next().unwrap().as_str(), "primed_continuity");
    }

    #[test]
    fn rejects_duplicates() {
        let err = Catalog::new(["a", "b", "a"]).unwrap_err();
        assert!(err.to_string().contains("duplicate catalog entry: a"));
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(Catalog::new(Vec::<String>::new()).is_err());
        assert!(Catalog::new(["ok", "  "]).is_err());
    }

    #[test]
    fn preserves_order() {
        let catalog = Catalog::new(["c", "a", "b"]).unwrap();
        let ids: Vec<&str> = catalog.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
