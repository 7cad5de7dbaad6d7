//! Session-scoped caches.
//!
//! Keyed on derived fingerprints and invalidated on roster or position
//! change. Nothing here is shared across sessions and nothing is a process
//! global.

use std::collections::HashMap;

use crate::model::weapon::{classify, max_effective_range, WeaponClass, WeaponSchema};
use crate::planner::Plan;

/// Classification plus max effective range, the two facts every range
/// check needs.
pub type WeaponProfile = (WeaponClass, i32);

#[derive(Debug, Clone, Default)]
pub struct SessionCaches {
    weapon_profiles: HashMap<String, WeaponProfile>,
    plans: HashMap<String, Plan>,
}

impl SessionCaches {
    pub fn new() -> Self {
        SessionCaches::default()
    }

    /// Memoized classify + range, keyed by weapon urn. Schemas are
    /// immutable per urn, so this never invalidates.
    pub fn weapon_profile(&mut self, schema: &WeaponSchema) -> WeaponProfile {
        *self
            .weapon_profiles
            .entry(schema.urn.clone())
            .or_insert_with(|| (classify(schema), max_effective_range(schema)))
    }

    pub fn plan_get(&self, fingerprint: &str) -> Option<&Plan> {
        self.plans.get(fingerprint)
    }

    pub fn plan_put(&mut self, fingerprint: String, plan: Plan) {
        self.plans.insert(fingerprint, plan);
    }

    /// Positions (or AP) moved: memoized plans are stale.
    pub fn invalidate_tactical(&mut self) {
        self.plans.clear();
    }

    /// Roster changed: everything derived is stale.
    pub fn invalidate_roster(&mut self) {
        self.plans.clear();
        self.weapon_profiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::weapon::unarmed;

    #[test]
    fn weapon_profile_is_memoized() {
        let mut caches = SessionCaches::new();
        let fists = unarmed();
        let first = caches.weapon_profile(&fists);
        let second = caches.weapon_profile(&fists);
        assert_eq!(first, second);
        assert_eq!(first, (WeaponClass::Melee, 1));
    }

    #[test]
    fn tactical_invalidation_keeps_weapon_profiles() {
        let mut caches = SessionCaches::new();
        caches.weapon_profile(&unarmed());
        caches.plan_put("fp".into(), Plan::empty());
        caches.invalidate_tactical();
        assert!(caches.plan_get("fp").is_none());
        assert_eq!(caches.weapon_profiles.len(), 1);
    }
}
