//! The ship aggregate: raw data, module lines, the current configuration and
//! everything stacked on top of it.

use crate::config::{Configuration, Descriptor, Stat, resolve};
use crate::error::{Result, ShipError};
use crate::modifier::{Camouflage, Captain, Modernization, Modifier, ModifierTargets, typeinfo};
use crate::upgrade::{ModuleLines, build_module_lines, modules_from_upgrade_info};

use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

const UPGRADE_INFO: &str = "ShipUpgradeInfo";

/// Identity of a ship as seen by eligibility checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShipInfo {
    pub name: String,
    pub species: String,
    pub nation: String,
    pub tier: u32,
    pub permoflages: Vec<String>,
}

impl ShipInfo {
    pub fn from_object(object: &Value) -> ShipInfo {
        let text = |v: Option<&Value>| v.and_then(Value::as_str).unwrap_or_default().to_string();
        let typeinfo = object.get("typeinfo");
        ShipInfo {
            name: text(object.get("name")),
            species: text(typeinfo.and_then(|t| t.get("species"))),
            nation: text(typeinfo.and_then(|t| t.get("nation"))),
            tier: object
                .get("level")
                .and_then(Value::as_u64)
                .and_then(|l| u32::try_from(l).ok())
                .unwrap_or_default(),
            permoflages: object
                .get("permoflages")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
pub struct Ship {
    data: Arc<Value>,
    info: ShipInfo,
    targets: Arc<ModifierTargets>,
    module_lines: Option<ModuleLines>,
    descriptor: String,
    configuration: Configuration,
    modernizations: Vec<Modernization>,
    captain: Option<Captain>,
    camouflage: Option<Camouflage>,
}

impl Ship {
    /// A ship in its stock configuration.
    pub fn new(data: impl Into<Arc<Value>>, targets: Arc<ModifierTargets>) -> Result<Ship> {
        Ship::with_descriptor(data, "stock", targets)
    }

    pub fn with_descriptor(
        data: impl Into<Arc<Value>>,
        descriptor: &str,
        targets: Arc<ModifierTargets>,
    ) -> Result<Ship> {
        let data = data.into();
        match typeinfo(&data).0 {
            Some("Ship") => {}
            found => {
                return Err(ShipError::TypeArgument {
                    expected: "Ship",
                    found: found.unwrap_or("untyped object").to_string(),
                });
            }
        }
        targets.validate()?;
        let mut ship = Ship {
            info: ShipInfo::from_object(&data),
            data,
            targets,
            module_lines: None,
            descriptor: String::new(),
            configuration: Configuration::default(),
            modernizations: Vec::new(),
            captain: None,
            camouflage: None,
        };
        ship.equip_modules(descriptor)?;
        Ok(ship)
    }

    pub fn info(&self) -> &ShipInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn nation(&self) -> &str {
        &self.info.nation
    }

    pub fn species(&self) -> &str {
        &self.info.species
    }

    pub fn tier(&self) -> u32 {
        self.info.tier
    }

    pub fn permoflages(&self) -> &[String] {
        &self.info.permoflages
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Module lines, built on first use and cached until `force_rebuild`.
    pub fn module_lines(&mut self, force_rebuild: bool) -> Result<&ModuleLines> {
        if force_rebuild || self.module_lines.is_none() {
            debug!("building module lines for {}", self.info.name);
            let info = self.data.get(UPGRADE_INFO).ok_or_else(|| {
                ShipError::Data(format!("{} has no {}", self.info.name, UPGRADE_INFO))
            })?;
            self.module_lines = Some(build_module_lines(modules_from_upgrade_info(info)?)?);
        }
        self.module_lines
            .as_ref()
            .ok_or_else(|| ShipError::Data(format!("no module lines for {}", self.info.name)))
    }

    /// Switch to the configuration named by `descriptor`.
    ///
    /// Modernizations, captain and camouflage are re-applied to the new
    /// configuration, in that order. Any failure leaves the ship unchanged.
    pub fn equip_modules(&mut self, descriptor: &str) -> Result<()> {
        let parsed = Descriptor::parse(descriptor)?;
        let data = Arc::clone(&self.data);
        let mut configuration = resolve(&data, self.module_lines(false)?, &parsed)?;
        for modifier in self.active_modifiers() {
            modifier.apply(configuration.tree_mut())?;
        }

        self.configuration = configuration;
        self.descriptor = descriptor.to_string();
        Ok(())
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn stat(&self, stat: Stat) -> Result<Value> {
        self.configuration.stat(stat)
    }

    pub fn stat_f64(&self, stat: Stat) -> Result<f64> {
        self.configuration.stat_f64(stat)
    }

    /// Every modifier currently applied, in application order.
    pub fn active_modifiers(&self) -> Vec<Modifier> {
        let mut modifiers: Vec<Modifier> = self
            .modernizations
            .iter()
            .flat_map(|m| m.modifiers(&self.info, &self.targets))
            .collect();
        if let Some(captain) = &self.captain {
            modifiers.extend(captain.modifiers(&self.info, &self.targets));
        }
        if let Some(camouflage) = &self.camouflage {
            modifiers.extend(camouflage.modifiers(&self.info, &self.targets));
        }
        modifiers
    }

    pub fn captain(&self) -> Option<&Captain> {
        self.captain.as_ref()
    }

    /// Replace the commanding captain. `None` removes the current one.
    pub fn set_captain(&mut self, captain: Option<Captain>) -> Result<()> {
        let modifiers = |c: &Captain| c.modifiers(&self.info, &self.targets);
        let old = self.captain.as_ref().map(modifiers).unwrap_or_default();
        let new = captain.as_ref().map(modifiers).unwrap_or_default();
        self.restack(&old, &new)?;
        self.captain = captain;
        Ok(())
    }

    pub fn modernizations(&self) -> &[Modernization] {
        &self.modernizations
    }

    /// Returns false if already equipped (by name) or the ship is not eligible.
    pub fn equip_modernization(&mut self, modernization: &Modernization) -> Result<bool> {
        if self
            .modernizations
            .iter()
            .any(|equipped| equipped.name() == modernization.name())
            || !modernization.eligible(&self.info)
        {
            return Ok(false);
        }
        let modifiers = modernization.modifiers(&self.info, &self.targets);
        self.restack(&[], &modifiers)?;
        self.modernizations.push(modernization.clone());
        Ok(true)
    }

    /// Returns false if no modernization of that name is equipped.
    pub fn unequip_modernization(&mut self, modernization: &Modernization) -> Result<bool> {
        let Some(index) = self
            .modernizations
            .iter()
            .position(|equipped| equipped.name() == modernization.name())
        else {
            return Ok(false);
        };
        let modifiers = self.modernizations[index].modifiers(&self.info, &self.targets);
        self.restack(&modifiers, &[])?;
        self.modernizations.remove(index);
        Ok(true)
    }

    pub fn camouflage(&self) -> Option<&Camouflage> {
        self.camouflage.as_ref()
    }

    /// Returns false, changing nothing, if the camouflage is not eligible.
    pub fn set_camouflage(&mut self, camouflage: Option<Camouflage>) -> Result<bool> {
        if camouflage
            .as_ref()
            .is_some_and(|c| !c.eligible(&self.info))
        {
            return Ok(false);
        }
        let modifiers = |c: &Camouflage| c.modifiers(&self.info, &self.targets);
        let old = self.camouflage.as_ref().map(modifiers).unwrap_or_default();
        let new = camouflage.as_ref().map(modifiers).unwrap_or_default();
        self.restack(&old, &new)?;
        self.camouflage = camouflage;
        Ok(true)
    }

    /// Invert `remove`, then apply `add`. Every modifier is checked before the
    /// tree is touched, so an error leaves the configuration as it was.
    fn restack(&mut self, remove: &[Modifier], add: &[Modifier]) -> Result<()> {
        for modifier in remove.iter().chain(add) {
            modifier.check()?;
        }
        let tree = self.configuration.tree_mut();
        for modifier in remove {
            modifier.invert(tree)?;
        }
        for modifier in add {
            modifier.apply(tree)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn info_from_raw_object() {
        let info = ShipInfo::from_object(&json!({
            "name": "PASD001_Test",
            "level": 6,
            "typeinfo": { "type": "Ship", "species": "Destroyer", "nation": "USA" },
            "permoflages": ["PCEM001_Perma", 5]
        }));
        assert_eq!(
            info,
            ShipInfo {
                name: "PASD001_Test".into(),
                species: "Destroyer".into(),
                nation: "USA".into(),
                tier: 6,
                permoflages: vec!["PCEM001_Perma".into()],
            }
        );
    }

    fn fixture_ship() -> (Corpus, Ship) {
        let corpus = Corpus::from_json_str(include_str!("../tests/fixtures/ship.json")).unwrap();
        let ship = corpus
            .ship("PASC001_Test_Cruiser", "stock", Arc::new(ModifierTargets::default()))
            .unwrap();
        (corpus, ship)
    }

    fn snapshot(ship: &Ship) -> Vec<Option<Value>> {
        Stat::all().map(|stat| ship.stat(stat).ok()).collect()
    }

    #[test]
    fn failed_restack_leaves_everything_in_place() {
        let (corpus, mut ship) = fixture_ship();
        let mut captain = corpus.captain("PAW001_Captain").unwrap();
        assert!(captain.learn("GunsRange"));
        ship.set_captain(Some(captain)).unwrap();
        let before = snapshot(&ship);

        let old = ship.active_modifiers();
        let broken = Modifier {
            factor: 0.0,
            ..old[0].clone()
        };
        assert_eq!(
            ship.restack(&old, &[old[0].clone(), broken]),
            Err(ShipError::InvalidFactor(0.0))
        );
        assert_eq!(snapshot(&ship), before);
        assert!(ship.captain().is_some());
    }

    #[test]
    fn failed_module_switch_keeps_equipment() {
        let (corpus, mut ship) = fixture_ship();
        let modernization = corpus.modernization("PCM013_MainGun_Mod_III").unwrap();
        assert!(ship.equip_modernization(&modernization).unwrap());
        let before = snapshot(&ship);

        assert!(ship.equip_modules("engine: 9, others: top").is_err());
        assert_eq!(ship.descriptor(), "stock");
        assert_eq!(ship.modernizations().len(), 1);
        assert_eq!(snapshot(&ship), before);
    }

    #[test]
    fn non_ships_are_rejected() {
        let err = Ship::new(
            json!({ "typeinfo": { "type": "Crew" } }),
            Arc::new(ModifierTargets::default()),
        )
        .unwrap_err();
        assert!(matches!(err, ShipError::TypeArgument { expected: "Ship", .. }));
    }

    #[test]
    fn missing_upgrade_info_is_a_data_error() {
        let err = Ship::new(
            json!({ "name": "PASD001_Test", "typeinfo": { "type": "Ship" } }),
            Arc::new(ModifierTargets::default()),
        )
        .unwrap_err();
        assert!(matches!(err, ShipError::Data(_)));
    }
}
