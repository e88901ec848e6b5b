//! Saved configurations for side-by-side comparison.

use std::fmt;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{AggregateResult, aggregate};
use crate::compare::{ConfigDiff, compare};
use crate::config::PurchaseConfig;
use crate::error::ConfigError;

/// An immutable capture of a configuration and the totals derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    config: PurchaseConfig,
    totals: AggregateResult,
}

impl ConfigSnapshot {
    pub fn capture(config: &PurchaseConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            totals: aggregate(config)?,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &PurchaseConfig {
        &self.config
    }

    pub fn totals(&self) -> &AggregateResult {
        &self.totals
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize configuration snapshot")
    }

    /// Restores a snapshot, recomputing the totals so they always match the configuration.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let stored: Self =
            serde_json::from_str(json).context("failed to parse configuration snapshot")?;
        Self::capture(&stored.config).context("configuration snapshot is invalid")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotSlot {
    A,
    B,
}

impl fmt::Display for SnapshotSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSlot::A => write!(f, "A"),
            SnapshotSlot::B => write!(f, "B"),
        }
    }
}

/// Holds the two saved configurations. Each save replaces the slot wholesale.
#[derive(Debug, Clone, Default)]
pub struct Workbench {
    a: Option<ConfigSnapshot>,
    b: Option<ConfigSnapshot>,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(
        &mut self,
        slot: SnapshotSlot,
        config: &PurchaseConfig,
    ) -> Result<&ConfigSnapshot, ConfigError> {
        let snapshot = ConfigSnapshot::capture(config)?;
        info!(%slot, "saved configuration");
        let stored = match slot {
            SnapshotSlot::A => &mut self.a,
            SnapshotSlot::B => &mut self.b,
        };
        Ok(stored.insert(snapshot))
    }

    pub fn get(&self, slot: SnapshotSlot) -> Option<&ConfigSnapshot> {
        match slot {
            SnapshotSlot::A => self.a.as_ref(),
            SnapshotSlot::B => self.b.as_ref(),
        }
    }

    pub fn clear(&mut self, slot: SnapshotSlot) {
        match slot {
            SnapshotSlot::A => self.a = None,
            SnapshotSlot::B => self.b = None,
        }
    }

    /// Compares A against B.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::SnapshotMissing` naming the first empty slot.
    pub fn compare(&self) -> Result<ConfigDiff, ConfigError> {
        let a = self
            .get(SnapshotSlot::A)
            .ok_or_else(|| ConfigError::SnapshotMissing(SnapshotSlot::A.to_string()))?;
        let b = self
            .get(SnapshotSlot::B)
            .ok_or_else(|| ConfigError::SnapshotMissing(SnapshotSlot::B.to_string()))?;
        Ok(compare(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compare_requires_both_slots() {
        let mut workbench = Workbench::new();
        assert_eq!(
            workbench.compare().unwrap_err(),
            ConfigError::SnapshotMissing("A".to_string())
        );

        workbench.save(SnapshotSlot::A, &PurchaseConfig::default()).unwrap();
        assert_eq!(
            workbench.compare().unwrap_err(),
            ConfigError::SnapshotMissing("B".to_string())
        );

        workbench.save(SnapshotSlot::B, &PurchaseConfig::default()).unwrap();
        assert!(workbench.compare().is_ok());
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_edits() {
        let mut workbench = Workbench::new();
        let mut config = PurchaseConfig::default();
        workbench.save(SnapshotSlot::A, &config).unwrap();

        config.first.price = dec!(1);
        let saved = workbench.get(SnapshotSlot::A).unwrap();
        assert_eq!(saved.config().first.price, dec!(208988));
        assert_eq!(saved.totals().combined.price, dec!(374976));
    }

    #[test]
    fn test_save_rejects_invalid_configuration() {
        let mut workbench = Workbench::new();
        let mut config = PurchaseConfig::default();
        config.discount = dec!(-1);

        assert!(workbench.save(SnapshotSlot::B, &config).is_err());
        assert!(workbench.get(SnapshotSlot::B).is_none());
    }

    #[test]
    fn test_clear_slot() {
        let mut workbench = Workbench::new();
        workbench.save(SnapshotSlot::A, &PurchaseConfig::default()).unwrap();
        workbench.clear(SnapshotSlot::A);
        assert!(workbench.get(SnapshotSlot::A).is_none());
    }

    #[test]
    fn test_from_json_recomputes_totals() {
        let snapshot = ConfigSnapshot::capture(&PurchaseConfig::default()).unwrap();
        let json = snapshot.to_json().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["totals"]["combined"]["price"] = serde_json::Value::String("1".to_string());

        let restored = ConfigSnapshot::from_json(&value.to_string()).unwrap();
        assert_eq!(restored, snapshot);
    }
}
