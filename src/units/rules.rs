//! Unit conversion rule tables.
//!
//! Rules are keyed by (domain, source unit). Air and water carry only the
//! volumetric flow rules whose target depends on the fluid; everything else
//! lives in the neutral domain.

use crate::error::{Result, ResultsError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Physical-quantity context of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Air,
    Water,
    Neutral,
}

impl Domain {
    /// Map a node fluid-type label; only fluid domains are recognised
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "air" => Some(Domain::Air),
            "water" => Some(Domain::Water),
            _ => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Air => f.write_str("Air"),
            Domain::Water => f.write_str("Water"),
            Domain::Neutral => f.write_str("Neutral"),
        }
    }
}

/// Numeric part of a rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Conversion {
    Scale(f64),
    Affine { scale: f64, offset: f64 },
}

impl Conversion {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Conversion::Scale(factor) => value * factor,
            Conversion::Affine { scale, offset } => value * scale + offset,
        }
    }
}

/// One (domain, source unit) -> (conversion, target unit) rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRule {
    pub domain: Domain,
    pub source_unit: String,
    pub conversion: Conversion,
    pub target_unit: String,
}

impl UnitRule {
    pub fn new(domain: Domain, source: &str, conversion: Conversion, target: &str) -> Self {
        Self {
            domain,
            source_unit: source.to_string(),
            conversion,
            target_unit: target.to_string(),
        }
    }

    fn scale(domain: Domain, source: &str, factor: f64, target: &str) -> Self {
        Self::new(domain, source, Conversion::Scale(factor), target)
    }
}

/// Celsius source unit, always converted with the affine transform
pub const CELSIUS: &str = "C";

/// A rule table with at most one rule per (domain, source unit)
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRuleSet {
    rules: Vec<UnitRule>,
}

impl UnitRuleSet {
    /// Build a table, rejecting duplicate (domain, source unit) pairs
    pub fn new(rules: Vec<UnitRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert((rule.domain, rule.source_unit.as_str())) {
                return Err(ResultsError::Configuration {
                    message: format!(
                        "duplicate unit rule for {} '{}'",
                        rule.domain, rule.source_unit
                    ),
                });
            }
        }
        Ok(Self { rules })
    }

    /// SI to inch-pound rules
    pub fn inch_pound() -> Self {
        use Domain::{Air, Neutral, Water};

        let rules = vec![
            UnitRule::scale(Air, "m3/s", 2118.0, "cfm"),
            UnitRule::scale(Water, "m3/s", 15850.0, "gpm"),
            UnitRule::new(
                Neutral,
                CELSIUS,
                Conversion::Affine {
                    scale: 1.8,
                    offset: 32.0,
                },
                "F",
            ),
            UnitRule::scale(Neutral, "J", 1.0 / 3600.0, "Wh"),
            UnitRule::scale(Neutral, "W", 3.412, "Btu/h"),
            UnitRule::scale(Neutral, "kg/s", 2.20462, "lb/s"),
            UnitRule::scale(Neutral, "kg", 2.20462, "lb"),
            UnitRule::scale(Neutral, "m/s", 3.28084, "ft/s"),
            UnitRule::scale(Neutral, "W/m2", 0.092903, "W/ft2"),
            UnitRule::scale(Neutral, "Pa", 0.000145038, "psi"),
            UnitRule::scale(Neutral, "grain/lb", 1.0 / 7000.0, "lb/lb"),
            UnitRule::scale(Neutral, "hr", 1.0, "hr"),
            UnitRule::scale(Neutral, "ach", 1.0, "ach"),
            UnitRule::scale(Neutral, "%", 1.0, "%"),
            UnitRule::scale(Neutral, "deg", 1.0, "deg"),
            UnitRule::scale(Neutral, "", 1.0, ""),
        ];

        Self { rules }
    }

    /// The rule for exactly this (domain, unit) pair
    pub fn lookup(&self, domain: Domain, unit: &str) -> Option<&UnitRule> {
        self.rules
            .iter()
            .find(|rule| rule.domain == domain && rule.source_unit == unit)
    }

    pub fn rules(&self) -> &[UnitRule] {
        &self.rules
    }
}

impl Default for UnitRuleSet {
    fn default() -> Self {
        Self::inch_pound()
    }
}
