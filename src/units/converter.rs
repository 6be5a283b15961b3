//! Per-column unit classification and conversion.
//!
//! Classification tries, in order:
//! 1. Celsius, which always takes the affine transform to Fahrenheit;
//! 2. the node's fluid domain from the node description file;
//! 3. a neutral-domain rule for the unit;
//! 4. the first domain whose keywords appear in the series name or key.
//!
//! A column matching none of these is carried through unchanged and
//! recorded as passed through.

use super::node_map::NodeTypeMap;
use super::rules::{CELSIUS, Domain, UnitRule, UnitRuleSet};
use crate::constants::{AIR_KEYWORDS, WATER_KEYWORDS};
use crate::error::{Result, ResultsError};
use crate::models::{SeriesKey, TimeSeriesFrame};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which classification step selected a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchedBy {
    Temperature,
    NodeType,
    NeutralUnit,
    NameHeuristic,
}

/// Result of classifying one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConversionOutcome {
    Converted { rule: UnitRule, matched_by: MatchedBy },
    /// No rule applied; values and unit are unchanged
    PassedThrough { domain_hint: Option<Domain> },
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }
}

/// Conversion record for one column of a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConversion {
    /// Column key after relabelling
    pub key: SeriesKey,
    pub original_unit: String,
    pub outcome: ConversionOutcome,
}

#[derive(Debug, Clone)]
struct DomainKeywords {
    domain: Domain,
    pattern: Regex,
}

impl DomainKeywords {
    fn new(domain: Domain, keywords: &[&str]) -> Result<Self> {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("(?i){}", alternation)).map_err(|e| {
            ResultsError::Configuration {
                message: format!("invalid {} keyword pattern: {}", domain, e),
            }
        })?;
        Ok(Self { domain, pattern })
    }
}

/// Classifies series by unit and context and rescales their values
#[derive(Debug, Clone)]
pub struct UnitConverter {
    rules: UnitRuleSet,
    node_map: NodeTypeMap,
    keywords: Vec<DomainKeywords>,
}

impl UnitConverter {
    /// Converter with the inch-pound rule table
    pub fn new(node_map: NodeTypeMap) -> Result<Self> {
        Self::with_rules(UnitRuleSet::inch_pound(), node_map)
    }

    pub fn with_rules(rules: UnitRuleSet, node_map: NodeTypeMap) -> Result<Self> {
        // Order matters: the first matching domain wins.
        let keywords = vec![
            DomainKeywords::new(Domain::Air, AIR_KEYWORDS)?,
            DomainKeywords::new(Domain::Water, WATER_KEYWORDS)?,
        ];

        Ok(Self {
            rules,
            node_map,
            keywords,
        })
    }

    pub fn node_map(&self) -> &NodeTypeMap {
        &self.node_map
    }

    /// Decide how a column with this key converts
    pub fn classify(&self, key: &SeriesKey) -> ConversionOutcome {
        let unit = key.units.as_str();

        let matched = self
            .temperature_rule(unit)
            .map(|rule| (rule, MatchedBy::Temperature))
            .or_else(|| self.node_rule(key).map(|rule| (rule, MatchedBy::NodeType)))
            .or_else(|| {
                self.rules
                    .lookup(Domain::Neutral, unit)
                    .map(|rule| (rule, MatchedBy::NeutralUnit))
            });

        if let Some((rule, matched_by)) = matched {
            return ConversionOutcome::Converted {
                rule: rule.clone(),
                matched_by,
            };
        }

        let domain_hint = self.name_domain(key);
        match domain_hint.and_then(|domain| self.rules.lookup(domain, unit)) {
            Some(rule) => ConversionOutcome::Converted {
                rule: rule.clone(),
                matched_by: MatchedBy::NameHeuristic,
            },
            None => ConversionOutcome::PassedThrough { domain_hint },
        }
    }

    /// Convert every column of `frame` in place and record the outcomes
    pub fn convert_frame(&self, frame: &mut TimeSeriesFrame) {
        let mut conversions = Vec::with_capacity(frame.columns.len());

        for column in &mut frame.columns {
            let original_unit = column.key.units.clone();
            let outcome = self.classify(&column.key);

            match &outcome {
                ConversionOutcome::Converted { rule, matched_by } => {
                    for value in column.values.iter_mut().flatten() {
                        *value = rule.conversion.apply(*value);
                    }
                    column.key.units = rule.target_unit.clone();
                    debug!(
                        "Converted {} / {} from '{}' to '{}' ({:?})",
                        column.key.key_value,
                        column.key.name,
                        original_unit,
                        rule.target_unit,
                        matched_by
                    );
                }
                ConversionOutcome::PassedThrough { domain_hint } => {
                    debug!(
                        "No conversion rule for {} / {} in '{}' (domain hint: {:?})",
                        column.key.key_value, column.key.name, original_unit, domain_hint
                    );
                }
            }

            conversions.push(ColumnConversion {
                key: column.key.clone(),
                original_unit,
                outcome,
            });
        }

        frame.conversions = conversions;
    }

    fn temperature_rule(&self, unit: &str) -> Option<&UnitRule> {
        if unit == CELSIUS {
            self.rules.lookup(Domain::Neutral, CELSIUS)
        } else {
            None
        }
    }

    fn node_rule(&self, key: &SeriesKey) -> Option<&UnitRule> {
        let domain = self.node_map.domain(&key.key_value)?;
        self.rules.lookup(domain, &key.units)
    }

    fn name_domain(&self, key: &SeriesKey) -> Option<Domain> {
        self.keywords
            .iter()
            .find(|k| k.pattern.is_match(&key.name) || k.pattern.is_match(&key.key_value))
            .map(|k| k.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesColumn;
    use chrono::NaiveDate;

    fn key(key_value: &str, name: &str, units: &str) -> SeriesKey {
        SeriesKey {
            index_group: "HVAC".to_string(),
            timestep_type: "HVAC System".to_string(),
            key_value: key_value.to_string(),
            name: name.to_string(),
            units: units.to_string(),
        }
    }

    fn converter() -> UnitConverter {
        UnitConverter::new(NodeTypeMap::from_pairs([
            ("SUPPLY OUTLET NODE", "Air"),
            ("CHW SUPPLY OUTLET NODE", "Water"),
        ]))
        .unwrap()
    }

    fn frame(key: SeriesKey, values: Vec<Option<f64>>) -> TimeSeriesFrame {
        let start = NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TimeSeriesFrame {
            timestamps: (0..values.len())
                .map(|h| start + chrono::Duration::hours(h as i64))
                .collect(),
            columns: vec![SeriesColumn { key, values }],
            conversions: Vec::new(),
        }
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        let mut f = frame(
            key("Environment", "Site Outdoor Air Drybulb Temperature", "C"),
            vec![Some(0.0), Some(100.0), None],
        );
        converter().convert_frame(&mut f);

        assert_eq!(f.columns[0].values, vec![Some(32.0), Some(212.0), None]);
        assert_eq!(f.columns[0].key.units, "F");
        assert!(matches!(
            f.conversions[0].outcome,
            ConversionOutcome::Converted {
                matched_by: MatchedBy::Temperature,
                ..
            }
        ));
        assert_eq!(f.conversions[0].original_unit, "C");
    }

    #[test]
    fn test_fahrenheit_is_not_reconverted() {
        let c = converter();
        let mut f = frame(key("Environment", "Drybulb", "C"), vec![Some(10.0)]);
        c.convert_frame(&mut f);
        assert_eq!(f.columns[0].values, vec![Some(50.0)]);

        c.convert_frame(&mut f);
        assert_eq!(f.columns[0].values, vec![Some(50.0)]);
        assert_eq!(f.columns[0].key.units, "F");
        assert!(!f.conversions[0].outcome.is_converted());
    }

    #[test]
    fn test_flow_by_node_type() {
        let c = converter();

        let air = c.classify(&key(
            "SUPPLY OUTLET NODE",
            "System Node Standard Density Volume Flow Rate",
            "m3/s",
        ));
        match air {
            ConversionOutcome::Converted { rule, matched_by } => {
                assert_eq!(matched_by, MatchedBy::NodeType);
                assert_eq!(rule.conversion.apply(1.0), 2118.0);
                assert_eq!(rule.target_unit, "cfm");
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        let water = c.classify(&key(
            "CHW SUPPLY OUTLET NODE",
            "System Node Standard Density Volume Flow Rate",
            "m3/s",
        ));
        match water {
            ConversionOutcome::Converted { rule, .. } => {
                assert_eq!(rule.conversion.apply(1.0), 15850.0);
                assert_eq!(rule.target_unit, "gpm");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_water_inlet_heuristic_for_unknown_node() {
        let outcome = converter().classify(&key(
            "BOILER Water Inlet NODE",
            "System Node Standard Density Volume Flow Rate",
            "m3/s",
        ));

        match outcome {
            ConversionOutcome::Converted { rule, matched_by } => {
                assert_eq!(matched_by, MatchedBy::NameHeuristic);
                assert_eq!(rule.domain, Domain::Water);
                assert_eq!(rule.target_unit, "gpm");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_neutral_unit() {
        let outcome = converter().classify(&key("ZONE ONE", "Zone Lights Electricity Rate", "W"));
        assert!(matches!(
            outcome,
            ConversionOutcome::Converted {
                matched_by: MatchedBy::NeutralUnit,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_unit_passes_through() {
        let mut f = frame(
            key("AIR LOOP", "Air System Mixed Air Mass Flow Rate", "kgWater/kgDryAir"),
            vec![Some(0.008)],
        );
        converter().convert_frame(&mut f);

        assert_eq!(f.columns[0].values, vec![Some(0.008)]);
        assert_eq!(f.columns[0].key.units, "kgWater/kgDryAir");
        assert_eq!(
            f.conversions[0].outcome,
            ConversionOutcome::PassedThrough {
                domain_hint: Some(Domain::Air)
            }
        );
    }

    #[test]
    fn test_one_failing_column_does_not_stop_others() {
        let mut f = frame(key("X", "Mystery", "furlongs"), vec![Some(1.0)]);
        f.columns.push(SeriesColumn {
            key: key("Environment", "Site Wind Speed", "m/s"),
            values: vec![Some(1.0)],
        });
        converter().convert_frame(&mut f);

        assert_eq!(f.columns[0].values, vec![Some(1.0)]);
        assert_eq!(f.columns[1].key.units, "ft/s");
        assert_eq!(f.conversions.len(), 2);
    }
}
