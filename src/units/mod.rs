//! Unit classification and conversion for time-series columns.

pub mod converter;
pub mod node_map;
pub mod rules;

pub use converter::{ColumnConversion, ConversionOutcome, MatchedBy, UnitConverter};
pub use node_map::NodeTypeMap;
pub use rules::{Conversion, Domain, UnitRule, UnitRuleSet};
