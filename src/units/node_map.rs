//! Node fluid-type lookup from the branch/node description file.
//!
//! Node declaration lines look like
//! ` Node,<#>,<Node Name>,<Node Fluid Type>,<# Times Referenced>`.
//! Suspicious-node lines share the layout.

use super::rules::Domain;
use crate::constants::{NODE_FLUID_FIELD, NODE_MARKERS, NODE_NAME_FIELD};
use crate::error::Result;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Mapping from node name to fluid-type label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTypeMap {
    nodes: HashMap<String, String>,
}

impl NodeTypeMap {
    /// Load from `path`; a missing file yields an empty map
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(
                "No node description file at {}; relying on name heuristics",
                path.display()
            );
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        let map = Self::parse(BufReader::new(file))?;
        debug!("Loaded {} node types from {}", map.len(), path.display());
        Ok(map)
    }

    /// Parse node declarations from a reader
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut nodes = HashMap::new();

        // Decoded lossily: a non-UTF-8 line never fails the lookup
        for line in reader.split(b'\n') {
            let bytes = line?;
            let line = String::from_utf8_lossy(&bytes);
            let fields: Vec<&str> = line.split(',').collect();

            let marker: String = fields[0]
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_uppercase();
            if !NODE_MARKERS.contains(&marker.as_str()) {
                continue;
            }

            if let (Some(name), Some(fluid)) =
                (fields.get(NODE_NAME_FIELD), fields.get(NODE_FLUID_FIELD))
            {
                nodes.insert(name.trim().to_string(), fluid.trim().to_string());
            }
        }

        Ok(Self { nodes })
    }

    pub fn from_pairs<N: Into<String>, F: Into<String>>(
        pairs: impl IntoIterator<Item = (N, F)>,
    ) -> Self {
        Self {
            nodes: pairs
                .into_iter()
                .map(|(n, f)| (n.into(), f.into()))
                .collect(),
        }
    }

    /// Fluid-type label of a node, by exact name
    pub fn get(&self, node: &str) -> Option<&str> {
        self.nodes.get(node).map(String::as_str)
    }

    /// Conversion domain of a node, when its fluid type is one
    pub fn domain(&self, node: &str) -> Option<Domain> {
        self.get(node).and_then(Domain::from_label)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
