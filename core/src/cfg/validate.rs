//! Label bookkeeping over a CFG tree.
//!
//! `Try` clauses and `With` bodies are spliced into the byte region of the
//! block that introduces them, so they share that region's label namespace.
//! Function bodies are lowered as independent regions and get their own.

use std::collections::HashSet;

use super::graph::{Cfg, CfgFlow};
use super::label::CfgLabel;
use crate::error::LowerError;

impl Cfg {
    /// Every label defined in this region, in layout order.
    pub fn region_labels(&self) -> Vec<&CfgLabel> {
        let mut labels = Vec::new();
        let mut bodies = Vec::new();
        visit_region(self, &mut labels, &mut bodies);
        labels
    }

    /// Function bodies defined anywhere in this region (not recursing into
    /// the bodies themselves).
    pub fn function_bodies(&self) -> Vec<&Cfg> {
        let mut labels = Vec::new();
        let mut bodies = Vec::new();
        visit_region(self, &mut labels, &mut bodies);
        bodies
    }

    /// Check that no label is defined twice within one region namespace,
    /// for this region and every function body beneath it.
    pub fn validate(&self) -> Result<(), LowerError> {
        let mut pending: Vec<&Cfg> = vec![self];
        while let Some(region) = pending.pop() {
            let mut labels = Vec::new();
            let mut bodies = Vec::new();
            visit_region(region, &mut labels, &mut bodies);

            let mut seen: HashSet<&CfgLabel> = HashSet::with_capacity(labels.len());
            for label in labels {
                if !seen.insert(label) {
                    return Err(LowerError::DuplicateLabel { label: label.clone() });
                }
            }
            pending.extend(bodies);
        }
        Ok(())
    }
}

fn visit_region<'a>(cfg: &'a Cfg, labels: &mut Vec<&'a CfgLabel>, bodies: &mut Vec<&'a Cfg>) {
    for block in cfg.blocks.iter() {
        labels.push(&block.label);
        bodies.extend(block.actions.iter().filter_map(|a| a.function_body()));
        match &block.flow {
            CfgFlow::Try(flow) => {
                visit_region(&flow.try_body, labels, bodies);
                if let Some(catch) = &flow.catch {
                    visit_region(&catch.body, labels, bodies);
                }
                if let Some(finally) = &flow.finally {
                    visit_region(finally, labels, bodies);
                }
            }
            CfgFlow::With { body } => visit_region(body, labels, bodies),
            _ => {}
        }
    }
}
