use serde::{Deserialize, Serialize};

use super::action::Action;
use super::label::CfgLabel;
use super::value::CatchTarget;

/// An ordered list of basic blocks.
///
/// The order is the default byte layout: a block whose continuation is the
/// next block in this list needs no jump.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cfg {
    pub blocks: Vec<CfgBlock>,
}

impl Cfg {
    pub fn new(blocks: Vec<CfgBlock>) -> Self {
        Cfg { blocks }
    }

    /// Label of the block laid out first, i.e. where control enters.
    pub fn first_label(&self) -> Option<&CfgLabel> {
        self.blocks.first().map(|b| &b.label)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfgBlock {
    pub label: CfgLabel,
    #[serde(default)]
    pub actions: Vec<Action>,
    pub flow: CfgFlow,
}

impl CfgBlock {
    pub fn new(label: impl Into<CfgLabel>, actions: Vec<Action>, flow: CfgFlow) -> Self {
        CfgBlock { label: label.into(), actions, flow }
    }
}

/// How control leaves a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CfgFlow {
    /// Unconditional continuation; `None` ends the enclosing region.
    Simple {
        #[serde(default)]
        next: Option<CfgLabel>,
    },
    /// Pops a condition and branches to `true_target` when it holds.
    If {
        true_target: CfgLabel,
        #[serde(default)]
        false_target: Option<CfgLabel>,
    },
    Return,
    Throw,
    /// A block whose tail a decoder found malformed.
    Error {
        #[serde(default)]
        error: Option<String>,
    },
    Try(CfgTry),
    /// Scoped execution; control continues past the scope when `body` ends.
    With { body: Cfg },
    WaitForFrame {
        frame: u16,
        ready_target: CfgLabel,
        loading_target: CfgLabel,
    },
    WaitForFrame2 {
        ready_target: CfgLabel,
        loading_target: CfgLabel,
    },
}

impl CfgFlow {
    pub fn simple(next: Option<CfgLabel>) -> Self {
        CfgFlow::Simple { next }
    }

    pub fn goto(next: impl Into<CfgLabel>) -> Self {
        CfgFlow::Simple { next: Some(next.into()) }
    }

    pub fn end() -> Self {
        CfgFlow::Simple { next: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfgTry {
    #[serde(rename = "try")]
    pub try_body: Cfg,
    #[serde(default)]
    pub catch: Option<CfgCatch>,
    #[serde(default)]
    pub finally: Option<Cfg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfgCatch {
    pub target: CatchTarget,
    pub body: Cfg,
}
