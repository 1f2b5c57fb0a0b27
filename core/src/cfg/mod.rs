//! file: core/src/cfg/mod.rs
//! description: structured control-flow graph consumed by the lowering engine.
//!
//! A `Cfg` is an ordered list of labelled blocks. Exception scopes, `with`
//! scopes and function bodies nest further `Cfg` values by ownership; there
//! are no shared or cyclic references.

pub mod action;
pub mod graph;
pub mod label;
pub mod validate;
pub mod value;

pub use action::{Action, DefineFunction, DefineFunction2};
pub use graph::{Cfg, CfgBlock, CfgCatch, CfgFlow, CfgTry};
pub use label::CfgLabel;
pub use value::{CatchTarget, FunctionFlags, GetUrl2Method, Parameter, PushValue};
