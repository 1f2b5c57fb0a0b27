//! file: core/src/lower/mod.rs
//! description: CFG to linear AVM1 bytecode lowering.
//!
//! Lowering happens in two phases. Every region (the top-level CFG, and each
//! function body independently) is first written with zero placeholders for
//! jump operands while the label and patch-site tables are collected. Nested
//! clauses (`try`/`catch`/`finally`, `with` bodies) are written into their
//! own buffers and spliced into the parent with their tables shifted. Once a
//! region's layout is final, every placeholder is resolved against the
//! label table.

pub mod patch;
mod region;

use log::debug;

use crate::cfg::Cfg;
use crate::error::LowerError;
use region::RegionEmitter;

pub use patch::{Region, WriteInfo, offset_delta_i16, resolve_patches};

/// Knobs of the lowering driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerOptions {
    /// Append an `End` action after the top-level region.
    pub append_terminator: bool,
    /// Skip the trailer of a `Simple` block whose last action already
    /// leaves it (`Return`, `Throw`, ...).
    pub suppress_terminator_for_unreachable_tail: bool,
    /// Run `Cfg::validate` before lowering.
    pub validate: bool,
    /// Deepest allowed nesting of clauses, scopes and function bodies.
    pub max_depth: usize,
}

impl Default for LowerOptions {
    fn default() -> Self {
        LowerOptions {
            append_terminator: true,
            suppress_terminator_for_unreachable_tail: false,
            validate: false,
            max_depth: 256,
        }
    }
}

/// Lower a top-level CFG with default options, terminated by `End`.
pub fn lower(cfg: &Cfg) -> Result<Vec<u8>, LowerError> {
    lower_with(cfg, &LowerOptions::default())
}

pub fn lower_with(cfg: &Cfg, options: &LowerOptions) -> Result<Vec<u8>, LowerError> {
    if options.validate {
        cfg.validate()?;
    }
    lower_region(cfg, options.append_terminator, options)
}

/// Lower `cfg` as an independent region.
///
/// Function bodies go through here with `append_terminator = false`: the
/// body ends where its `DefineFunction` length prefix says it does.
pub fn lower_region(cfg: &Cfg, append_terminator: bool, options: &LowerOptions) -> Result<Vec<u8>, LowerError> {
    RegionEmitter::new(options).lower_hard(cfg, append_terminator)
}

impl RegionEmitter<'_> {
    pub(crate) fn lower_hard(&mut self, cfg: &Cfg, append_terminator: bool) -> Result<Vec<u8>, LowerError> {
        let Region { mut bytes, info } = self.emit_soft(cfg, None)?;

        // jumps to `None` land here, before the terminator
        let end_offset = bytes.len();
        if append_terminator {
            crate::encoder::write_end(&mut bytes);
        }

        resolve_patches(&mut bytes, &info, end_offset)?;
        debug!(
            "lowered region: {} blocks, {} bytes, {} jumps patched",
            info.blocks.len(),
            bytes.len(),
            info.jumps.len()
        );
        Ok(bytes)
    }
}
