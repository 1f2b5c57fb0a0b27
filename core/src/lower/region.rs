//! Region emitter: writes an ordered block list into a byte region.
//!
//! Jump operands are written as zero placeholders and recorded in the
//! region's `WriteInfo`; they are only resolved once the outermost region
//! has its final layout (see `patch::resolve_patches`).

use log::trace;

use super::LowerOptions;
use super::patch::Region;
use crate::cfg::{Action, Cfg, CfgBlock, CfgFlow, CfgLabel, CfgTry, DefineFunction, DefineFunction2};
use crate::encoder::{self, RawAction, RawCatch, RawTry, checked_u16};
use crate::error::LowerError;

pub(crate) struct RegionEmitter<'o> {
    options: &'o LowerOptions,
    depth: usize,
}

impl<'o> RegionEmitter<'o> {
    pub(crate) fn new(options: &'o LowerOptions) -> Self {
        RegionEmitter { options, depth: 0 }
    }

    /// Run `f` one nesting level deeper, enforcing `max_depth`.
    pub(crate) fn descend<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, LowerError>,
    ) -> Result<T, LowerError> {
        if self.depth >= self.options.max_depth {
            return Err(LowerError::NestingTooDeep { depth: self.options.max_depth });
        }
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    /// Write `cfg` into a fresh region.
    ///
    /// `fallthrough_next` is where control goes when the last block runs off
    /// its end without an explicit jump.
    pub(crate) fn emit_soft(&mut self, cfg: &Cfg, fallthrough_next: Option<&CfgLabel>) -> Result<Region, LowerError> {
        let mut region = Region::new();
        for (i, block) in cfg.blocks.iter().enumerate() {
            let natural_next = match cfg.blocks.get(i + 1) {
                Some(next) => Some(&next.label),
                None => fallthrough_next,
            };
            self.emit_block(&mut region, block, natural_next)?;
        }
        Ok(region)
    }

    fn emit_nested(&mut self, cfg: &Cfg, fallthrough_next: Option<&CfgLabel>) -> Result<Region, LowerError> {
        self.descend(|this| this.emit_soft(cfg, fallthrough_next))
    }

    fn emit_block(
        &mut self,
        region: &mut Region,
        block: &CfgBlock,
        natural_next: Option<&CfgLabel>,
    ) -> Result<(), LowerError> {
        region.info.blocks.insert(block.label.clone(), region.len());

        for action in block.actions.iter() {
            match action {
                Action::DefineFunction(f) => self.emit_define_function(region, f)?,
                Action::DefineFunction2(f) => self.emit_define_function2(region, f)?,
                _ => encoder::write_raw_action(&mut region.bytes, &RawAction::Action(action))?,
            }
        }

        match &block.flow {
            CfgFlow::Simple { next } => {
                let unreachable_tail = self.options.suppress_terminator_for_unreachable_tail
                    && block.actions.last().is_some_and(Action::is_terminal);
                if unreachable_tail {
                    trace!("block '{}' ends with a terminal action, no trailer", block.label);
                } else {
                    emit_continuation(region, next.as_ref(), natural_next)?;
                }
            }
            CfgFlow::If { true_target, false_target } => {
                let site = encoder::write_if(&mut region.bytes)?;
                region.info.jumps.insert(site, Some(true_target.clone()));
                emit_continuation(region, false_target.as_ref(), natural_next)?;
            }
            CfgFlow::Return => encoder::write_raw_action(&mut region.bytes, &RawAction::Action(&Action::Return))?,
            CfgFlow::Throw => encoder::write_raw_action(&mut region.bytes, &RawAction::Action(&Action::Throw))?,
            CfgFlow::Error { .. } => encoder::write_error_flow(&mut region.bytes),
            CfgFlow::WaitForFrame { frame, ready_target, loading_target } => {
                let wait = RawAction::WaitForFrame { frame: *frame, skip: 1 };
                encoder::write_raw_action(&mut region.bytes, &wait)?;
                emit_branch_pair(region, ready_target, loading_target)?;
            }
            CfgFlow::WaitForFrame2 { ready_target, loading_target } => {
                encoder::write_raw_action(&mut region.bytes, &RawAction::WaitForFrame2 { skip: 1 })?;
                emit_branch_pair(region, ready_target, loading_target)?;
            }
            CfgFlow::With { body } => {
                // the scope is transparent: its body falls through to our successor
                let body = self.emit_nested(body, natural_next)?;
                let size = checked_u16(body.len(), "with body")?;
                encoder::write_raw_action(&mut region.bytes, &RawAction::With { size })?;
                body.splice_into(region);
            }
            CfgFlow::Try(flow) => self.emit_try(region, flow, natural_next)?,
        }

        Ok(())
    }

    /// Clauses are laid out back to back (try, catch, finally), so each one
    /// falls through into the entry of the next clause present.
    fn emit_try(
        &mut self,
        region: &mut Region,
        flow: &CfgTry,
        natural_next: Option<&CfgLabel>,
    ) -> Result<(), LowerError> {
        let finally_next = natural_next;
        let catch_next = flow.finally.as_ref().and_then(Cfg::first_label).or(finally_next);
        let try_next = flow.catch.as_ref().and_then(|c| c.body.first_label()).or(catch_next);

        let try_region = self.emit_nested(&flow.try_body, try_next)?;
        let catch_region = match flow.catch.as_ref() {
            Some(catch) => Some((catch, self.emit_nested(&catch.body, catch_next)?)),
            None => None,
        };
        let finally_region = match flow.finally.as_ref() {
            Some(finally) => Some(self.emit_nested(finally, finally_next)?),
            None => None,
        };

        let raw = RawTry {
            try_size: checked_u16(try_region.len(), "try clause")?,
            catch: match catch_region.as_ref() {
                Some((catch, body)) => Some(RawCatch {
                    target: &catch.target,
                    size: checked_u16(body.len(), "catch clause")?,
                }),
                None => None,
            },
            finally_size: match finally_region.as_ref() {
                Some(body) => Some(checked_u16(body.len(), "finally clause")?),
                None => None,
            },
        };
        encoder::write_raw_action(&mut region.bytes, &RawAction::Try(raw))?;

        try_region.splice_into(region);
        if let Some((_, body)) = catch_region {
            body.splice_into(region);
        }
        if let Some(body) = finally_region {
            body.splice_into(region);
        }
        Ok(())
    }

    fn emit_define_function(&mut self, region: &mut Region, action: &DefineFunction) -> Result<(), LowerError> {
        let body = self.descend(|this| this.lower_hard(&action.body, false))?;
        let body_size = checked_u16(body.len(), "function body")?;
        encoder::write_raw_action(&mut region.bytes, &RawAction::DefineFunction { action, body_size })?;
        region.bytes.extend_from_slice(&body);
        Ok(())
    }

    fn emit_define_function2(&mut self, region: &mut Region, action: &DefineFunction2) -> Result<(), LowerError> {
        let body = self.descend(|this| this.lower_hard(&action.body, false))?;
        let body_size = checked_u16(body.len(), "function body")?;
        encoder::write_raw_action(&mut region.bytes, &RawAction::DefineFunction2 { action, body_size })?;
        region.bytes.extend_from_slice(&body);
        Ok(())
    }
}

/// Trailer for an unconditional continuation to `target`.
///
/// Nothing is written when layout already falls through to `target`.
fn emit_continuation(
    region: &mut Region,
    target: Option<&CfgLabel>,
    natural_next: Option<&CfgLabel>,
) -> Result<(), LowerError> {
    if target == natural_next {
        return Ok(());
    }
    match target {
        Some(label) => {
            let site = encoder::write_jump(&mut region.bytes)?;
            region.info.jumps.insert(site, Some(label.clone()));
        }
        None => encoder::write_end(&mut region.bytes),
    }
    Ok(())
}

/// Two explicit jumps, never elided: the wait action skips exactly one
/// action when the frame is not loaded yet.
fn emit_branch_pair(region: &mut Region, ready: &CfgLabel, loading: &CfgLabel) -> Result<(), LowerError> {
    let site = encoder::write_jump(&mut region.bytes)?;
    region.info.jumps.insert(site, Some(ready.clone()));
    let site = encoder::write_jump(&mut region.bytes)?;
    region.info.jumps.insert(site, Some(loading.clone()));
    Ok(())
}
