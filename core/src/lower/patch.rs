//! Jump bookkeeping and the final offset patching pass.

use std::collections::{BTreeMap, HashMap};

use log::trace;

use crate::cfg::CfgLabel;
use crate::encoder::JUMP_OFFSET_SIZE;
use crate::error::LowerError;

/// Offsets recorded while a region is being written, relative to the start
/// of that region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteInfo {
    /// Patch site (offset of a jump operand) -> target, `None` meaning the
    /// end of the outermost region.
    pub jumps: BTreeMap<usize, Option<CfgLabel>>,
    /// Label -> offset of the block's first byte.
    pub blocks: HashMap<CfgLabel, usize>,
}

impl WriteInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a nested region's tables, shifting its offsets by `base`, the
    /// position where the nested bytes land in this region.
    pub fn extend_shifted(&mut self, other: WriteInfo, base: usize) {
        self.jumps.extend(other.jumps.into_iter().map(|(site, target)| (base + site, target)));
        self.blocks.extend(other.blocks.into_iter().map(|(label, offset)| (label, base + offset)));
    }
}

/// Bytes of one region together with its unresolved bookkeeping.
///
/// A nested region is built in isolation, then handed over to its parent
/// with `splice_into`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub bytes: Vec<u8>,
    pub info: WriteInfo,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn splice_into(self, parent: &mut Region) {
        let base = parent.bytes.len();
        parent.info.extend_shifted(self.info, base);
        parent.bytes.extend_from_slice(&self.bytes);
    }
}

/// Returns `x` such that `source + x == target`, if it fits in an `i16`.
pub fn offset_delta_i16(source: usize, target: usize) -> Option<i16> {
    let source = i64::try_from(source).ok()?;
    let target = i64::try_from(target).ok()?;
    i16::try_from(target - source).ok()
}

/// Rewrite every recorded jump operand in `bytes`.
///
/// Offsets are relative to the byte following the operand. A `None` target
/// resolves to `end_offset`. Sites are visited in ascending order so the
/// reported failure, if any, is deterministic.
pub fn resolve_patches(bytes: &mut [u8], info: &WriteInfo, end_offset: usize) -> Result<(), LowerError> {
    for (&site, target) in info.jumps.iter() {
        let target_offset = match target {
            Some(label) => *info.blocks.get(label).ok_or_else(|| LowerError::LabelNotFound {
                label: label.clone(),
                patch_offset: site,
            })?,
            None => end_offset,
        };
        let operand_end = site + JUMP_OFFSET_SIZE;
        let delta = offset_delta_i16(operand_end, target_offset).ok_or(LowerError::JumpOutOfRange {
            patch_offset: site,
            target_offset,
        })?;
        trace!("patch 0x{:04x} -> 0x{:04x} ({:+})", site, target_offset, delta);
        bytes[site..operand_end].copy_from_slice(&delta.to_le_bytes());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_shifts_nested_tables() {
        let mut parent = Region::new();
        parent.bytes.extend([0x17, 0x17]);
        parent.info.blocks.insert(CfgLabel::new("outer"), 0);

        let mut nested = Region::new();
        nested.bytes.extend([0x99, 0x02, 0x00, 0x00, 0x00]);
        nested.info.blocks.insert(CfgLabel::new("inner"), 0);
        nested.info.jumps.insert(3, Some(CfgLabel::new("outer")));

        nested.splice_into(&mut parent);

        assert_eq!(parent.len(), 7);
        assert_eq!(parent.info.blocks[&CfgLabel::new("inner")], 2);
        assert_eq!(parent.info.jumps.get(&5), Some(&Some(CfgLabel::new("outer"))));
    }

    #[test]
    fn delta_limits() {
        assert_eq!(offset_delta_i16(2, 0), Some(-2));
        assert_eq!(offset_delta_i16(0, 32_767), Some(i16::MAX));
        assert_eq!(offset_delta_i16(0, 32_768), None);
    }
}
