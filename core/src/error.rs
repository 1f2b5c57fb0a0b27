//! file: core/src/error.rs
//! description: error levels, the crate-wide error trait and lowering errors.
//!
//! Every error surfaced by the crate implements `EmitErrorExt` so the CLI can
//! render a uniform report regardless of which stage failed.

use std::fmt;

use crate::cfg::CfgLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        write!(f, "{}", level_str)
    }
}

pub trait EmitErrorExt {
    fn level(&self) -> Level;
    fn message(&self) -> String;
    fn issuer(&self) -> String;
    /// Byte offset the error refers to, relative to the region being built
    /// (or to the start of the input for the disassembler).
    fn offset(&self) -> Option<usize>;
}

impl fmt::Debug for dyn EmitErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offset_str = match self.offset() {
            Some(offset) => format!("@0x{:04x}", offset),
            None => "@none".to_string(),
        };

        write!(
            f,
            "AVM1EMIT | {} | {} | {} | {}",
            self.level(),
            self.issuer(),
            offset_str,
            self.message()
        )
    }
}

impl fmt::Display for dyn EmitErrorExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Failure of the CFG to bytecode lowering.
///
/// There is no partial result: any of these aborts the whole lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    /// A jump targets a label absent from the region it was resolved in.
    LabelNotFound { label: CfgLabel, patch_offset: usize },
    /// The CFG contains an action or flow the encoder cannot represent.
    UnsupportedConstruct { construct: String },
    /// The displacement between a patch site and its target does not fit
    /// in a signed 16-bit operand.
    JumpOutOfRange { patch_offset: usize, target_offset: usize },
    /// A length-prefixed region or action payload exceeds `u16::MAX` bytes.
    RegionTooLarge { what: &'static str, len: usize },
    /// The same label is defined twice in one region namespace.
    DuplicateLabel { label: CfgLabel },
    /// Structured nesting (clauses, scopes, function bodies) exceeds the
    /// configured limit.
    NestingTooDeep { depth: usize },
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::LabelNotFound { label, patch_offset } => {
                write!(f, "LabelNotFound: '{}' (jump operand at 0x{:04x})", label, patch_offset)
            }
            LowerError::UnsupportedConstruct { construct } => {
                write!(f, "UnsupportedConstruct: {}", construct)
            }
            LowerError::JumpOutOfRange { patch_offset, target_offset } => write!(
                f,
                "jump at 0x{:04x} cannot reach 0x{:04x} with a 16-bit offset",
                patch_offset, target_offset
            ),
            LowerError::RegionTooLarge { what, len } => {
                write!(f, "{} is {} bytes long, the limit is {}", what, len, u16::MAX)
            }
            LowerError::DuplicateLabel { label } => {
                write!(f, "label '{}' is defined more than once in the same region", label)
            }
            LowerError::NestingTooDeep { depth } => {
                write!(f, "nesting depth exceeds the limit of {}", depth)
            }
        }
    }
}

impl std::error::Error for LowerError {}

impl EmitErrorExt for LowerError {
    fn level(&self) -> Level {
        match self {
            LowerError::NestingTooDeep { .. } => Level::Critical,
            _ => Level::Error,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        match self {
            LowerError::DuplicateLabel { .. } => "avm1emit.cfg.validate".to_string(),
            LowerError::UnsupportedConstruct { .. } | LowerError::RegionTooLarge { .. } => "avm1emit.encoder".to_string(),
            _ => "avm1emit.lower".to_string(),
        }
    }

    fn offset(&self) -> Option<usize> {
        match self {
            LowerError::LabelNotFound { patch_offset, .. }
            | LowerError::JumpOutOfRange { patch_offset, .. } => Some(*patch_offset),
            _ => None,
        }
    }
}

impl From<LowerError> for Box<dyn EmitErrorExt> {
    fn from(e: LowerError) -> Self {
        Box::new(e)
    }
}
