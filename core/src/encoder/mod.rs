//! file: core/src/encoder/mod.rs
//! description: per-action AVM1 encoder.
//!
//! Serializes one action at a time into a byte buffer. The lowering engine
//! owns control flow; this module only knows action layouts.
//!
//! Format (little-endian):
//! - 1 byte: opcode
//! - codes >= 0x80 only: u16 payload length, then the payload
//!
//! Strings are NUL-terminated UTF-8. Actions that introduce a sub-region
//! (`DefineFunction*`, `Try`, `With`) carry its byte length in the payload;
//! the sub-region bytes themselves are written by the caller right after.

pub mod opcode;

use crate::cfg::{Action, CatchTarget, DefineFunction, DefineFunction2, PushValue};
use crate::error::LowerError;

/// Size of the relative offset operand of `If` and `Jump`.
pub const JUMP_OFFSET_SIZE: usize = 2;

/// An action as it is laid out in the byte stream.
///
/// Wraps CFG actions and adds the control-flow actions and resolved
/// sub-region sizes that only exist once a CFG is being lowered.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAction<'a> {
    /// Any CFG action except the function-defining ones.
    Action(&'a Action),
    DefineFunction { action: &'a DefineFunction, body_size: u16 },
    DefineFunction2 { action: &'a DefineFunction2, body_size: u16 },
    End,
    If { offset: i16 },
    Jump { offset: i16 },
    Try(RawTry<'a>),
    With { size: u16 },
    WaitForFrame { frame: u16, skip: u8 },
    WaitForFrame2 { skip: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawTry<'a> {
    pub try_size: u16,
    pub catch: Option<RawCatch<'a>>,
    pub finally_size: Option<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawCatch<'a> {
    pub target: &'a CatchTarget,
    pub size: u16,
}

impl RawAction<'_> {
    pub fn code(&self) -> u8 {
        match self {
            RawAction::Action(action) => opcode::action_code(action),
            RawAction::DefineFunction { .. } => opcode::DEFINE_FUNCTION,
            RawAction::DefineFunction2 { .. } => opcode::DEFINE_FUNCTION2,
            RawAction::End => opcode::END,
            RawAction::If { .. } => opcode::IF,
            RawAction::Jump { .. } => opcode::JUMP,
            RawAction::Try(_) => opcode::TRY,
            RawAction::With { .. } => opcode::WITH,
            RawAction::WaitForFrame { .. } => opcode::WAIT_FOR_FRAME,
            RawAction::WaitForFrame2 { .. } => opcode::WAIT_FOR_FRAME2,
        }
    }
}

/// Encode a single action into a fresh buffer.
pub fn encode_action(value: &RawAction<'_>) -> Result<Vec<u8>, LowerError> {
    let mut out = Vec::new();
    write_raw_action(&mut out, value)?;
    Ok(out)
}

pub fn write_raw_action(out: &mut Vec<u8>, value: &RawAction<'_>) -> Result<(), LowerError> {
    match value {
        RawAction::Action(Action::Raw { code, data }) => return write_passthrough(out, *code, data),
        RawAction::Action(Action::Error { error }) => {
            return Err(LowerError::UnsupportedConstruct {
                construct: match error {
                    Some(e) => format!("Error action ({})", e),
                    None => "Error action".to_string(),
                },
            });
        }
        RawAction::Action(Action::DefineFunction(_) | Action::DefineFunction2(_)) => {
            return Err(LowerError::UnsupportedConstruct {
                construct: "function definition without a lowered body".to_string(),
            });
        }
        _ => {}
    }

    let code = value.code();
    out.push(code);
    if code < 0x80 {
        return Ok(());
    }

    let mut payload: Vec<u8> = Vec::new();
    write_payload(&mut payload, value)?;
    write_u16(out, checked_u16(payload.len(), "action payload")?);
    out.extend_from_slice(&payload);
    Ok(())
}

/// Emit an `If` with a zero placeholder offset; returns the operand offset.
pub fn write_if(out: &mut Vec<u8>) -> Result<usize, LowerError> {
    write_raw_action(out, &RawAction::If { offset: 0 })?;
    Ok(out.len() - JUMP_OFFSET_SIZE)
}

/// Emit a `Jump` with a zero placeholder offset; returns the operand offset.
pub fn write_jump(out: &mut Vec<u8>) -> Result<usize, LowerError> {
    write_raw_action(out, &RawAction::Jump { offset: 0 })?;
    Ok(out.len() - JUMP_OFFSET_SIZE)
}

pub fn write_end(out: &mut Vec<u8>) {
    out.push(opcode::END);
}

/// Reserved diagnostic encoding for `CfgFlow::Error`: a one-byte `Push`
/// whose value type (0xff) no player accepts.
pub fn write_error_flow(out: &mut Vec<u8>) {
    out.push(opcode::PUSH);
    write_u16(out, 0x0001);
    out.push(0xff);
}

pub(crate) fn checked_u16(len: usize, what: &'static str) -> Result<u16, LowerError> {
    u16::try_from(len).map_err(|_| LowerError::RegionTooLarge { what, len })
}

fn write_passthrough(out: &mut Vec<u8>, code: u8, data: &[u8]) -> Result<(), LowerError> {
    out.push(code);
    if code < 0x80 {
        if !data.is_empty() {
            return Err(LowerError::UnsupportedConstruct {
                construct: format!("raw action 0x{:02x} with a payload", code),
            });
        }
        return Ok(());
    }
    write_u16(out, checked_u16(data.len(), "raw action payload")?);
    out.extend_from_slice(data);
    Ok(())
}

fn write_payload(out: &mut Vec<u8>, value: &RawAction<'_>) -> Result<(), LowerError> {
    match value {
        RawAction::Action(action) => write_action_payload(out, action)?,
        RawAction::DefineFunction { action, body_size } => {
            write_c_string(out, &action.name);
            write_u16(out, checked_u16(action.parameters.len(), "parameter list")?);
            for parameter in action.parameters.iter() {
                write_c_string(out, parameter);
            }
            write_u16(out, *body_size);
        }
        RawAction::DefineFunction2 { action, body_size } => {
            write_c_string(out, &action.name);
            write_u16(out, checked_u16(action.parameters.len(), "parameter list")?);
            out.push(action.register_count);
            write_u16(out, action.flags.bits());
            for parameter in action.parameters.iter() {
                out.push(parameter.register);
                write_c_string(out, &parameter.name);
            }
            write_u16(out, *body_size);
        }
        RawAction::End => {}
        RawAction::If { offset } | RawAction::Jump { offset } => write_i16(out, *offset),
        RawAction::Try(value) => write_try_payload(out, value),
        RawAction::With { size } => write_u16(out, *size),
        RawAction::WaitForFrame { frame, skip } => {
            write_u16(out, *frame);
            out.push(*skip);
        }
        RawAction::WaitForFrame2 { skip } => out.push(*skip),
    }
    Ok(())
}

fn write_action_payload(out: &mut Vec<u8>, action: &Action) -> Result<(), LowerError> {
    match action {
        Action::ConstantPool { pool } => {
            write_u16(out, checked_u16(pool.len(), "constant pool")?);
            for constant in pool.iter() {
                write_c_string(out, constant);
            }
        }
        Action::GetUrl { url, target } => {
            write_c_string(out, url);
            write_c_string(out, target);
        }
        Action::GetUrl2 { method, load_target, load_variables } => {
            // bits 2..=5 are reserved
            let flags: u8 = (if *load_variables { 1 << 0 } else { 0 })
                | (if *load_target { 1 << 1 } else { 0 })
                | (method.code() << 6);
            out.push(flags);
        }
        Action::GotoFrame { frame } => write_u16(out, *frame),
        Action::GotoFrame2 { play, scene_bias } => {
            let has_scene_bias = *scene_bias != 0;
            let flags: u8 = (if *play { 1 << 0 } else { 0 }) | (if has_scene_bias { 1 << 1 } else { 0 });
            out.push(flags);
            if has_scene_bias {
                write_u16(out, *scene_bias);
            }
        }
        Action::GotoLabel { label } => write_c_string(out, label),
        Action::Push { values } => {
            for value in values.iter() {
                write_push_value(out, value);
            }
        }
        Action::SetTarget { target_name } => write_c_string(out, target_name),
        Action::StoreRegister { register } => out.push(*register),
        Action::StrictMode { is_strict } => out.push(if *is_strict { 1 } else { 0 }),
        _ => {}
    }
    Ok(())
}

fn write_push_value(out: &mut Vec<u8>, value: &PushValue) {
    match value {
        PushValue::String(s) => {
            out.push(0);
            write_c_string(out, s);
        }
        PushValue::Float32(f) => {
            out.push(1);
            out.extend_from_slice(&f.to_le_bytes());
        }
        PushValue::Null => out.push(2),
        PushValue::Undefined => out.push(3),
        PushValue::Register(r) => {
            out.push(4);
            out.push(*r);
        }
        PushValue::Boolean(b) => {
            out.push(5);
            out.push(if *b { 1 } else { 0 });
        }
        PushValue::Float64(f) => {
            out.push(6);
            write_le32_f64(out, *f);
        }
        PushValue::Sint32(i) => {
            out.push(7);
            out.extend_from_slice(&i.to_le_bytes());
        }
        PushValue::Constant(c) => match u8::try_from(*c) {
            Ok(c) => {
                out.push(8);
                out.push(c);
            }
            Err(_) => {
                out.push(9);
                write_u16(out, *c);
            }
        },
    }
}

fn write_try_payload(out: &mut Vec<u8>, value: &RawTry<'_>) {
    let catch_in_register = value.catch.as_ref().is_some_and(|c| c.target.is_register());
    // bits 3..=7 are reserved
    let flags: u8 = (if value.catch.is_some() { 1 << 0 } else { 0 })
        | (if value.finally_size.is_some() { 1 << 1 } else { 0 })
        | (if catch_in_register { 1 << 2 } else { 0 });
    out.push(flags);

    write_u16(out, value.try_size);
    write_u16(out, value.catch.as_ref().map(|c| c.size).unwrap_or(0));
    write_u16(out, value.finally_size.unwrap_or(0));

    match value.catch.as_ref().map(|c| c.target) {
        Some(CatchTarget::Register(r)) => out.push(*r),
        Some(CatchTarget::Variable(name)) => write_c_string(out, name),
        // the field is still present without a catch clause
        None => out.push(0),
    }
}

fn write_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_i16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Doubles are stored as two little-endian 32-bit words, high word first.
fn write_le32_f64(out: &mut Vec<u8>, v: f64) {
    let bytes = v.to_le_bytes();
    out.extend_from_slice(&bytes[4..8]);
    out.extend_from_slice(&bytes[0..4]);
}

fn write_c_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}
