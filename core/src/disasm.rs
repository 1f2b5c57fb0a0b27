//! file: core/src/disasm.rs
//! description: linear AVM1 action reader.
//!
//! Walks a byte stream one action header at a time. Sub-regions (function
//! bodies, `try` clauses, `with` bodies) are laid out inline right after the
//! action that introduces them, so a linear walk visits them too. Jump
//! targets are resolved to absolute offsets; no CFG is rebuilt.

use std::fmt;
use std::io::{Cursor, Read};

use crate::encoder::JUMP_OFFSET_SIZE;
use crate::encoder::opcode::{self, mnemonic};
use crate::error::{EmitErrorExt, Level};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAction {
    pub offset: usize,
    pub code: u8,
    /// Payload length from the header; 0 for codes below 0x80.
    pub length: u16,
    pub payload: Vec<u8>,
    /// Absolute target of an `If` or `Jump`.
    pub jump_target: Option<usize>,
}

impl DecodedAction {
    pub fn mnemonic(&self) -> &'static str {
        mnemonic(self.code).unwrap_or("Unknown")
    }

    /// Offset of the first byte after this action.
    pub fn end(&self) -> usize {
        let header = if self.code >= 0x80 { 3 } else { 1 };
        self.offset + header + self.payload.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmError {
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for DisasmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at 0x{:04x}: {}", self.offset, self.message)
    }
}

impl std::error::Error for DisasmError {}

impl EmitErrorExt for DisasmError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        "avm1emit.disasm".to_string()
    }

    fn offset(&self) -> Option<usize> {
        Some(self.offset)
    }
}

pub fn disassemble(bytes: &[u8]) -> Result<Vec<DecodedAction>, DisasmError> {
    let mut cur = Cursor::new(bytes);
    let mut actions = Vec::new();

    while (cur.position() as usize) < bytes.len() {
        let offset = cur.position() as usize;
        let code = read_u8(&mut cur)?;

        let (length, payload) = if code >= 0x80 {
            let length = read_u16(&mut cur)?;
            let mut payload = vec![0u8; length as usize];
            cur.read_exact(&mut payload).map_err(|_| DisasmError {
                offset,
                message: format!(
                    "{} declares a {} byte payload but the input ends first",
                    mnemonic(code).unwrap_or("action"),
                    length
                ),
            })?;
            (length, payload)
        } else {
            (0, Vec::new())
        };

        let jump_target = match code {
            opcode::IF | opcode::JUMP => Some(resolve_jump(offset, &payload)?),
            _ => None,
        };

        actions.push(DecodedAction { offset, code, length, payload, jump_target });
    }

    Ok(actions)
}

/// One line per action: offset, mnemonic, then the payload or jump target.
pub fn render(actions: &[DecodedAction]) -> String {
    let mut out = String::new();
    for action in actions.iter() {
        out.push_str(&format!("{:04x}  {:<16}", action.offset, action.mnemonic()));
        match action.jump_target {
            Some(target) => out.push_str(&format!(" -> {:04x}", target)),
            None if !action.payload.is_empty() => out.push_str(&format!(" {}", hex(&action.payload))),
            None => {}
        }
        out.push('\n');
    }
    out
}

pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ")
}

fn resolve_jump(offset: usize, payload: &[u8]) -> Result<usize, DisasmError> {
    let operand: [u8; JUMP_OFFSET_SIZE] = payload.try_into().map_err(|_| DisasmError {
        offset,
        message: format!("branch payload must be {} bytes, found {}", JUMP_OFFSET_SIZE, payload.len()),
    })?;
    let delta = i16::from_le_bytes(operand) as i64;
    let operand_end = (offset + 3 + JUMP_OFFSET_SIZE) as i64;
    let target = operand_end + delta;
    usize::try_from(target).map_err(|_| DisasmError {
        offset,
        message: format!("branch target {} lies before the start of the input", target),
    })
}

fn read_u8(cur: &mut Cursor<&[u8]>) -> Result<u8, DisasmError> {
    let mut b = [0u8; 1];
    let offset = cur.position() as usize;
    cur.read_exact(&mut b).map_err(|e| DisasmError { offset, message: format!("unexpected eof: {}", e) })?;
    Ok(b[0])
}

fn read_u16(cur: &mut Cursor<&[u8]>) -> Result<u16, DisasmError> {
    let mut b = [0u8; 2];
    let offset = cur.position() as usize;
    cur.read_exact(&mut b).map_err(|e| DisasmError { offset, message: format!("unexpected eof: {}", e) })?;
    Ok(u16::from_le_bytes(b))
}
