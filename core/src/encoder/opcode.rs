//! Opcode table.
//!
//! `action_code` is the encoding direction, resolved at compile time.
//! `mnemonic` is the reverse lookup used by the disassembler and reports.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::cfg::Action;

pub const END: u8 = 0x00;
pub const THROW: u8 = 0x2a;
pub const RETURN: u8 = 0x3e;
pub const WAIT_FOR_FRAME: u8 = 0x8a;
pub const WAIT_FOR_FRAME2: u8 = 0x8d;
pub const DEFINE_FUNCTION2: u8 = 0x8e;
pub const TRY: u8 = 0x8f;
pub const WITH: u8 = 0x94;
pub const PUSH: u8 = 0x96;
pub const JUMP: u8 = 0x99;
pub const DEFINE_FUNCTION: u8 = 0x9b;
pub const IF: u8 = 0x9d;

pub fn action_code(action: &Action) -> u8 {
    use Action::*;

    match action {
        Add => 0x0a,
        Add2 => 0x47,
        And => 0x10,
        AsciiToChar => 0x33,
        BitAnd => 0x60,
        BitLShift => 0x63,
        BitOr => 0x61,
        BitRShift => 0x64,
        BitURShift => 0x65,
        BitXor => 0x62,
        Call => 0x9e,
        CallFunction => 0x3d,
        CallMethod => 0x52,
        CastOp => 0x2b,
        CharToAscii => 0x32,
        CloneSprite => 0x24,
        ConstantPool { .. } => 0x88,
        Decrement => 0x51,
        DefineFunction(_) => DEFINE_FUNCTION,
        DefineFunction2(_) => DEFINE_FUNCTION2,
        DefineLocal => 0x3c,
        DefineLocal2 => 0x41,
        Delete => 0x3a,
        Delete2 => 0x3b,
        Divide => 0x0d,
        EndDrag => 0x28,
        Enumerate => 0x46,
        Enumerate2 => 0x55,
        Equals => 0x0e,
        Equals2 => 0x49,
        // Never encoded; the encoder rejects it before looking at the code.
        Error { .. } => 0xff,
        Extends => 0x69,
        FsCommand2 => 0x2d,
        GetMember => 0x4e,
        GetProperty => 0x22,
        GetTime => 0x34,
        GetUrl { .. } => 0x83,
        GetUrl2 { .. } => 0x9a,
        GetVariable => 0x1c,
        GotoFrame { .. } => 0x81,
        GotoFrame2 { .. } => 0x9f,
        GotoLabel { .. } => 0x8c,
        Greater => 0x67,
        ImplementsOp => 0x2c,
        Increment => 0x50,
        InitArray => 0x42,
        InitObject => 0x43,
        InstanceOf => 0x54,
        Less => 0x0f,
        Less2 => 0x48,
        MbAsciiToChar => 0x37,
        MbCharToAscii => 0x36,
        MbStringExtract => 0x35,
        MbStringLength => 0x31,
        Modulo => 0x3f,
        Multiply => 0x0c,
        NewMethod => 0x53,
        NewObject => 0x40,
        NextFrame => 0x04,
        Not => 0x12,
        Or => 0x11,
        Play => 0x06,
        Pop => 0x17,
        PrevFrame => 0x05,
        Push { .. } => PUSH,
        PushDuplicate => 0x4c,
        RandomNumber => 0x30,
        Raw { code, .. } => *code,
        RemoveSprite => 0x25,
        Return => RETURN,
        SetMember => 0x4f,
        SetProperty => 0x23,
        SetTarget { .. } => 0x8b,
        SetTarget2 => 0x20,
        SetVariable => 0x1d,
        StackSwap => 0x4d,
        StartDrag => 0x27,
        Stop => 0x07,
        StopSounds => 0x09,
        StoreRegister { .. } => 0x87,
        StrictEquals => 0x66,
        StrictMode { .. } => 0x89,
        StringAdd => 0x21,
        StringEquals => 0x13,
        StringExtract => 0x15,
        StringGreater => 0x68,
        StringLength => 0x14,
        StringLess => 0x29,
        Subtract => 0x0b,
        TargetPath => 0x45,
        Throw => THROW,
        ToInteger => 0x18,
        ToNumber => 0x4a,
        ToString => 0x4b,
        ToggleQuality => 0x08,
        Trace => 0x26,
        TypeOf => 0x44,
    }
}

lazy_static! {
    static ref MNEMONICS: HashMap<u8, &'static str> = {
        let table: &[(u8, &'static str)] = &[
            (0x00, "End"),
            (0x04, "NextFrame"),
            (0x05, "PrevFrame"),
            (0x06, "Play"),
            (0x07, "Stop"),
            (0x08, "ToggleQuality"),
            (0x09, "StopSounds"),
            (0x0a, "Add"),
            (0x0b, "Subtract"),
            (0x0c, "Multiply"),
            (0x0d, "Divide"),
            (0x0e, "Equals"),
            (0x0f, "Less"),
            (0x10, "And"),
            (0x11, "Or"),
            (0x12, "Not"),
            (0x13, "StringEquals"),
            (0x14, "StringLength"),
            (0x15, "StringExtract"),
            (0x17, "Pop"),
            (0x18, "ToInteger"),
            (0x1c, "GetVariable"),
            (0x1d, "SetVariable"),
            (0x20, "SetTarget2"),
            (0x21, "StringAdd"),
            (0x22, "GetProperty"),
            (0x23, "SetProperty"),
            (0x24, "CloneSprite"),
            (0x25, "RemoveSprite"),
            (0x26, "Trace"),
            (0x27, "StartDrag"),
            (0x28, "EndDrag"),
            (0x29, "StringLess"),
            (0x2a, "Throw"),
            (0x2b, "CastOp"),
            (0x2c, "ImplementsOp"),
            (0x2d, "FsCommand2"),
            (0x30, "RandomNumber"),
            (0x31, "MbStringLength"),
            (0x32, "CharToAscii"),
            (0x33, "AsciiToChar"),
            (0x34, "GetTime"),
            (0x35, "MbStringExtract"),
            (0x36, "MbCharToAscii"),
            (0x37, "MbAsciiToChar"),
            (0x3a, "Delete"),
            (0x3b, "Delete2"),
            (0x3c, "DefineLocal"),
            (0x3d, "CallFunction"),
            (0x3e, "Return"),
            (0x3f, "Modulo"),
            (0x40, "NewObject"),
            (0x41, "DefineLocal2"),
            (0x42, "InitArray"),
            (0x43, "InitObject"),
            (0x44, "TypeOf"),
            (0x45, "TargetPath"),
            (0x46, "Enumerate"),
            (0x47, "Add2"),
            (0x48, "Less2"),
            (0x49, "Equals2"),
            (0x4a, "ToNumber"),
            (0x4b, "ToString"),
            (0x4c, "PushDuplicate"),
            (0x4d, "StackSwap"),
            (0x4e, "GetMember"),
            (0x4f, "SetMember"),
            (0x50, "Increment"),
            (0x51, "Decrement"),
            (0x52, "CallMethod"),
            (0x53, "NewMethod"),
            (0x54, "InstanceOf"),
            (0x55, "Enumerate2"),
            (0x60, "BitAnd"),
            (0x61, "BitOr"),
            (0x62, "BitXor"),
            (0x63, "BitLShift"),
            (0x64, "BitRShift"),
            (0x65, "BitURShift"),
            (0x66, "StrictEquals"),
            (0x67, "Greater"),
            (0x68, "StringGreater"),
            (0x69, "Extends"),
            (0x81, "GotoFrame"),
            (0x83, "GetUrl"),
            (0x87, "StoreRegister"),
            (0x88, "ConstantPool"),
            (0x89, "StrictMode"),
            (0x8a, "WaitForFrame"),
            (0x8b, "SetTarget"),
            (0x8c, "GotoLabel"),
            (0x8d, "WaitForFrame2"),
            (0x8e, "DefineFunction2"),
            (0x8f, "Try"),
            (0x94, "With"),
            (0x96, "Push"),
            (0x99, "Jump"),
            (0x9a, "GetUrl2"),
            (0x9b, "DefineFunction"),
            (0x9d, "If"),
            (0x9e, "Call"),
            (0x9f, "GotoFrame2"),
        ];
        table.iter().copied().collect()
    };
}

/// Name of an opcode, `None` for codes outside the table.
pub fn mnemonic(code: u8) -> Option<&'static str> {
    MNEMONICS.get(&code).copied()
}
