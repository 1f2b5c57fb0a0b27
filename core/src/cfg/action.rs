use serde::{Deserialize, Serialize};

use super::graph::Cfg;
use super::value::{FunctionFlags, GetUrl2Method, Parameter, PushValue};

/// A straight-line instruction inside a `CfgBlock`.
///
/// Control transfer (`If`, `Jump`, `Try`, `With`, `WaitForFrame*`) is not an
/// action here: it is described by the block's `CfgFlow` and only produced
/// by the lowering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Action {
    Add,
    Add2,
    And,
    AsciiToChar,
    BitAnd,
    BitLShift,
    BitOr,
    BitRShift,
    BitURShift,
    BitXor,
    Call,
    CallFunction,
    CallMethod,
    CastOp,
    CharToAscii,
    CloneSprite,
    ConstantPool { pool: Vec<String> },
    Decrement,
    DefineFunction(Box<DefineFunction>),
    DefineFunction2(Box<DefineFunction2>),
    DefineLocal,
    DefineLocal2,
    Delete,
    Delete2,
    Divide,
    EndDrag,
    Enumerate,
    Enumerate2,
    Equals,
    Equals2,
    /// An action a decoder could not make sense of. It has no encoding.
    Error {
        #[serde(default)]
        error: Option<String>,
    },
    Extends,
    FsCommand2,
    GetMember,
    GetProperty,
    GetTime,
    GetUrl { url: String, target: String },
    GetUrl2 {
        #[serde(default)]
        method: GetUrl2Method,
        #[serde(default)]
        load_target: bool,
        #[serde(default)]
        load_variables: bool,
    },
    GetVariable,
    GotoFrame { frame: u16 },
    GotoFrame2 {
        play: bool,
        #[serde(default)]
        scene_bias: u16,
    },
    GotoLabel { label: String },
    Greater,
    ImplementsOp,
    Increment,
    InitArray,
    InitObject,
    InstanceOf,
    Less,
    Less2,
    MbAsciiToChar,
    MbCharToAscii,
    MbStringExtract,
    MbStringLength,
    Modulo,
    Multiply,
    NewMethod,
    NewObject,
    NextFrame,
    Not,
    Or,
    Play,
    Pop,
    PrevFrame,
    Push { values: Vec<PushValue> },
    PushDuplicate,
    RandomNumber,
    /// Pass-through for opcodes without a dedicated variant.
    Raw {
        code: u8,
        #[serde(default)]
        data: Vec<u8>,
    },
    RemoveSprite,
    Return,
    SetMember,
    SetProperty,
    SetTarget { target_name: String },
    SetTarget2,
    SetVariable,
    StackSwap,
    StartDrag,
    Stop,
    StopSounds,
    StoreRegister { register: u8 },
    StrictEquals,
    StrictMode { is_strict: bool },
    StringAdd,
    StringEquals,
    StringExtract,
    StringGreater,
    StringLength,
    StringLess,
    Subtract,
    TargetPath,
    Throw,
    ToInteger,
    ToNumber,
    ToString,
    ToggleQuality,
    Trace,
    TypeOf,
}

impl Action {
    /// Whether control can never continue past this action.
    ///
    /// A block ending with such an action never reaches its flow trailer.
    pub fn is_terminal(&self) -> bool {
        match self {
            Action::Return | Action::Throw => true,
            // End, Throw, Return, Jump
            Action::Raw { code, .. } => matches!(code, 0x00 | 0x2a | 0x3e | 0x99),
            _ => false,
        }
    }

    /// The function body carried by this action, if any.
    pub fn function_body(&self) -> Option<&Cfg> {
        match self {
            Action::DefineFunction(f) => Some(&f.body),
            Action::DefineFunction2(f) => Some(&f.body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefineFunction {
    /// Empty for anonymous functions.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    pub body: Cfg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefineFunction2 {
    #[serde(default)]
    pub name: String,
    pub register_count: u8,
    #[serde(default)]
    pub flags: FunctionFlags,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub body: Cfg,
}
