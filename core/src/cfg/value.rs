use serde::{Deserialize, Serialize};

/// One operand of a `Push` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PushValue {
    Boolean(bool),
    /// Index into the active constant pool.
    Constant(u16),
    Float32(f32),
    Float64(f64),
    Null,
    Register(u8),
    Sint32(i32),
    String(String),
    Undefined,
}

/// Where a `catch` clause binds the thrown value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target")]
pub enum CatchTarget {
    Register(u8),
    Variable(String),
}

impl CatchTarget {
    pub fn is_register(&self) -> bool {
        matches!(self, CatchTarget::Register(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GetUrl2Method {
    #[default]
    None,
    Get,
    Post,
}

impl GetUrl2Method {
    pub fn code(self) -> u8 {
        match self {
            GetUrl2Method::None => 0,
            GetUrl2Method::Get => 1,
            GetUrl2Method::Post => 2,
        }
    }
}

/// Register preloading behaviour of a `DefineFunction2` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionFlags {
    pub preload_this: bool,
    pub suppress_this: bool,
    pub preload_arguments: bool,
    pub suppress_arguments: bool,
    pub preload_super: bool,
    pub suppress_super: bool,
    pub preload_root: bool,
    pub preload_parent: bool,
    pub preload_global: bool,
}

impl FunctionFlags {
    pub fn bits(&self) -> u16 {
        [
            self.preload_this,
            self.suppress_this,
            self.preload_arguments,
            self.suppress_arguments,
            self.preload_super,
            self.suppress_super,
            self.preload_root,
            self.preload_parent,
            self.preload_global,
        ]
        .iter()
        .enumerate()
        .fold(0u16, |acc, (bit, set)| if *set { acc | (1 << bit) } else { acc })
    }
}

/// A `DefineFunction2` parameter; register 0 means "not preloaded".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub register: u8,
    pub name: String,
}
