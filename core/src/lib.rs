pub mod cfg;
pub mod disasm;
pub mod encoder;
pub mod error;
pub mod lower;
pub mod source;

pub use cfg::{Action, Cfg, CfgBlock, CfgFlow, CfgLabel};
pub use disasm::{DecodedAction, disassemble};
pub use error::{EmitErrorExt, Level, LowerError};
pub use lower::{LowerOptions, lower, lower_region, lower_with};
pub use source::CfgSource;

pub fn generate_error_report<E: EmitErrorExt + ?Sized>(error: &E) -> String {
    let level = error.level();
    let location = match error.offset() {
        Some(offset) => format!("{} @0x{:04x}", error.issuer(), offset),
        None => error.issuer(),
    };
    let message = error.message();

    format!("AVM1EMIT | {} | {} | {}", level, location, message)
}
