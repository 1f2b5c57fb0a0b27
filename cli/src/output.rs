//! file: cli/src/output.rs
//! description: console styles for status lines and the table layout used
//! by `disasm`.

use avm1emit_core::DecodedAction;
use avm1emit_core::disasm::hex;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use console::Style;

/// Payload bytes shown per row before the column is cut short.
const MAX_PAYLOAD_PREVIEW: usize = 16;

/// Styles for different output elements
pub struct FormatStyle {
    pub title: Style,
    pub warning: Style,
    pub error: Style,
    pub success: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            success: Style::new().green().bold(),
        }
    }
}

/// One row per action: offset, opcode, mnemonic, length, payload or target.
pub fn action_table(actions: &[DecodedAction]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Offset", "Code", "Action", "Length", "Operand"]);

    for action in actions.iter() {
        let mut name = Cell::new(action.mnemonic());
        if action.jump_target.is_some() {
            name = name.fg(Color::Cyan).add_attribute(Attribute::Bold);
        } else if action.code == 0x00 {
            name = name.add_attribute(Attribute::Dim);
        }

        let operand = match action.jump_target {
            Some(target) => format!("-> {:04x}", target),
            None => preview(&action.payload),
        };

        table.add_row(vec![
            Cell::new(format!("{:04x}", action.offset)),
            Cell::new(format!("0x{:02x}", action.code)),
            name,
            Cell::new(action.length),
            Cell::new(operand),
        ]);
    }

    let ends = actions.last().map(|a| a.end()).unwrap_or(0);
    table.add_row(vec![
        Cell::new(format!("{:04x}", ends)),
        Cell::new(""),
        Cell::new(format!("{} actions", actions.len())).add_attribute(Attribute::Italic),
        Cell::new(""),
        Cell::new(""),
    ]);
    table
}

fn preview(payload: &[u8]) -> String {
    if payload.len() <= MAX_PAYLOAD_PREVIEW {
        return hex(payload);
    }
    format!("{} .. (+{})", hex(&payload[..MAX_PAYLOAD_PREVIEW]), payload.len() - MAX_PAYLOAD_PREVIEW)
}
