use avm1emit_core::cfg::{Action, GetUrl2Method, PushValue};
use avm1emit_core::encoder::opcode::{action_code, mnemonic};
use avm1emit_core::encoder::{RawAction, encode_action, write_if, write_jump};
use avm1emit_core::error::{EmitErrorExt, Level};
use avm1emit_core::{LowerError, generate_error_report};
use pretty_assertions::assert_eq;

fn encode(action: &Action) -> Result<Vec<u8>, LowerError> {
    encode_action(&RawAction::Action(action))
}

#[test]
fn push_value_layouts() {
    let action = Action::Push {
        values: vec![
            PushValue::Null,
            PushValue::Undefined,
            PushValue::Boolean(true),
            PushValue::Register(2),
            PushValue::Constant(0x12),
            PushValue::Constant(0x1234),
            PushValue::Sint32(-2),
        ],
    };

    assert_eq!(
        encode(&action).unwrap(),
        vec![
            0x96, 0x10, 0x00, //
            0x02, //
            0x03, //
            0x05, 0x01, //
            0x04, 0x02, //
            0x08, 0x12, //
            0x09, 0x34, 0x12, //
            0x07, 0xfe, 0xff, 0xff, 0xff,
        ]
    );
}

#[test]
fn push_doubles_swap_their_halves() {
    let action = Action::Push { values: vec![PushValue::Float64(1.0), PushValue::Float32(1.0)] };

    assert_eq!(
        encode(&action).unwrap(),
        vec![
            0x96, 0x0e, 0x00, //
            0x06, 0x00, 0x00, 0xf0, 0x3f, 0x00, 0x00, 0x00, 0x00, //
            0x01, 0x00, 0x00, 0x80, 0x3f,
        ]
    );
}

#[test]
fn goto_frame2_writes_scene_bias_only_when_set() {
    let plain = Action::GotoFrame2 { play: true, scene_bias: 0 };
    let biased = Action::GotoFrame2 { play: false, scene_bias: 3 };

    assert_eq!(encode(&plain).unwrap(), vec![0x9f, 0x01, 0x00, 0x01]);
    assert_eq!(encode(&biased).unwrap(), vec![0x9f, 0x03, 0x00, 0x02, 0x03, 0x00]);
}

#[test]
fn get_url2_flags() {
    let action = Action::GetUrl2 { method: GetUrl2Method::Post, load_target: true, load_variables: false };
    assert_eq!(encode(&action).unwrap(), vec![0x9a, 0x01, 0x00, 0x82]);
}

#[test]
fn string_payloads_are_nul_terminated() {
    let pool = Action::ConstantPool { pool: vec!["a".to_string(), "bc".to_string()] };
    let url = Action::GetUrl { url: "u".to_string(), target: String::new() };

    assert_eq!(encode(&pool).unwrap(), vec![0x88, 0x07, 0x00, 0x02, 0x00, b'a', 0x00, b'b', b'c', 0x00]);
    assert_eq!(encode(&url).unwrap(), vec![0x83, 0x03, 0x00, b'u', 0x00, 0x00]);
}

#[test]
fn raw_actions_pass_through() {
    assert_eq!(encode(&Action::Raw { code: 0x07, data: vec![] }).unwrap(), vec![0x07]);
    assert_eq!(
        encode(&Action::Raw { code: 0xaa, data: vec![1, 2] }).unwrap(),
        vec![0xaa, 0x02, 0x00, 0x01, 0x02]
    );
    assert!(matches!(
        encode(&Action::Raw { code: 0x07, data: vec![1] }),
        Err(LowerError::UnsupportedConstruct { .. })
    ));
}

#[test]
fn oversized_payload_is_rejected() {
    let action = Action::Push { values: vec![PushValue::String("x".repeat(70_000))] };
    assert!(matches!(encode(&action), Err(LowerError::RegionTooLarge { what: "action payload", .. })));
}

#[test]
fn branch_placeholders_report_their_operand_offset() {
    let mut out = vec![0x17];
    assert_eq!(write_if(&mut out).unwrap(), 4);
    assert_eq!(write_jump(&mut out).unwrap(), 9);
    assert_eq!(out, vec![0x17, 0x9d, 0x02, 0x00, 0x00, 0x00, 0x99, 0x02, 0x00, 0x00, 0x00]);
}

#[test]
fn opcode_table_and_mnemonics_agree() {
    for action in [Action::Add2, Action::GetVariable, Action::Return, Action::Throw, Action::Trace] {
        let name = mnemonic(action_code(&action)).unwrap();
        assert_eq!(name, format!("{:?}", action));
    }
    assert_eq!(mnemonic(0x99), Some("Jump"));
    assert_eq!(mnemonic(0xfe), None);
}

#[test]
fn error_report_carries_level_and_offset() {
    let err = LowerError::JumpOutOfRange { patch_offset: 3, target_offset: 70_000 };
    assert_eq!(err.level(), Level::Error);

    let report = generate_error_report(&err);
    assert!(report.starts_with("AVM1EMIT | ERROR | avm1emit.lower @0x0003 |"), "{}", report);
}
