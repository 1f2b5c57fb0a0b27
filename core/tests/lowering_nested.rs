use avm1emit_core::cfg::{
    Action, CatchTarget, Cfg, CfgBlock, CfgCatch, CfgFlow, CfgTry, DefineFunction, DefineFunction2, FunctionFlags,
    Parameter, PushValue,
};
use avm1emit_core::disasm::disassemble;
use avm1emit_core::{LowerError, LowerOptions, lower, lower_with};
use pretty_assertions::assert_eq;

fn push(s: &str) -> Action {
    Action::Push { values: vec![PushValue::String(s.to_string())] }
}

fn push_bytes(c: u8) -> Vec<u8> {
    vec![0x96, 0x03, 0x00, 0x00, c, 0x00]
}

fn try_block(label: &str, flow: CfgTry) -> CfgBlock {
    CfgBlock::new(label, vec![], CfgFlow::Try(flow))
}

#[test]
fn try_catch_finally_clauses_chain_without_jumps() {
    let flow = CfgTry {
        try_body: Cfg::new(vec![CfgBlock::new("t1", vec![push("a")], CfgFlow::goto("c1"))]),
        catch: Some(CfgCatch {
            target: CatchTarget::Variable("e".to_string()),
            body: Cfg::new(vec![CfgBlock::new("c1", vec![push("b")], CfgFlow::goto("f1"))]),
        }),
        finally: Some(Cfg::new(vec![CfgBlock::new("f1", vec![push("c")], CfgFlow::goto("after"))])),
    };
    let cfg = Cfg::new(vec![try_block("start", flow), CfgBlock::new("after", vec![], CfgFlow::Return)]);

    let mut expected = vec![
        0x8f, 0x09, 0x00, // Try, 9 byte payload
        0x03, // catch | finally
        0x06, 0x00, 0x06, 0x00, 0x06, 0x00, // try, catch, finally sizes
        b'e', 0x00,
    ];
    expected.extend(push_bytes(b'a'));
    expected.extend(push_bytes(b'b'));
    expected.extend(push_bytes(b'c'));
    expected.extend([0x3e, 0x00]);
    assert_eq!(lower(&cfg).unwrap(), expected);
}

#[test]
fn try_without_finally_jumps_over_catch() {
    let flow = CfgTry {
        try_body: Cfg::new(vec![CfgBlock::new("t1", vec![push("a")], CfgFlow::goto("after"))]),
        catch: Some(CfgCatch {
            target: CatchTarget::Register(3),
            body: Cfg::new(vec![CfgBlock::new("c1", vec![push("b")], CfgFlow::goto("after"))]),
        }),
        finally: None,
    };
    let cfg = Cfg::new(vec![try_block("start", flow), CfgBlock::new("after", vec![], CfgFlow::Return)]);

    let mut expected = vec![
        0x8f, 0x08, 0x00, // Try, 8 byte payload
        0x05, // catch | catch in register
        0x0b, 0x00, 0x06, 0x00, 0x00, 0x00, // try 11, catch 6, no finally
        0x03, // register
    ];
    expected.extend(push_bytes(b'a'));
    expected.extend([0x99, 0x02, 0x00, 0x06, 0x00]); // over the catch clause, to 28
    expected.extend(push_bytes(b'b'));
    expected.extend([0x3e, 0x00]);
    assert_eq!(lower(&cfg).unwrap(), expected);
}

#[test]
fn try_finally_only_writes_placeholder_catch_target() {
    let flow = CfgTry {
        try_body: Cfg::new(vec![CfgBlock::new("t1", vec![push("a")], CfgFlow::goto("f1"))]),
        catch: None,
        finally: Some(Cfg::new(vec![CfgBlock::new("f1", vec![push("c")], CfgFlow::end())])),
    };
    let cfg = Cfg::new(vec![try_block("start", flow)]);

    let mut expected = vec![
        0x8f, 0x08, 0x00, //
        0x02, // finally
        0x06, 0x00, 0x00, 0x00, 0x06, 0x00, //
        0x00, // no catch target
    ];
    expected.extend(push_bytes(b'a'));
    expected.extend(push_bytes(b'c'));
    expected.push(0x00);
    assert_eq!(lower(&cfg).unwrap(), expected);
}

#[test]
fn empty_catch_body_chains_try_into_finally() {
    let flow = CfgTry {
        try_body: Cfg::new(vec![CfgBlock::new("t1", vec![push("a")], CfgFlow::goto("f1"))]),
        catch: Some(CfgCatch { target: CatchTarget::Register(0), body: Cfg::default() }),
        finally: Some(Cfg::new(vec![CfgBlock::new("f1", vec![], CfgFlow::Return)])),
    };
    let cfg = Cfg::new(vec![try_block("start", flow)]);

    let bytes = lower(&cfg).unwrap();
    let actions = disassemble(&bytes).unwrap();
    assert!(actions.iter().all(|a| a.jump_target.is_none()));

    // try 6, empty catch, finally 1
    assert_eq!(&bytes[3..10], &[0x07, 0x06, 0x00, 0x00, 0x00, 0x01, 0x00]);
}

#[test]
fn with_body_inherits_outer_fallthrough() {
    let body = Cfg::new(vec![CfgBlock::new("w1", vec![push("a")], CfgFlow::goto("after"))]);
    let cfg = Cfg::new(vec![
        CfgBlock::new("w", vec![push("o")], CfgFlow::With { body }),
        CfgBlock::new("after", vec![], CfgFlow::Return),
    ]);

    let mut expected = push_bytes(b'o');
    expected.extend([0x94, 0x02, 0x00, 0x06, 0x00]);
    expected.extend(push_bytes(b'a'));
    expected.extend([0x3e, 0x00]);
    assert_eq!(lower(&cfg).unwrap(), expected);
}

#[test]
fn with_body_branches_resolve_against_outer_labels() {
    let body = Cfg::new(vec![
        CfgBlock::new(
            "w1",
            vec![],
            CfgFlow::If { true_target: "after".into(), false_target: Some("w2".into()) },
        ),
        CfgBlock::new("w2", vec![push("b")], CfgFlow::goto("after")),
    ]);
    let cfg = Cfg::new(vec![
        CfgBlock::new("w", vec![], CfgFlow::With { body }),
        CfgBlock::new("after", vec![], CfgFlow::Return),
    ]);

    let mut expected = vec![0x94, 0x02, 0x00, 0x0b, 0x00, 0x9d, 0x02, 0x00, 0x06, 0x00];
    expected.extend(push_bytes(b'b'));
    expected.extend([0x3e, 0x00]);
    assert_eq!(lower(&cfg).unwrap(), expected);
}

#[test]
fn define_function_body_length_and_no_terminator() {
    let function = DefineFunction {
        name: "f".to_string(),
        parameters: vec!["x".to_string()],
        body: Cfg::new(vec![CfgBlock::new("f1", vec![push("a")], CfgFlow::Return)]),
    };
    let cfg = Cfg::new(vec![CfgBlock::new(
        "main",
        vec![Action::DefineFunction(Box::new(function))],
        CfgFlow::end(),
    )]);

    let mut expected = vec![
        0x9b, 0x08, 0x00, //
        b'f', 0x00, 0x01, 0x00, b'x', 0x00, //
        0x07, 0x00, // body size
    ];
    expected.extend(push_bytes(b'a'));
    expected.extend([0x3e, 0x00]);
    assert_eq!(lower(&cfg).unwrap(), expected);
}

#[test]
fn define_function2_header_and_body_offsets() {
    let function = DefineFunction2 {
        name: "g".to_string(),
        register_count: 4,
        flags: FunctionFlags { preload_this: true, preload_global: true, ..Default::default() },
        parameters: vec![Parameter { register: 1, name: "a".to_string() }],
        body: Cfg::new(vec![
            CfgBlock::new(
                "g1",
                vec![],
                CfgFlow::If { true_target: "g3".into(), false_target: Some("g2".into()) },
            ),
            CfgBlock::new("g2", vec![push("a")], CfgFlow::Return),
            CfgBlock::new("g3", vec![push("b")], CfgFlow::Return),
        ]),
    };
    let cfg = Cfg::new(vec![CfgBlock::new(
        "main",
        vec![push("m"), Action::DefineFunction2(Box::new(function))],
        CfgFlow::end(),
    )]);

    let bytes = lower(&cfg).unwrap();

    let mut header = vec![
        0x8e, 0x0c, 0x00, //
        b'g', 0x00, //
        0x01, 0x00, // one parameter
        0x04, // registers
        0x01, 0x01, // preload_this | preload_global
        0x01, b'a', 0x00, //
        0x13, 0x00, // body size 19
    ];
    let mut expected = push_bytes(b'm');
    expected.append(&mut header);
    expected.extend([0x9d, 0x02, 0x00, 0x07, 0x00]);
    expected.extend(push_bytes(b'a'));
    expected.push(0x3e);
    expected.extend(push_bytes(b'b'));
    expected.extend([0x3e, 0x00]);
    assert_eq!(bytes, expected);

    // body starts at 21; g3 lies 12 bytes into it
    let branch = disassemble(&bytes).unwrap().into_iter().find(|a| a.jump_target.is_some()).unwrap();
    assert_eq!(branch.jump_target, Some(21 + 12));
}

#[test]
fn function_body_cannot_jump_into_enclosing_region() {
    let function = DefineFunction {
        name: String::new(),
        parameters: vec![],
        body: Cfg::new(vec![CfgBlock::new("f1", vec![], CfgFlow::goto("main"))]),
    };
    let cfg = Cfg::new(vec![CfgBlock::new(
        "main",
        vec![Action::DefineFunction(Box::new(function))],
        CfgFlow::end(),
    )]);

    assert!(matches!(lower(&cfg), Err(LowerError::LabelNotFound { .. })));
}

fn nested_withs(depth: usize) -> Cfg {
    let mut cfg = Cfg::new(vec![CfgBlock::new("leaf", vec![push("a")], CfgFlow::end())]);
    for i in 0..depth {
        cfg = Cfg::new(vec![CfgBlock::new(format!("w{}", i).as_str(), vec![], CfgFlow::With { body: cfg })]);
    }
    cfg
}

#[test]
fn nesting_beyond_limit_is_rejected() {
    let options = LowerOptions { max_depth: 3, ..Default::default() };

    assert!(lower_with(&nested_withs(3), &options).is_ok());
    assert_eq!(lower_with(&nested_withs(4), &options), Err(LowerError::NestingTooDeep { depth: 3 }));
}

#[test]
fn oversized_with_body_is_rejected() {
    let big = "x".repeat(40_000);
    let body = Cfg::new(vec![CfgBlock::new("w1", vec![push(&big), push(&big)], CfgFlow::end())]);
    let cfg = Cfg::new(vec![CfgBlock::new("w", vec![], CfgFlow::With { body })]);

    match lower(&cfg) {
        Err(LowerError::RegionTooLarge { what, len }) => {
            assert_eq!(what, "with body");
            assert_eq!(len, 2 * (3 + 40_002));
        }
        other => panic!("expected RegionTooLarge, got {:?}", other),
    }
}
