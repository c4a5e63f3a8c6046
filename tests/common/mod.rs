use std::collections::HashMap;

use lrgen::langdef::{LangDef, ParseValue};

pub const CALC_GRAMMAR: &str = r#"
    E -> E "+" T | E "-" T | T
    T -> T "*" F | F
    F -> "(" E ")" | int
    int -> r"0|-?[1-9][0-9]*"
"#;

fn value(args: &mut Vec<ParseValue<i64>>) -> i64 {
    args.pop().unwrap().into_value().unwrap()
}

fn lexeme(args: &mut Vec<ParseValue<i64>>) -> String {
    args.pop().unwrap().lexeme().map(String::from).unwrap()
}

/// Attach the arithmetic callbacks shared by the calculator scenarios.
pub fn register_calc(ld: &mut LangDef<i64, HashMap<String, i64>>) {
    ld.register(&["E -> T", "T -> F", "F -> int"], |_, mut args| {
        value(&mut args)
    })
    .unwrap();

    ld.register(&[r#"E -> E "+" T"#], |_, mut args| {
        let t = value(&mut args);
        args.pop();
        value(&mut args) + t
    })
    .unwrap();

    ld.register(&[r#"E -> E "-" T"#], |_, mut args| {
        let t = value(&mut args);
        args.pop();
        value(&mut args) - t
    })
    .unwrap();

    ld.register(&[r#"T -> T "*" F"#], |_, mut args| {
        let f = value(&mut args);
        args.pop();
        value(&mut args) * f
    })
    .unwrap();

    ld.register(&[r#"F -> "(" E ")""#], |_, mut args| {
        args.pop();
        value(&mut args)
    })
    .unwrap();

    ld.register(&[r#"int -> r"0|-?[1-9][0-9]*""#], |_, mut args| {
        lexeme(&mut args).parse().unwrap()
    })
    .unwrap();
}

/// The calculator of the documentation: arithmetic over 64-bit integers.
pub fn calc() -> LangDef<i64, HashMap<String, i64>> {
    let mut ld = LangDef::build(CALC_GRAMMAR).unwrap();
    register_calc(&mut ld);
    ld
}
