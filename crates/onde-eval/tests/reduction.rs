//! Scénarios de réduction de bout en bout : jetons → termes → forme normale.

use std::collections::HashSet;

use pretty_assertions::assert_eq;

use onde_core::Term;
use onde_eval::{Env, EvalError, Machine, NoTransport};
use onde_parser::{parse_expr, Program};

/// Évalue une expression close et rend sa forme normale affichée.
fn eval(src: &str) -> String {
    let term = parse_expr(src, &HashSet::new()).expect("parse");
    let env = Env::new();
    let value = Machine::new(&env, &NoTransport).evaluate(&term).expect(src);
    value.to_string()
}

fn eval_err(src: &str) -> EvalError {
    let term = parse_expr(src, &HashSet::new()).expect("parse");
    let env = Env::new();
    Machine::new(&env, &NoTransport).evaluate(&term).expect_err(src)
}

#[track_caller]
fn assert_table(cases: &[(&str, &str)]) {
    for (input, expected) in cases {
        assert_eq!(&eval(input), expected, "input: {input}");
    }
}

#[test]
fn nested_applications() {
    assert_table(&[
        ("ap inc ap inc 0", "2"),
        ("ap inc ap inc ap inc 0", "3"),
        ("ap ap add ap ap add 2 3 4", "9"),
        ("ap ap add 2 ap ap add 3 4", "9"),
        ("ap ap add ap ap mul 2 3 4", "10"),
        ("ap ap mul 2 ap ap add 3 4", "14"),
    ]);
}

#[test]
fn addition() {
    assert_table(&[
        ("ap ap add 1 2", "3"),
        ("ap ap add 2 1", "3"),
        ("ap ap add 0 1", "1"),
        ("ap ap add 2 3", "5"),
        ("ap ap add 3 5", "8"),
    ]);
}

#[test]
fn division_truncates_toward_zero() {
    assert_table(&[
        ("ap ap div 4 2", "2"),
        ("ap ap div 4 3", "1"),
        ("ap ap div 4 4", "1"),
        ("ap ap div 4 5", "0"),
        ("ap ap div 5 2", "2"),
        ("ap ap div 6 -2", "-3"),
        ("ap ap div 5 -3", "-1"),
        ("ap ap div -5 3", "-1"),
        ("ap ap div -5 -3", "1"),
    ]);
}

#[test]
fn negation_and_successor() {
    assert_table(&[
        ("ap neg 0", "0"),
        ("ap neg 1", "-1"),
        ("ap neg -1", "1"),
        ("ap neg ap neg 2", "2"),
        ("ap inc -3", "-2"),
    ]);
}

#[test]
fn equality_selects_a_combinator() {
    assert_table(&[
        ("ap ap eq 0 -2", "f"),
        ("ap ap eq 0 0", "t"),
        ("ap ap eq 1 1", "t"),
        ("ap ap eq 1 2", "f"),
        ("ap ap eq 19 20", "f"),
        ("ap ap eq 20 20", "t"),
        ("ap ap eq -19 -20", "f"),
        ("ap ap eq -20 -20", "t"),
        ("ap ap eq -21 -20", "f"),
    ]);
}

#[test]
fn strictly_less_than() {
    assert_table(&[
        ("ap ap lt 0 -1", "f"),
        ("ap ap lt 0 0", "f"),
        ("ap ap lt 0 1", "t"),
        ("ap ap lt 1 3", "t"),
        ("ap ap lt 2 1", "f"),
        ("ap ap lt 19 20", "t"),
        ("ap ap lt 20 20", "f"),
        ("ap ap lt 21 20", "f"),
        ("ap ap lt -19 -20", "f"),
        ("ap ap lt -21 -20", "t"),
    ]);
}

#[test]
fn selection_combinators() {
    assert_table(&[
        ("ap ap t 1 5", "1"),
        ("ap ap f 1 5", "5"),
        ("ap i 42", "42"),
        // le résultat d'un prédicat s'applique comme n'importe quelle fonction
        ("ap ap ap ap eq 0 0 1 5", "1"),
        ("ap ap ap ap lt 1 0 1 5", "5"),
    ]);
}

#[test]
fn fusion_exchange_composition() {
    assert_table(&[
        // s x y z = x(z)(y(z))
        ("ap ap ap s add inc 1", "3"),
        ("ap ap ap s mul ap add 1 6", "42"),
        // c x y z = x(z)(y)
        ("ap ap ap c add 1 2", "3"),
        ("ap ap ap c div 2 10", "5"),
        // b x y z = x(y(z))
        ("ap ap ap b neg inc 4", "-5"),
        ("ap ap ap b inc ap mul 2 3", "7"),
    ]);
}

#[test]
fn pairs_and_lists() {
    assert_table(&[
        ("ap ap cons 1 2", "(1 . 2)"),
        ("ap car ap ap cons 5 nil", "5"),
        ("ap cdr ap ap cons 5 nil", "nil"),
        ("ap car ap cdr ap ap cons 1 ap ap cons 2 nil", "2"),
        ("ap isnil nil", "t"),
        ("ap isnil ap ap cons 1 nil", "f"),
    ]);
}

#[test]
fn modem_through_the_machine() {
    assert_table(&[
        ("ap mod 16", "[0111000010000]"),
        ("ap mod nil", "[00]"),
        ("ap dem ap mod 16", "16"),
        ("ap dem ap mod ap ap cons 1 2", "(1 . 2)"),
    ]);
}

#[test]
fn saturation_one_argument_at_a_time() {
    // nourrir une primitive d'arité 3 en trois applications séparées doit
    // donner le même résultat qu'en une seule expression
    let env = Env::new();
    let step1 = Machine::new(&env, &NoTransport)
        .evaluate(&parse_expr("ap s add", &HashSet::new()).unwrap())
        .unwrap();
    assert_eq!(step1.to_string(), "s/2(add)");
    let step2 = Machine::new(&env, &NoTransport)
        .evaluate(&Term::ap(step1, parse_expr("inc", &HashSet::new()).unwrap()))
        .unwrap();
    assert_eq!(step2.to_string(), "s/1(add, inc)");
    let step3 = Machine::new(&env, &NoTransport)
        .evaluate(&Term::ap(step2, Term::num(1)))
        .unwrap();
    assert_eq!(step3.to_string(), eval("ap ap ap s add inc 1"));
}

#[test]
fn definitions_reduce_through_references() {
    let source = "\
        zero = 0\n\
        one = ap inc zero\n\
        two = ap inc one\n\
        double = ap ap s add i\n\
        first = ap ap cons 7 nil\n";
    let program = Program::parse(source).unwrap();
    let env = Env::from_defs(program.clone().into_defs());

    let cases = [
        ("two", "2"),
        ("ap inc two", "3"),
        // une référence liée à une définition-fonction s'applique comme
        // la définition elle-même
        ("ap double 7", "14"),
        ("ap double ap double 3", "12"),
        ("ap car first", "7"),
        ("ap isnil ap cdr first", "t"),
    ];
    for (input, expected) in cases {
        let entry = program.entry(input).unwrap();
        let value = Machine::new(&env, &NoTransport).evaluate(&entry).expect(input);
        assert_eq!(value.to_string(), expected, "input: {input}");
    }
}

#[test]
fn type_mismatches_are_fatal() {
    assert!(matches!(
        eval_err("ap ap add 1 nil"),
        EvalError::TypeMismatch { op: "add", .. }
    ));
    assert!(matches!(
        eval_err("ap car 4"),
        EvalError::TypeMismatch { op: "car", .. }
    ));
    assert!(matches!(
        eval_err("ap ap eq nil nil"),
        EvalError::TypeMismatch { op: "eq", .. }
    ));
    // `dem` exige une charge produite par `mod`
    assert!(matches!(
        eval_err("ap dem 5"),
        EvalError::TypeMismatch { op: "dem", .. }
    ));
    // une fonction n'a pas de forme binaire
    assert!(matches!(eval_err("ap mod add"), EvalError::Codec(_)));
}
