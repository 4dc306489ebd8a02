// tests/evaluator_tests.rs

use sift_lang::parser::{MAX_DEPTH, ParseError};
use sift_lang::{BinOp, CompileError, Environment, EvalError, Expr, compile};

fn eval(query: &str) -> Result<bool, EvalError> {
    let expr = compile(query).unwrap();
    Environment::new().evaluate(&expr)
}

fn eval_with(query: &str, env: &Environment) -> Result<bool, EvalError> {
    let expr = compile(query).unwrap();
    env.evaluate(&expr)
}

// ============================================================================
// Boolean Algebra
// ============================================================================

#[test]
fn test_boolean_literals() {
    let test_cases = vec![
        ("true or false", true),
        ("false or true", true),
        ("true or true", true),
        ("false or false", false),
        ("true and false", false),
        ("false and true", false),
        ("false and false", false),
        ("true and true", true),
        ("true", true),
        ("false", false),
        ("(true)", true),
        ("(true) or (true)", true),
        ("(true) or true", true),
        ("true or (true)", true),
        ("(false) or (false)", false),
        ("(true) and (true)", true),
        ("(false) and (false)", false),
        ("(false and true) or ((true and false) or true)", true),
        ("true and false or true", true),
        ("false and (false or true)", false),
    ];

    for (query, expected) in test_cases {
        assert_eq!(eval(query), Ok(expected), "Failed for query: {}", query);
    }
}

#[test]
fn test_empty_query_accepts() {
    assert_eq!(eval(""), Ok(true));
}

#[test]
fn test_bare_non_boolean_rejected() {
    assert_eq!(eval("10"), Err(EvalError::NotBoolean("integer")));
    assert_eq!(eval("true and 'x'"), Err(EvalError::NotBoolean("string")));
    assert_eq!(eval("nil or true"), Err(EvalError::NotBoolean("nil")));
}

// ============================================================================
// Integer and Float Comparisons
// ============================================================================

#[test]
fn test_integer_comparisons() {
    let test_cases = vec![
        ("10 eq 10", true),
        ("10 eq 11", false),
        ("10 ne 11", true),
        ("10 ne 10", false),
        ("10 gt 10", false),
        ("11 gt 10", true),
        ("10 lt 11", true),
        ("11 lt 10", false),
        ("10 gte 10", true),
        ("9 gte 10", false),
        ("10 lte 10", true),
        ("11 lte 10", false),
    ];

    for (query, expected) in test_cases {
        assert_eq!(eval(query), Ok(expected), "Failed for query: {}", query);
    }
}

#[test]
fn test_float_comparisons() {
    let test_cases = vec![
        ("10.5 lte 23.567", true),
        ("0.1 eq 0.1", true),
        ("0.1 ne 0.2", true),
        ("2.5 gt 2.25", true),
        ("2.5 lt 2.25", false),
        ("1.0 gte 1.0", true),
    ];

    for (query, expected) in test_cases {
        assert_eq!(eval(query), Ok(expected), "Failed for query: {}", query);
    }
}

#[test]
fn test_no_integer_float_cross_comparison() {
    assert_eq!(
        eval("10 eq 10.0"),
        Err(EvalError::TypeMismatch {
            op: BinOp::Eq,
            left: "integer",
            right: "float"
        })
    );
}

#[test]
fn test_reg_on_numbers_is_type_error() {
    let err = eval("10 reg 10").unwrap_err();
    assert_eq!(
        err,
        EvalError::TypeMismatch {
            op: BinOp::Reg,
            left: "integer",
            right: "integer"
        }
    );
    assert_eq!(err.to_string(), "cannot do such operation: integer reg integer");
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_comparisons() {
    let test_cases = vec![
        ("'abc' eq 'abc'", true),
        ("'abc' eq 'abd'", false),
        ("'abc' ne 'abd'", true),
        ("'abd' gt 'abc'", true),
        ("'abc' lt 'abd'", true),
        ("'b' gt 'abc'", true),
        ("'abc' gte 'abc'", true),
        ("'abc' lte 'ab'", false),
        ("'it\\'s' eq 'it\\'s'", true),
    ];

    for (query, expected) in test_cases {
        assert_eq!(eval(query), Ok(expected), "Failed for query: {}", query);
    }
}

#[test]
fn test_regex_match() {
    assert_eq!(eval(r"'hello world' reg '^\\w+\\s\\w+$'"), Ok(true));
    assert_eq!(eval(r"'hello big world' reg '^\\w+\\s\\w+$'"), Ok(false));
}

#[test]
fn test_regex_is_unanchored() {
    assert_eq!(eval("'Mozilla/5.0 (X11)' reg 'X11'"), Ok(true));
    assert_eq!(eval("'curl/8.0' reg '^Mozilla'"), Ok(false));
}

#[test]
fn test_invalid_regex_is_error() {
    let err = eval("'abc' reg '(unclosed'").unwrap_err();
    assert!(matches!(err, EvalError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
}

#[test]
fn test_patterns_compiled_once_per_environment() {
    let expr = compile("agent reg 'bot$' or agent reg '^curl'").unwrap();
    let mut env = Environment::new();

    let test_cases = vec![
        ("googlebot", true),
        ("firefox", false),
        ("curl/8.0", true),
        ("bingbot", true),
    ];

    for (agent, expected) in test_cases {
        env.set_string("agent", agent);
        assert_eq!(env.evaluate(&expr), Ok(expected), "Failed for agent: {}", agent);
    }
    assert_eq!(env.cached_patterns(), 2);
}

#[test]
fn test_invalid_pattern_fails_every_time() {
    let expr = compile("agent reg pattern").unwrap();
    let mut env = Environment::new();
    env.set_string("agent", "googlebot");
    env.set_string("pattern", "(bot");

    for _ in 0..2 {
        assert!(matches!(
            env.evaluate(&expr),
            Err(EvalError::InvalidPattern { .. })
        ));
    }
    assert_eq!(env.cached_patterns(), 0);

    env.set_string("pattern", "bot");
    assert_eq!(env.evaluate(&expr), Ok(true));
}

#[test]
fn test_pattern_cache_stays_bounded() {
    let expr = compile("agent reg pattern").unwrap();
    let mut env = Environment::new();
    env.set_string("agent", "agent-999");

    for i in 0..1000 {
        env.set_string("pattern", format!("^agent-{}$", i));
        assert_eq!(env.evaluate(&expr), Ok(i == 999));
    }
    assert!(env.cached_patterns() <= 64);
}

#[test]
fn test_cross_type_comparison_is_error() {
    assert_eq!(
        eval("10 reg 'x'"),
        Err(EvalError::TypeMismatch {
            op: BinOp::Reg,
            left: "integer",
            right: "string"
        })
    );
    assert_eq!(
        eval("'10' eq 10"),
        Err(EvalError::TypeMismatch {
            op: BinOp::Eq,
            left: "string",
            right: "integer"
        })
    );
    assert_eq!(
        eval("true eq false"),
        Err(EvalError::TypeMismatch {
            op: BinOp::Eq,
            left: "bool",
            right: "bool"
        })
    );
}

// ============================================================================
// Lazy References
// ============================================================================

#[test]
fn test_undefined_variable() {
    let err = eval("size gt 40").unwrap_err();
    assert_eq!(err, EvalError::UndefinedVariable("size".to_string()));
    assert_eq!(err.to_string(), "variable \"size\" does not exist");
}

#[test]
fn test_undefined_atom() {
    let mut env = Environment::new();
    env.set_atom_variable("method", 0);

    let err = eval_with("method eq :get", &env).unwrap_err();
    assert_eq!(err, EvalError::UndefinedAtom(":get".to_string()));
    assert_eq!(err.to_string(), "atom \":get\" does not exist");
}

#[test]
fn test_variable_types() {
    let mut env = Environment::new();
    env.set_string("agent", "curl/8.0");
    env.set_integer("size", 41);
    env.set_float("ratio", 0.75);
    env.set_bool("cached", true);

    assert_eq!(eval_with("agent reg '^curl'", &env), Ok(true));
    assert_eq!(eval_with("size gte 41", &env), Ok(true));
    assert_eq!(eval_with("ratio lt 1.0", &env), Ok(true));
    assert_eq!(eval_with("cached", &env), Ok(true));
    assert_eq!(eval_with("cached and size gt 100", &env), Ok(false));
    assert_eq!(eval_with("size eq size", &env), Ok(true));
}

#[test]
fn test_atoms() {
    let mut env = Environment::new();
    env.declare_atom(":get", 0).unwrap();
    env.declare_atom(":post", 1).unwrap();
    env.set_atom_variable("method", 1);

    assert_eq!(eval_with("method eq :post", &env), Ok(true));
    assert_eq!(eval_with("method ne :get", &env), Ok(true));
    assert_eq!(eval_with(":get eq :get", &env), Ok(true));
    assert_eq!(
        eval_with("method gt :get", &env),
        Err(EvalError::TypeMismatch {
            op: BinOp::Gt,
            left: "atom",
            right: "atom"
        })
    );
}

#[test]
fn test_atom_is_not_integer() {
    let mut env = Environment::new();
    env.declare_atom(":get", 0).unwrap();
    env.set_integer("method", 0);

    assert_eq!(
        eval_with("method eq :get", &env),
        Err(EvalError::TypeMismatch {
            op: BinOp::Eq,
            left: "integer",
            right: "atom"
        })
    );
}

#[test]
fn test_declare_atom_validation() {
    let mut env = Environment::new();
    assert!(env.declare_atom(" :get ", 0).is_ok());
    assert_eq!(env.atom_code(":get"), Some(0));

    assert!(env.declare_atom("get", 1).is_err());
    assert!(env.declare_atom(":", 1).is_err());
    assert!(env.declare_atom(":a :b", 1).is_err());
    assert!(env.declare_atom("", 1).is_err());
    assert!(env.declare_atom(":get1", 1).is_err());
}

#[test]
fn test_last_write_wins() {
    let mut env = Environment::new();
    env.set_integer("x", 1);
    env.set_string("x", "one");

    assert_eq!(eval_with("x eq 'one'", &env), Ok(true));
}

#[test]
fn test_compile_once_evaluate_many() {
    let expr = compile("size gt 40").unwrap();
    let mut env = Environment::new();

    assert_eq!(
        env.evaluate(&expr),
        Err(EvalError::UndefinedVariable("size".to_string()))
    );

    env.set_integer("size", 41);
    assert_eq!(env.evaluate(&expr), Ok(true));

    env.set_integer("size", 38);
    assert_eq!(env.evaluate(&expr), Ok(false));
}

#[test]
fn test_idempotent_evaluation() {
    let expr = compile("size gt 40 and agent reg 'bot'").unwrap();
    let mut env = Environment::new();
    env.set_integer("size", 50);
    env.set_string("agent", "googlebot");

    let first = env.evaluate(&expr);
    let second = env.evaluate(&expr);
    assert_eq!(first, Ok(true));
    assert_eq!(first, second);
}

#[test]
fn test_resolution_does_not_mutate_tree() {
    let expr = compile("size gt 40").unwrap();
    let before = expr.clone();

    let mut env = Environment::new();
    env.set_integer("size", 41);
    env.evaluate(&expr).unwrap();

    assert_eq!(expr, before);
}

#[test]
fn test_resolve() {
    let mut env = Environment::new();
    env.set_integer("size", 7);
    env.declare_atom(":get", 3).unwrap();

    let symbol = Expr::LazySymbol("size".to_string());
    assert_eq!(*env.resolve(&symbol).unwrap(), Expr::Integer(7));

    let atom = Expr::LazyAtom(":get".to_string());
    assert_eq!(*env.resolve(&atom).unwrap(), Expr::Atom(3));

    let literal = Expr::String("x".to_string());
    assert_eq!(*env.resolve(&literal).unwrap(), literal);
}

// ============================================================================
// No Short-Circuit
// ============================================================================

#[test]
fn test_both_operands_always_evaluated() {
    // The right side is still resolved even though the result is known
    assert_eq!(
        eval("false and missing eq 1"),
        Err(EvalError::UndefinedVariable("missing".to_string()))
    );
    assert_eq!(
        eval("true or missing eq 1"),
        Err(EvalError::UndefinedVariable("missing".to_string()))
    );
}

#[test]
fn test_left_error_wins() {
    assert_eq!(
        eval("left eq 1 and right eq 1"),
        Err(EvalError::UndefinedVariable("left".to_string()))
    );
    assert_eq!(
        eval("left eq right"),
        Err(EvalError::UndefinedVariable("left".to_string()))
    );
}

// ============================================================================
// Depth Limits
// ============================================================================

#[test]
fn test_long_chain_within_limit_evaluates() {
    let query = vec!["size gt 0"; MAX_DEPTH / 2].join(" and ");
    let mut env = Environment::new();
    env.set_integer("size", 1);
    assert_eq!(eval_with(&query, &env), Ok(true));

    env.set_integer("size", 0);
    assert_eq!(eval_with(&query, &env), Ok(false));
}

#[test]
fn test_overlong_queries_fail_to_compile() {
    let chain = vec!["true"; 100_000].join(" and ");
    assert!(matches!(
        compile(&chain),
        Err(CompileError::Parse(ParseError::TooDeep { .. }))
    ));

    let nested = format!("{}true{}", "(".repeat(20_000), ")".repeat(20_000));
    assert!(matches!(
        compile(&nested),
        Err(CompileError::Parse(ParseError::TooDeep { .. }))
    ));
}

#[test]
fn test_hand_built_tree_past_limit() {
    let mut expr = Expr::Bool(true);
    for _ in 0..MAX_DEPTH {
        expr = Expr::binary(BinOp::And, expr, Expr::Bool(true));
    }

    assert_eq!(Environment::new().evaluate(&expr), Err(EvalError::TooDeep));
}
