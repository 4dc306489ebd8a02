//! Binding JSON records as filter variables

use serde_json::{Map, Value};

use crate::{evaluator::Environment, value::Variable};

/// Converts a scalar JSON value into a variable.
///
/// Strings naming a declared atom (`":get"`) become atom variables so they can
/// be compared with atom literals. `null`, arrays and objects have no variable
/// type and give `None`.
pub fn json_to_variable(env: &Environment, value: &Value) -> Option<Variable> {
    match value {
        Value::Bool(b) => Some(Variable::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Variable::Integer(i)),
            None => n.as_f64().map(Variable::Float),
        },
        Value::String(s) => match env.atom_code(s) {
            Some(code) => Some(Variable::Atom(code)),
            None => Some(Variable::String(s.clone())),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Binds the top-level scalar fields of `record` as variables.
///
/// Existing bindings are overwritten but not cleared; call
/// [`Environment::clear_variables`] first so fields missing from this record
/// do not keep values from the previous one. Returns how many fields were
/// bound.
///
/// # Examples
///
/// ```
/// use sift_lang::{Environment, compile, record::bind_record};
///
/// let record = serde_json::json!({"size": 41, "agent": "curl", "tags": []});
/// let mut env = Environment::new();
///
/// assert_eq!(bind_record(&mut env, record.as_object().unwrap()), 2);
/// assert_eq!(env.evaluate(&compile("size gt 40").unwrap()), Ok(true));
/// ```
pub fn bind_record(env: &mut Environment, record: &Map<String, Value>) -> usize {
    let mut bound = 0;

    for (name, value) in record {
        match json_to_variable(env, value) {
            Some(variable) => {
                env.set_variable(name.as_str(), variable);
                bound += 1;
            }
            None => tracing::trace!(field = name.as_str(), "skipping non-scalar field"),
        }
    }
    bound
}
