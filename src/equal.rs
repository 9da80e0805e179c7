use crate::value::Value;

/// Structural equality of two detached values.
///
/// Numbers follow IEEE comparison, so `NaN` never equals itself and
/// `0.0` equals `-0.0`. Dates compare by instant. Arrays compare
/// element-wise, objects by key set and then per key.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Undefined, Value::Undefined) => true,
		(Value::Null, Value::Null) => true,
		(Value::Bool(a), Value::Bool(b)) => a == b,
		(Value::Number(a), Value::Number(b)) => a == b,
		(Value::String(a), Value::String(b)) => a == b,
		(Value::Date(a), Value::Date(b)) => a == b,
		(Value::Array(a), Value::Array(b)) => {
			a.len() == b.len() && a.iter().zip(b).all(|(a, b)| deep_equal(a, b))
		}
		(Value::Object(a), Value::Object(b)) => {
			a.len() == b.len()
				&& a.iter().all(|(key, a)| match b.get(key) {
					Some(b) => deep_equal(a, b),
					None => false,
				})
		}
		_ => false,
	}
}
