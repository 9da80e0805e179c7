use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::time::SystemTime;

use crate::equal::deep_equal;
use crate::reactive::Reactive;

/// Plain, detached data.
///
/// This is what gets wrapped into a [`Reactive`] container and what
/// observers receive as snapshots of the values they watch.
#[derive(Clone, Debug, Default)]
pub enum Value {
	#[default]
	Undefined,
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	Date(SystemTime),
	Array(Vec<Value>),
	Object(BTreeMap<String, Value>),
}

impl Value {
	pub fn is_defined(&self) -> bool {
		!matches!(self, Value::Undefined)
	}

	/// Everything except arrays and objects.
	pub fn is_primitive(&self) -> bool {
		!matches!(self, Value::Array(_) | Value::Object(_))
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
		match (self, key.into()) {
			(Value::Array(items), key) => key.index().and_then(|index| items.get(index)),
			(Value::Object(fields), key) => fields.get(&*key.name()),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		deep_equal(self, other)
	}
}

/// A property key of a container.
///
/// Object containers address their fields by [`Key::Name`], array
/// containers by [`Key::Index`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
	Name(String),
	Index(usize),
}

impl Key {
	pub fn index(&self) -> Option<usize> {
		match self {
			Key::Index(index) => Some(*index),
			Key::Name(name) if is_canonical_index(name) => name.parse().ok(),
			Key::Name(_) => None,
		}
	}

	pub fn name(&self) -> std::borrow::Cow<'_, str> {
		match self {
			Key::Name(name) => std::borrow::Cow::Borrowed(name),
			Key::Index(index) => std::borrow::Cow::Owned(index.to_string()),
		}
	}
}

// Only "0" and digit strings without a leading zero address array slots.
fn is_canonical_index(name: &str) -> bool {
	match name.as_bytes() {
		[] => false,
		[b'0'] => true,
		[b'0', ..] => false,
		digits => digits.iter().all(u8::is_ascii_digit),
	}
}

impl Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Name(name) => f.write_str(name),
			Key::Index(index) => index.fmt(f),
		}
	}
}

impl PartialEq<str> for Key {
	fn eq(&self, other: &str) -> bool {
		matches!(self, Key::Name(name) if name == other)
	}
}

impl PartialEq<&str> for Key {
	fn eq(&self, other: &&str) -> bool {
		<Key as PartialEq<str>>::eq(self, other)
	}
}

impl From<&str> for Key {
	fn from(name: &str) -> Self {
		Key::Name(name.to_owned())
	}
}

impl From<String> for Key {
	fn from(name: String) -> Self {
		Key::Name(name)
	}
}

impl From<&String> for Key {
	fn from(name: &String) -> Self {
		Key::Name(name.clone())
	}
}

impl From<usize> for Key {
	fn from(index: usize) -> Self {
		Key::Index(index)
	}
}

impl From<&Key> for Key {
	fn from(key: &Key) -> Self {
		key.clone()
	}
}

/// The content of a container slot.
///
/// Arrays and objects are reactive when they were wrapped with the
/// container or written to an empty key. Written over an existing value
/// they stay plain and are carried as `Field::Value`.
#[derive(Clone, Debug)]
pub enum Field {
	Value(Value),
	Reactive(Reactive),
}

impl Default for Field {
	fn default() -> Self {
		Field::Value(Value::Undefined)
	}
}

impl Field {
	pub fn is_defined(&self) -> bool {
		match self {
			Field::Value(value) => value.is_defined(),
			Field::Reactive(_) => true,
		}
	}

	pub fn as_value(&self) -> Option<&Value> {
		match self {
			Field::Value(value) => Some(value),
			Field::Reactive(_) => None,
		}
	}

	pub fn as_reactive(&self) -> Option<&Reactive> {
		match self {
			Field::Reactive(reactive) => Some(reactive),
			Field::Value(_) => None,
		}
	}

	pub fn into_reactive(self) -> Option<Reactive> {
		match self {
			Field::Reactive(reactive) => Some(reactive),
			Field::Value(_) => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		self.as_value().and_then(Value::as_f64)
	}

	pub fn as_str(&self) -> Option<&str> {
		self.as_value().and_then(Value::as_str)
	}

	/// Tracked read through a nested container, plain read through plain
	/// data. Yields `Undefined` for primitives.
	pub fn get(&self, key: impl Into<Key>) -> Field {
		match self {
			Field::Reactive(reactive) => reactive.get(key),
			Field::Value(value) => value.get(key).cloned().map(Field::Value).unwrap_or_default(),
		}
	}

	/// JavaScript-style `!==`: primitives by value, containers by identity.
	/// Plain arrays and objects are fresh allocations and never equal.
	pub(crate) fn same(&self, other: &Field) -> bool {
		match (self, other) {
			(Field::Reactive(a), Field::Reactive(b)) => a.ptr_eq(b),
			(Field::Value(a), Field::Value(b)) => match (a, b) {
				(Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
				(Value::Bool(a), Value::Bool(b)) => a == b,
				(Value::Number(a), Value::Number(b)) => a == b,
				(Value::String(a), Value::String(b)) => a == b,
				(Value::Date(a), Value::Date(b)) => a == b,
				_ => false,
			},
			_ => false,
		}
	}
}

impl From<Value> for Field {
	fn from(value: Value) -> Self {
		Field::Value(value)
	}
}

impl From<Reactive> for Field {
	fn from(reactive: Reactive) -> Self {
		Field::Reactive(reactive)
	}
}

impl From<&Reactive> for Field {
	fn from(reactive: &Reactive) -> Self {
		Field::Reactive(reactive.clone())
	}
}

macro_rules! impl_from {
	($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
		$(
			impl From<$ty> for Value {
				fn from($v: $ty) -> Self {
					$body
				}
			}

			impl From<$ty> for Field {
				fn from(value: $ty) -> Self {
					Field::Value(Value::from(value))
				}
			}
		)*
	};
}

impl_from! {
	() => |_v| Value::Null,
	bool => |v| Value::Bool(v),
	i32 => |v| Value::Number(v as f64),
	i64 => |v| Value::Number(v as f64),
	u32 => |v| Value::Number(v as f64),
	u64 => |v| Value::Number(v as f64),
	usize => |v| Value::Number(v as f64),
	f32 => |v| Value::Number(v as f64),
	f64 => |v| Value::Number(v),
	&str => |v| Value::String(v.to_owned()),
	String => |v| Value::String(v),
	SystemTime => |v| Value::Date(v),
	Vec<Value> => |v| Value::Array(v),
	BTreeMap<String, Value> => |v| Value::Object(v),
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(Value::Null)
	}
}

/// Values that may carry the reactive tag.
pub trait IsReactive {
	fn is_reactive(&self) -> bool;
}

impl IsReactive for Value {
	fn is_reactive(&self) -> bool {
		false
	}
}

impl IsReactive for Field {
	fn is_reactive(&self) -> bool {
		matches!(self, Field::Reactive(_))
	}
}

impl IsReactive for Reactive {
	fn is_reactive(&self) -> bool {
		true
	}
}
