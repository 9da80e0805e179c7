//! Deep reactive containers.
//!
//! [`wrap`] turns plain data into a tree of [`Reactive`] containers.
//! [`observe`] runs a getter once, remembers every container it read, and
//! calls back whenever a write to one of those containers changes the
//! getter's value by deep equality.
//!
//! Everything here is single-threaded: handles are `Rc`-based and the
//! current observer lives in a thread local.

pub mod macros;

mod clone;
mod context;
mod equal;
mod observer;
mod reactive;
mod value;

pub use clone::deep_clone;
pub use context::{is_tracking, untracked};
pub use equal::deep_equal;
pub use observer::{Getter, Observer, Observers};
pub use reactive::{Reactive, PRIMITIVE_KEY};
pub use value::{Field, IsReactive, Key, Value};

/// Wraps `value` into a reactive container, nested arrays and objects
/// included. Primitives are wrapped as `{ value: primitive }`.
pub fn wrap(value: impl Into<Field>) -> Reactive {
	reactive::wrap(value.into())
}

/// Wraps arrays and objects; primitives are only wrapped when
/// `wrap_primitives` is set and are returned untouched otherwise.
pub fn wrap_with(value: impl Into<Field>, wrap_primitives: bool) -> Field {
	if wrap_primitives {
		Field::Reactive(reactive::wrap(value.into()))
	} else {
		reactive::wrap_nested(value.into())
	}
}

pub fn is_reactive(value: &impl IsReactive) -> bool {
	value.is_reactive()
}

/// Creates an [`Observer`] and runs it once.
///
/// The callback receives `(value, prev_value, key, observer)`, where `key`
/// is the written key that caused the update or `None` for the initial run.
pub fn observe(
	getter: impl Getter,
	callback: impl Fn(&Value, &Value, Option<&Key>, &Observer) + 'static,
) -> Observer {
	Observer::new(getter, callback)
}
