use std::collections::BTreeMap;

use fxhash::FxHashSet;

use crate::reactive::{Reactive, Slots};
use crate::value::{Field, Value};

/// Takes a detached copy of `field`.
///
/// Containers are read through their tracked accessors, so when this runs
/// inside an observer every nested container becomes a dependency of it.
/// A container that contains itself is cut at the back edge and yields
/// `Undefined` there.
pub fn deep_clone(field: &Field) -> Value {
	let mut ancestors = FxHashSet::default();
	clone_field(field, &mut ancestors)
}

fn clone_field(field: &Field, ancestors: &mut FxHashSet<usize>) -> Value {
	match field {
		Field::Value(value) => value.clone(),
		Field::Reactive(reactive) => clone_reactive(reactive, ancestors),
	}
}

fn clone_reactive(reactive: &Reactive, ancestors: &mut FxHashSet<usize>) -> Value {
	// Ancestors stay alive for the whole walk, so their ids stay unique.
	let id = reactive.id();
	if !ancestors.insert(id) {
		tracing::warn!("cyclic container reference cut while taking a snapshot");
		return Value::Undefined;
	}

	let value = match reactive.slots() {
		Slots::Array(items) => Value::Array(
			items
				.iter()
				.map(|item| clone_field(item, ancestors))
				.collect(),
		),
		Slots::Object(fields) => Value::Object(
			fields
				.iter()
				.map(|(key, field)| (key.clone(), clone_field(field, ancestors)))
				.collect::<BTreeMap<_, _>>(),
		),
	};

	ancestors.remove(&id);
	value
}
