use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::clone::deep_clone;
use crate::context;
use crate::observer::{Observer, ObserverBody};
use crate::value::{Field, Key, Value};

/// The single field of a primitive-wrapped container.
pub const PRIMITIVE_KEY: &str = "value";

/// How far past the end of an array a write may land. Holes are filled
/// with `Undefined`, so larger gaps are refused.
const MAX_ARRAY_GAP: usize = 1 << 16;

/// A handle to a reactive container.
///
/// Reads made while an observer is computing register that observer with
/// the container; writes notify every registered observer. Clones share
/// the same container.
pub struct Reactive {
	body: Rc<ReactiveBody>,
}

impl Clone for Reactive {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

pub(crate) struct ReactiveBody {
	slots: RefCell<Slots>,
	observers: RefCell<SmallVec<[Rc<ObserverBody>; 4]>>,
	primitive: bool,
}

#[derive(Clone)]
pub(crate) enum Slots {
	Array(Vec<Field>),
	Object(BTreeMap<String, Field>),
}

impl Slots {
	fn get(&self, key: &Key) -> Field {
		match self {
			Slots::Array(items) => match key {
				Key::Name(name) if name == "length" => Field::Value(Value::from(items.len())),
				key => key
					.index()
					.and_then(|index| items.get(index).cloned())
					.unwrap_or_default(),
			},
			Slots::Object(fields) => fields.get(&*key.name()).cloned().unwrap_or_default(),
		}
	}

	fn insert(&mut self, key: &Key, field: Field) -> Field {
		match (self, key) {
			(Slots::Array(items), Key::Index(index)) => {
				if *index >= items.len() {
					items.resize_with(index + 1, Field::default);
				}
				std::mem::replace(&mut items[*index], field)
			}
			(Slots::Array(_), Key::Name(_)) => unreachable!("array keys are normalized to indices"),
			(Slots::Object(fields), key) => fields
				.insert(key.name().into_owned(), field)
				.unwrap_or_default(),
		}
	}
}

/// Wraps `value` into a container. Primitives get a synthetic
/// `{ value: primitive }` container; an existing handle is returned as is.
pub(crate) fn wrap(value: Field) -> Reactive {
	match value {
		Field::Reactive(reactive) => reactive,
		Field::Value(value) => match wrap_container(value) {
			Ok(reactive) => reactive,
			Err(primitive) => {
				let mut fields = BTreeMap::new();
				fields.insert(PRIMITIVE_KEY.to_owned(), Field::Value(primitive));
				Reactive::new(Slots::Object(fields), true)
			}
		},
	}
}

/// Wraps arrays and objects, leaving primitives untouched.
pub(crate) fn wrap_nested(value: Field) -> Field {
	match value {
		Field::Value(value) => match wrap_container(value) {
			Ok(reactive) => Field::Reactive(reactive),
			Err(primitive) => Field::Value(primitive),
		},
		reactive => reactive,
	}
}

fn wrap_container(value: Value) -> Result<Reactive, Value> {
	let slots = match value {
		Value::Array(items) => Slots::Array(
			items
				.into_iter()
				.map(|item| wrap_nested(Field::Value(item)))
				.collect(),
		),
		Value::Object(fields) => Slots::Object(
			fields
				.into_iter()
				.map(|(key, field)| (key, wrap_nested(Field::Value(field))))
				.collect(),
		),
		primitive => return Err(primitive),
	};

	Ok(Reactive::new(slots, false))
}

impl Reactive {
	fn new(slots: Slots, primitive: bool) -> Self {
		tracing::trace!(primitive, "wrapped container");
		Reactive {
			body: Rc::new(ReactiveBody {
				slots: RefCell::new(slots),
				observers: RefCell::new(SmallVec::new()),
				primitive,
			}),
		}
	}

	/// Whether this container was created around a primitive.
	pub fn is_primitive(&self) -> bool {
		self.body.primitive
	}

	pub fn is_array(&self) -> bool {
		matches!(*self.body.slots.borrow(), Slots::Array(_))
	}

	pub fn ptr_eq(&self, other: &Reactive) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}

	/// Number of observers currently registered with this container.
	pub fn observer_count(&self) -> usize {
		self.body.observers.borrow().len()
	}

	pub fn get(&self, key: impl Into<Key>) -> Field {
		self.track();
		self.get_once(key)
	}

	/// Reads without registering the current observer.
	pub fn get_once(&self, key: impl Into<Key>) -> Field {
		let key = key.into();
		self.body.slots.borrow().get(&key)
	}

	pub fn keys(&self) -> Vec<Key> {
		self.track();
		match &*self.body.slots.borrow() {
			Slots::Array(items) => (0..items.len()).map(Key::Index).collect(),
			Slots::Object(fields) => fields.keys().map(Key::from).collect(),
		}
	}

	pub fn len(&self) -> usize {
		self.track();
		match &*self.body.slots.borrow() {
			Slots::Array(items) => items.len(),
			Slots::Object(fields) => fields.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Tracked deep copy of the whole container.
	pub fn snapshot(&self) -> Value {
		deep_clone(&Field::Reactive(self.clone()))
	}

	#[inline]
	pub fn set(&self, key: impl Into<Key>, value: impl Into<Field>) {
		let _ = self.replace(key, value);
	}

	/// Stores `value` under `key` and returns what was there before.
	///
	/// Writing the same primitive or the same container handle is a no-op.
	/// Arrays and objects written to a key that holds nothing yet are
	/// wrapped; over an existing value they are stored as plain data. Every
	/// effective write notifies the observers of this container before
	/// returning.
	pub fn replace(&self, key: impl Into<Key>, value: impl Into<Field>) -> Field {
		let value = value.into();
		let key = match self.normalize(key.into()) {
			Some(key) => key,
			None => return Field::default(),
		};

		let previous = {
			let current = self.body.slots.borrow().get(&key);
			if current.same(&value) {
				return current;
			}

			let value = if current.is_defined() {
				value
			} else {
				wrap_nested(value)
			};
			self.body.slots.borrow_mut().insert(&key, value)
		};

		self.notify(&key);
		previous
	}

	/// Appends to an array container.
	pub fn push(&self, value: impl Into<Field>) {
		let len = match &*self.body.slots.borrow() {
			Slots::Array(items) => items.len(),
			Slots::Object(_) => {
				tracing::warn!("push on an object container ignored");
				return;
			}
		};

		self.set(len, value);
	}

	/// Removes the last element of an array container.
	pub fn pop(&self) -> Field {
		let (index, popped) = match &mut *self.body.slots.borrow_mut() {
			Slots::Array(items) => match items.pop() {
				Some(popped) => (items.len(), popped),
				None => return Field::default(),
			},
			Slots::Object(_) => {
				tracing::warn!("pop on an object container ignored");
				return Field::default();
			}
		};

		self.notify(&Key::Index(index));
		popped
	}

	/// Removes a field of an object container.
	pub fn remove(&self, key: impl Into<Key>) -> Field {
		let key = key.into();
		let removed = match &mut *self.body.slots.borrow_mut() {
			Slots::Object(fields) => fields.remove(&*key.name()),
			Slots::Array(_) => {
				tracing::warn!(%key, "remove on an array container ignored, use `pop`");
				None
			}
		};

		match removed {
			Some(removed) => {
				self.notify(&Key::Name(key.name().into_owned()));
				removed
			}
			None => Field::default(),
		}
	}

	/// Observes this container. Same as `observe(self.clone(), callback)`.
	pub fn subscribe(
		&self,
		callback: impl Fn(&Value, &Value, Option<&Key>, &Observer) + 'static,
	) -> Observer {
		Observer::new(self.clone(), callback)
	}

	/// Address of the shared body. Only unique while the container is alive.
	pub(crate) fn id(&self) -> usize {
		Rc::as_ptr(&self.body) as usize
	}

	/// Tracked copy of the slots, used for snapshots.
	pub(crate) fn slots(&self) -> Slots {
		self.track();
		self.body.slots.borrow().clone()
	}

	fn normalize(&self, key: Key) -> Option<Key> {
		match &*self.body.slots.borrow() {
			Slots::Object(_) => Some(Key::Name(key.name().into_owned())),
			Slots::Array(items) => match key.index() {
				Some(index) if index.saturating_sub(items.len()) <= MAX_ARRAY_GAP => {
					Some(Key::Index(index))
				}
				Some(index) => {
					tracing::warn!(
						index,
						len = items.len(),
						"array write too far past the end ignored"
					);
					None
				}
				None => {
					tracing::warn!(%key, "write of a non-index key to an array container ignored");
					None
				}
			},
		}
	}

	fn track(&self) {
		if let Some(observer) = context::current() {
			let mut observers = self.body.observers.borrow_mut();
			if !observers.iter().any(|o| Rc::ptr_eq(o, &observer)) {
				tracing::trace!(observer = observer.name(), "dependency registered");
				observers.push(observer);
			}
		}
	}

	fn notify(&self, key: &Key) {
		// Observers may register or get evicted while we iterate.
		let observers = self.body.observers.borrow().clone();
		tracing::trace!(%key, observers = observers.len(), "notify");

		for observer in observers {
			if observer.is_stopped() {
				self.body
					.observers
					.borrow_mut()
					.retain(|o| !Rc::ptr_eq(o, &observer));
				tracing::debug!(observer = observer.name(), "stopped observer evicted");
				continue;
			}

			if observer.is_paused() {
				continue;
			}

			observer.update(Some(key));
		}
	}
}

impl Debug for Reactive {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Reactive")
			.field(&context::untracked(|| self.snapshot()))
			.finish()
	}
}
