use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::clone::deep_clone;
use crate::context;
use crate::equal::deep_equal;
use crate::reactive::{Reactive, PRIMITIVE_KEY};
use crate::value::{Field, Key, Value};

/// The computation an observer re-runs on every notification.
pub trait Getter: 'static {
	fn read(&self) -> Field;
}

impl<F, R> Getter for F
where
	F: Fn() -> R + 'static,
	R: Into<Field>,
{
	fn read(&self) -> Field {
		self().into()
	}
}

impl Getter for Reactive {
	fn read(&self) -> Field {
		Field::Reactive(self.clone())
	}
}

type Callback = Rc<dyn Fn(&Value, &Value, Option<&Key>, &Observer)>;

/// A live subscription: a getter plus a callback that fires whenever the
/// getter's value changes by deep equality.
///
/// Containers keep their observers alive, so dropping the handle does not
/// unsubscribe. `stop` releases the getter and the callback right away and
/// marks the observer so that every container drops it on its next
/// notification.
#[derive(Clone)]
pub struct Observer {
	body: Rc<ObserverBody>,
}

pub(crate) struct ObserverBody {
	name: &'static str,
	// Taken out on `stop`; the getter usually holds the containers that hold us.
	getter: RefCell<Option<Rc<dyn Getter>>>,
	callback: RefCell<Option<Callback>>,
	values: RefCell<Values>,
	paused: Cell<bool>,
	stopped: Cell<bool>,
}

#[derive(Default)]
struct Values {
	value: Value,
	prev: Value,
}

impl Observer {
	/// Creates the observer and runs it once. The callback fires right away
	/// with `key == None` unless the getter yields `Undefined`.
	pub fn new(
		getter: impl Getter,
		callback: impl Fn(&Value, &Value, Option<&Key>, &Observer) + 'static,
	) -> Self {
		Self::new_with_name("<unnamed>", getter, callback)
	}

	pub fn new_with_name(
		name: &'static str,
		getter: impl Getter,
		callback: impl Fn(&Value, &Value, Option<&Key>, &Observer) + 'static,
	) -> Self {
		let getter: Rc<dyn Getter> = Rc::new(getter);
		let callback: Callback = Rc::new(callback);
		let body = Rc::new(ObserverBody {
			name,
			getter: RefCell::new(Some(getter)),
			callback: RefCell::new(Some(callback)),
			values: RefCell::new(Values::default()),
			paused: Cell::new(false),
			stopped: Cell::new(false),
		});

		body.update(None);
		Observer { body }
	}

	pub fn name(&self) -> &'static str {
		self.body.name
	}

	pub fn pause(&self) {
		self.body.paused.set(true);
	}

	pub fn unpause(&self) {
		self.body.paused.set(false);
	}

	/// Marks the observer as stopped and drops its getter and callback.
	/// Containers evict it lazily.
	pub fn stop(&self) {
		self.body.stopped.set(true);
		// A getter or callback that is running right now keeps its own clone.
		let getter = self.body.getter.borrow_mut().take();
		let callback = self.body.callback.borrow_mut().take();
		drop((getter, callback));
	}

	pub fn is_paused(&self) -> bool {
		self.body.paused.get()
	}

	pub fn is_stopped(&self) -> bool {
		self.body.stopped.get()
	}

	/// The last computed value.
	pub fn value(&self) -> Value {
		self.body.values.borrow().value.clone()
	}

	pub fn prev_value(&self) -> Value {
		self.body.values.borrow().prev.clone()
	}
}

impl ObserverBody {
	pub(crate) fn name(&self) -> &'static str {
		self.name
	}

	pub(crate) fn is_paused(&self) -> bool {
		self.paused.get()
	}

	pub(crate) fn is_stopped(&self) -> bool {
		self.stopped.get()
	}

	pub(crate) fn update(self: &Rc<Self>, key: Option<&Key>) {
		let _span = tracing::trace_span!("observer", name = self.name).entered();

		let getter = match self.getter.borrow().clone() {
			Some(getter) => getter,
			None => return,
		};

		let fresh = {
			let _tracking = context::enter(Some(self.clone()));
			match getter.read() {
				Field::Reactive(reactive) if reactive.is_primitive() => {
					deep_clone(&reactive.get(PRIMITIVE_KEY))
				}
				field => deep_clone(&field),
			}
		};

		let changed = {
			let mut values = self.values.borrow_mut();
			values.prev = std::mem::replace(&mut values.value, fresh);
			!deep_equal(&values.value, &values.prev)
		};

		if changed {
			let callback = match self.callback.borrow().clone() {
				Some(callback) => callback,
				None => return,
			};

			// The callback may write back and re-enter this observer.
			let (value, prev) = {
				let values = self.values.borrow();
				(values.value.clone(), values.prev.clone())
			};

			tracing::trace!(key = ?key, "value changed");
			callback(&value, &prev, key, &Observer { body: self.clone() });
		}
	}
}

impl std::fmt::Debug for Observer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Observer")
			.field("name", &self.body.name)
			.field("paused", &self.is_paused())
			.field("stopped", &self.is_stopped())
			.finish()
	}
}

/// A group of observers owned together, e.g. by one UI component.
#[derive(Default, Clone)]
pub struct Observers<const N: usize> {
	vec: smallvec::SmallVec<[Observer; N]>,
}

impl<const N: usize> Observers<N> {
	pub fn add(&mut self, observer: Observer) {
		self.vec.push(observer);
	}

	pub fn len(&self) -> usize {
		self.vec.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vec.is_empty()
	}

	pub fn pause(&self) {
		self.vec.iter().for_each(Observer::pause)
	}

	pub fn unpause(&self) {
		self.vec.iter().for_each(Observer::unpause)
	}

	pub fn stop(&mut self) {
		for observer in self.vec.drain(..) {
			observer.stop();
		}
	}
}
