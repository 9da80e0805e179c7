use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::observer::ObserverBody;

thread_local! {
	// `None` entries come from `untracked` and hide the observer below them.
	static CURRENT: RefCell<Vec<Option<Rc<ObserverBody>>>> = RefCell::new(Vec::new());
}

/// Keeps an entry on the current-observer stack until dropped.
pub(crate) struct Tracking {
	_local: PhantomData<Rc<()>>,
}

impl Drop for Tracking {
	fn drop(&mut self) {
		CURRENT.with(|c| c.borrow_mut().pop());
	}
}

pub(crate) fn enter(observer: Option<Rc<ObserverBody>>) -> Tracking {
	CURRENT.with(|c| c.borrow_mut().push(observer));
	Tracking {
		_local: PhantomData,
	}
}

pub(crate) fn current() -> Option<Rc<ObserverBody>> {
	CURRENT.with(|c| c.borrow().last().cloned().flatten())
}

/// Returns `true` while an observer is computing its value on this thread.
pub fn is_tracking() -> bool {
	current().is_some()
}

/// Runs `func` without attributing its reads to the current observer.
pub fn untracked<R>(func: impl FnOnce() -> R) -> R {
	let _tracking = enter(None);
	func()
}
