//! # Propchain
//! Propchain observes a *path* of chained properties rooted at an object,
//! e.g. `settings.theme.name`, and invokes a callback whenever the value
//! reachable through that path changes. Replacing an intermediate object
//! re-points every subscription downstream of it, so the callback keeps
//! firing with correct old/new values for the current object graph.
//!
//! ## Example: watching a nested property
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use propchain::{
//!     listen_old_new, ChangeNotifier, HasNotifier, Notifiable, PathExpr, PropertyDescriptor,
//! };
//!
//! struct Theme {
//!     notifier: ChangeNotifier,
//!     name: RefCell<String>,
//! }
//!
//! impl Theme {
//!     fn set_name(&self, name: &str) {
//!         *self.name.borrow_mut() = name.to_string();
//!         self.notifier.notify("name");
//!     }
//! }
//!
//! impl HasNotifier for Theme {
//!     fn notifier(&self) -> &ChangeNotifier {
//!         &self.notifier
//!     }
//! }
//!
//! struct Settings {
//!     notifier: ChangeNotifier,
//!     theme: RefCell<Option<Rc<Theme>>>,
//! }
//!
//! impl HasNotifier for Settings {
//!     fn notifier(&self) -> &ChangeNotifier {
//!         &self.notifier
//!     }
//! }
//!
//! let settings = Rc::new(Settings {
//!     notifier: ChangeNotifier::new(),
//!     theme: RefCell::new(Some(Rc::new(Theme {
//!         notifier: ChangeNotifier::new(),
//!         name: RefCell::new("light".to_string()),
//!     }))),
//! });
//!
//! let path = PathExpr::root()
//!     .property(PropertyDescriptor::notifying("theme", |settings: &Settings| {
//!         settings.theme.borrow().clone().map(|theme| theme as Rc<dyn Notifiable>)
//!     }))
//!     .property(PropertyDescriptor::plain("name", |theme: &Theme| {
//!         Some(theme.name.borrow().clone())
//!     }));
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let handle = listen_old_new::<String, _>(settings.clone(), &path, {
//!     let seen = seen.clone();
//!     move |old, new| {
//!         seen.borrow_mut().push((old.cloned(), new.cloned()));
//!     }
//! })
//! .unwrap();
//!
//! settings.theme.borrow().as_ref().unwrap().set_name("dark");
//! assert_eq!(
//!     seen.borrow().as_slice(),
//!     [(Some("light".to_string()), Some("dark".to_string()))]
//! );
//! drop(handle);
//! ```
//!
//! The listener keeps working when `settings.theme` is swapped for a
//! different `Theme`: the chain drops its subscription to the old theme,
//! subscribes to the new one, and reports the value transition, suppressing
//! it when the new theme's name happens to be equal.
//!
//! Paths are validated before anything subscribes: every hop except the
//! final one must be observable ([`PathError::UnsupportedLink`]) and every
//! step must be a genuine property access
//! ([`PathError::UnsupportedExpression`]).

mod chain;
mod compile;
mod descriptor;
mod error;
mod expr;
mod listener;
mod notify;
mod value;

pub use compile::CompiledPath;
pub use descriptor::{Getter, PropertyDescriptor};
pub use error::PathError;
pub use expr::PathExpr;
pub use listener::{listen, listen_old_new, ListenerHandle, ListenerSet};
pub use notify::{ChangeHandler, ChangeNotifier, HandlerId, HasNotifier, Notifiable};
pub use value::{PropertyValue, ValueKind};
