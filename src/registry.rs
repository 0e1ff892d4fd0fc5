//! Name-keyed panel registry.
//!
//! Each entry is a builder that runs at most once, on first lookup; the
//! result is cached for every later lookup. Unknown names come back as
//! [`Lookup::NotFound`] instead of failing.

use std::collections::HashMap;

use once_cell::unsync::OnceCell;

/// Outcome of resolving a name.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a, T> {
	/// The built (or cached) entry.
	Found(&'a T),
	/// Nothing is registered under this name.
	NotFound(String),
}

impl<'a, T> Lookup<'a, T> {
	/// The entry, if there was one.
	pub fn found(self) -> Option<&'a T> {
		match self {
			Lookup::Found(t) => Some(t),
			Lookup::NotFound(_) => None,
		}
	}
}

struct Entry<T> {
	build: Box<dyn Fn() -> T>,
	cell: OnceCell<T>,
}

/// Lazily built, cached panels keyed by name.
pub struct PanelRegistry<T> {
	entries: HashMap<String, Entry<T>>,
	order: Vec<String>,
}

impl<T> Default for PanelRegistry<T> {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
			order: Vec::new(),
		}
	}
}

impl<T> PanelRegistry<T> {
	/// An empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register (or replace) a builder. Replacing drops any cached value.
	pub fn register(&mut self, name: impl Into<String>, build: impl Fn() -> T + 'static) {
		let name = name.into();
		if !self.entries.contains_key(&name) {
			self.order.push(name.clone());
		}
		self.entries.insert(
			name,
			Entry {
				build: Box::new(build),
				cell: OnceCell::new(),
			},
		);
	}

	/// Look up a panel, building it on first use.
	pub fn resolve(&self, name: &str) -> Lookup<'_, T> {
		match self.entries.get(name) {
			Some(entry) => Lookup::Found(entry.cell.get_or_init(|| (entry.build)())),
			None => Lookup::NotFound(name.to_string()),
		}
	}

	/// Whether `name` is registered. Does not build anything.
	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.order.iter().map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn builds_once_and_caches() {
		let calls = Rc::new(Cell::new(0));
		let mut reg = PanelRegistry::new();
		let c = calls.clone();
		reg.register("graph", move || {
			c.set(c.get() + 1);
			"graph panel".to_string()
		});
		assert_eq!(calls.get(), 0);
		assert_eq!(reg.resolve("graph").found().map(String::as_str), Some("graph panel"));
		assert_eq!(reg.resolve("graph").found().map(String::as_str), Some("graph panel"));
		assert_eq!(calls.get(), 1);
	}

	#[test]
	fn unknown_name_is_not_found() {
		let mut reg: PanelRegistry<u8> = PanelRegistry::new();
		reg.register("graph", || 0);
		assert!(reg.contains("graph"));
		assert!(!reg.contains("KPICard"));
		assert_eq!(reg.resolve("KPICard"), Lookup::NotFound("KPICard".into()));
	}

	#[test]
	fn names_keep_registration_order() {
		let mut reg = PanelRegistry::new();
		reg.register("b", || 1);
		reg.register("a", || 2);
		reg.register("b", || 3);
		assert_eq!(reg.names().collect::<Vec<_>>(), vec!["b", "a"]);
		assert_eq!(reg.resolve("b").found(), Some(&3));
	}
}
