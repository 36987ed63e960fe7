//! Ordered storage of [Bindings](Binding). The first binding registered for an abstraction wins;
//! later ones for the same abstraction are kept, but shadowed.

use crate::binding::{Binding, Lifetime};
use fxhash::FxHashMap;
use std::any::TypeId;

/// Registry of bindings consulted by providers when an abstraction is requested.
#[derive(Clone, Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<Binding>,
    first_by_abstraction: FxHashMap<TypeId, usize>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a binding. Registering an abstraction again is not an error, but the new binding
    /// will never be returned by [BindingRegistry::lookup].
    pub fn register(&mut self, binding: Binding) {
        self.first_by_abstraction
            .entry(binding.abstraction_type.type_id)
            .or_insert(self.bindings.len());
        self.bindings.push(binding);
    }

    /// Returns the first binding registered for given abstraction.
    #[inline]
    pub fn lookup(&self, abstraction: TypeId) -> Option<&Binding> {
        self.first_by_abstraction
            .get(&abstraction)
            .and_then(|index| self.bindings.get(*index))
    }

    #[inline]
    pub fn is_registered(&self, abstraction: TypeId) -> bool {
        self.first_by_abstraction.contains_key(&abstraction)
    }

    /// All bindings in registration order, including shadowed ones.
    #[inline]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Creates a registry with the effective [Lifetime::Scoped] bindings of this one. Scoped
    /// bindings shadowed by an earlier binding of another lifetime are left out.
    pub fn scoped_bindings(&self) -> Self {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(index, binding)| {
                binding.lifetime == Lifetime::Scoped
                    && self
                        .first_by_abstraction
                        .get(&binding.abstraction_type.type_id)
                        == Some(index)
            })
            .map(|(_, binding)| binding.clone())
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<Binding> for BindingRegistry {
    fn from_iter<T: IntoIterator<Item = Binding>>(iter: T) -> Self {
        let mut registry = Self::new();
        for binding in iter {
            registry.register(binding);
        }

        registry
    }
}
