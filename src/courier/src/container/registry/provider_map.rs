use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::argument::Value;
use crate::provider::Factory;

#[derive(Debug, Default)]
pub struct ProviderMap {
    providers: HashMap<String, ProviderEntry>,
}

impl ProviderMap {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Inserts an entry, handing back the one previously bound to `name`.
    pub fn insert(&mut self, name: String, entry: ProviderEntry) -> Option<ProviderEntry> {
        self.providers.insert(name, entry)
    }

    pub fn get(&self, name: &str) -> Option<&ProviderEntry> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

pub enum ProviderEntry {
    /// A name resolved to a delivery on first read.
    Factory(Box<dyn Factory>),
    /// A name handed out as is.
    Value(Value),
}

impl ProviderEntry {
    pub fn factory<F: Factory>(factory: F) -> Self {
        Self::Factory(Box::new(factory))
    }

    pub fn value(value: Value) -> Self {
        Self::Value(value)
    }
}

impl Debug for ProviderEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Factory(_) => f.write_str("Factory"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::args;
    use crate::container::Container;
    use crate::delivery::fixtures::Endpoint;
    use crate::delivery::{DeliveryError, RegularDelivery};

    use super::*;

    fn endpoint_factory() -> ProviderEntry {
        ProviderEntry::factory(|_: &Container| -> Result<_, DeliveryError> {
            Ok(RegularDelivery::<Endpoint>::new(args!["localhost"]))
        })
    }

    #[test]
    fn provider_map_insert_returns_the_replaced_entry() {
        let mut map = ProviderMap::new();

        assert!(map.insert("Endpoint".into(), endpoint_factory()).is_none());
        assert!(map
            .insert("port".into(), ProviderEntry::value(Value::new(80u16)))
            .is_none());
        assert!(matches!(
            map.insert("Endpoint".into(), ProviderEntry::value(Value::new(0))),
            Some(ProviderEntry::Factory(_))
        ));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn provider_map_get_succeeds_for_known_names() {
        let mut map = ProviderMap::new();
        map.insert("Endpoint".into(), endpoint_factory());
        map.insert("port".into(), ProviderEntry::value(Value::new(80u16)));

        assert!(matches!(map.get("Endpoint"), Some(ProviderEntry::Factory(_))));
        assert!(matches!(
            map.get("port"),
            Some(ProviderEntry::Value(value)) if *value == Value::new(80u16)
        ));
        assert!(map.get("Unknown").is_none());
        assert!(map.contains("port"));
        assert!(!map.contains("Unknown"));

        let mut names: Vec<_> = map.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["Endpoint", "port"]);
    }
}
