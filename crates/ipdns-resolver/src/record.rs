//! The JSON shape of a stored domain record.
//!
//! A record maps single labels to the [`PointerId`] of the next zone down,
//! and the address key [`ADDRESS_KEY`] to one dotted quad or an array of
//! them. Other keys are carried but never interpreted.

use std::net::Ipv4Addr;

use ipdns_types::{Label, PointerId};
use serde_json::{Map, Value};

/// Key holding the IPv4 addresses of a leaf record.
pub const ADDRESS_KEY: &str = "A";

/// What a record says about one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delegation {
    /// The label is not a key of the record.
    Absent,
    /// The key exists but its value is not a pointer identity.
    Malformed,
    /// The label is delegated to this pointer.
    Pointer(PointerId),
}

/// A domain record as stored in the object store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainRecord {
    entries: Map<String, Value>,
}

impl DomainRecord {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a stored value. Anything but a JSON object has no keys.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(entries) => Self { entries },
            _ => Self::default(),
        }
    }

    /// Look up the delegation for `label`. Keys are compared byte-exact.
    pub fn delegation(&self, label: &Label) -> Delegation {
        match self.entries.get(label.as_str()) {
            None => Delegation::Absent,
            Some(Value::String(s)) => match PointerId::new(s.as_str()) {
                Ok(pointer) => Delegation::Pointer(pointer),
                Err(_) => Delegation::Malformed,
            },
            Some(_) => Delegation::Malformed,
        }
    }

    /// The leaf addresses, if the address key holds at least one valid
    /// dotted quad and nothing else.
    pub fn addresses(&self) -> Option<Vec<Ipv4Addr>> {
        let addrs: Vec<Ipv4Addr> = match self.entries.get(ADDRESS_KEY)? {
            Value::String(s) => vec![s.parse().ok()?],
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str()?.parse::<Ipv4Addr>().ok())
                .collect::<Option<Vec<Ipv4Addr>>>()?,
            _ => return None,
        };
        (!addrs.is_empty()).then_some(addrs)
    }

    /// Delegate `label` to `pointer`.
    pub fn with_delegation(mut self, label: &Label, pointer: &PointerId) -> Self {
        self.entries
            .insert(label.to_string(), Value::String(pointer.to_string()));
        self
    }

    /// Set the leaf addresses. A single address is stored as a plain string.
    pub fn with_addresses(mut self, addrs: &[Ipv4Addr]) -> Self {
        let value = match addrs {
            [] => {
                self.entries.remove(ADDRESS_KEY);
                return self;
            }
            [one] => Value::String(one.to_string()),
            many => Value::Array(many.iter().map(|a| Value::String(a.to_string())).collect()),
        };
        self.entries.insert(ADDRESS_KEY.to_string(), value);
        self
    }

    /// The JSON value to store.
    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}
