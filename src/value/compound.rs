use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::Tag;

use super::{List, NamedTag, Value};

/// A set of uniquely named values. Iteration follows insertion order, lookup
/// by name goes through a name to index map.
///
/// Every mutation checks its preconditions before touching anything, so a
/// failed call leaves the compound exactly as it was.
///
/// ```
/// # use nbtio::{Compound, Value};
/// # fn main() -> nbtio::error::Result<()> {
/// let mut c = Compound::new();
/// c.insert("health", Value::Short(20))?;
/// assert!(c.insert("health", 10).is_err());
///
/// assert_eq!(c.get_int("health")?, Some(20));
/// assert_eq!(c.get_int("missing")?, None);
/// assert!(c.get_str("health").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compound {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

macro_rules! typed_get {
    ($($get:ident => $as:ident -> $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Looks up `name` and reads it with [`Value::", stringify!($as), "`].")]
            pub fn $get(&self, name: &str) -> Result<Option<$ty>> {
                self.get(name).map(Value::$as).transpose()
            }
        )*
    };
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Gets the value with the given name. Absence is not an error.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Like [`Compound::get`], also handing back the stored name.
    pub fn get_tag(&self, name: &str) -> Option<(&str, &Value)> {
        self.index.get(name).map(|&i| {
            let (n, v) = &self.entries[i];
            (n.as_str(), v)
        })
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    typed_get! {
        get_byte => as_byte -> i8,
        get_short => as_short -> i16,
        get_int => as_int -> i32,
        get_long => as_long -> i64,
        get_float => as_float -> f32,
        get_double => as_double -> f64,
        get_str => as_str -> &str,
        get_byte_array => as_byte_array -> &[u8],
        get_int_array => as_int_array -> &[i32],
        get_list => as_list -> &List,
        get_compound => as_compound -> &Compound,
    }

    pub fn get_list_mut(&mut self, name: &str) -> Result<Option<&mut List>> {
        self.get_mut(name).map(Value::as_list_mut).transpose()
    }

    pub fn get_compound_mut(&mut self, name: &str) -> Result<Option<&mut Compound>> {
        self.get_mut(name).map(Value::as_compound_mut).transpose()
    }

    /// Adds a value under a new name. Fails if the name is already taken.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(Error::bespoke(format!(
                "compound already contains a tag named {:?}",
                name
            )));
        }

        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value.into()));
        Ok(())
    }

    /// Adds a detached tag. The tag must be named.
    pub fn add(&mut self, tag: NamedTag) -> Result<()> {
        match tag.name {
            Some(name) => self.insert(name, tag.value),
            None => Err(Error::bespoke("tags added to a compound must be named")),
        }
    }

    /// Removes a value, handing it back as a detached tag.
    pub fn remove(&mut self, name: &str) -> Option<NamedTag> {
        let i = self.index.remove(name)?;
        let (name, value) = self.entries.remove(i);
        for (n, _) in &self.entries[i..] {
            if let Some(idx) = self.index.get_mut(n) {
                *idx -= 1;
            }
        }

        Some(NamedTag {
            name: Some(name),
            value,
        })
    }

    /// Renames a child, keeping its position. Renaming to the current name is
    /// a no-op.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let new = new.into();
        let i = *self
            .index
            .get(old)
            .ok_or_else(|| Error::bespoke(format!("compound has no tag named {:?}", old)))?;

        if old == new {
            return Ok(());
        }
        if self.index.contains_key(&new) {
            return Err(Error::bespoke(format!(
                "compound already contains a tag named {:?}",
                new
            )));
        }

        self.index.remove(old);
        self.index.insert(new.clone(), i);
        self.entries[i].0 = new;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Iterates over names and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// The kind of each child, in order. Handy for checking a shape without
    /// walking values.
    pub fn tags(&self) -> impl Iterator<Item = (&str, Tag)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.tag()))
    }
}

/// Compounds compare as maps: order does not matter.
impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, v)| other.get(name).map_or(false, |o| o == v))
    }
}

type Entry = (String, Value);

fn entry_to_tag((name, value): Entry) -> NamedTag {
    NamedTag::new(name, value)
}

impl IntoIterator for Compound {
    type Item = NamedTag;
    type IntoIter = std::iter::Map<std::vec::IntoIter<Entry>, fn(Entry) -> NamedTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .map(entry_to_tag as fn(Entry) -> NamedTag)
    }
}

impl TryFrom<Vec<NamedTag>> for Compound {
    type Error = Error;

    fn try_from(tags: Vec<NamedTag>) -> Result<Self> {
        let mut c = Compound::new();
        for tag in tags {
            c.add(tag)?;
        }
        Ok(c)
    }
}
