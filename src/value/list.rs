use crate::error::{Error, Result};
use crate::Tag;

use super::{Compound, NamedTag, Value};

/// An ordered sequence of unnamed values that all have the same kind.
///
/// The kind is either given up front with [`List::with_kind`] or taken from
/// the first value inserted. Inserting a value of any other kind fails and
/// leaves the list untouched.
///
/// ```
/// # use nbtio::{List, Tag, Value};
/// # fn main() -> nbtio::error::Result<()> {
/// let mut list = List::new();
/// assert_eq!(list.kind(), None);
///
/// list.push(1)?;
/// assert_eq!(list.kind(), Some(Tag::Int));
/// assert!(list.push("two").is_err());
/// assert_eq!(list.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    kind: Option<Tag>,
    items: Vec<Value>,
}

impl List {
    /// An empty list whose kind is decided by the first push.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty list that only accepts values of the given kind.
    pub fn with_kind(kind: Tag) -> Result<Self> {
        if kind == Tag::End {
            return Err(Error::bespoke("End is not a valid list element kind"));
        }
        Ok(Self {
            kind: Some(kind),
            items: Vec::new(),
        })
    }

    /// The element kind, or `None` if the list is untyped and empty.
    pub fn kind(&self) -> Option<Tag> {
        self.kind
    }

    /// Changes the element kind. Only possible while the list is empty, or
    /// when the kind is unchanged.
    pub fn set_kind(&mut self, kind: Tag) -> Result<()> {
        if kind == Tag::End {
            return Err(Error::bespoke("End is not a valid list element kind"));
        }
        if self.kind == Some(kind) {
            return Ok(());
        }
        if !self.items.is_empty() {
            return Err(Error::bespoke(format!(
                "cannot change kind of a non-empty list of {}",
                self.kind.unwrap_or(Tag::End)
            )));
        }
        self.kind = Some(kind);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn check_kind(&self, value: &Value) -> Result<()> {
        match self.kind {
            Some(kind) if kind != value.tag() => Err(Error::bespoke(format!(
                "list of {} cannot hold a {}",
                kind,
                value.tag()
            ))),
            _ => Ok(()),
        }
    }

    fn check_index(&self, index: usize, len: usize) -> Result<()> {
        if index >= len {
            return Err(Error::index_out_of_range(index, self.items.len()));
        }
        Ok(())
    }

    /// Appends a value. The first value fixes the kind of an untyped list.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.check_kind(&value)?;
        self.kind = Some(value.tag());
        self.items.push(value);
        Ok(())
    }

    /// Appends a detached tag. List elements have no names, so a named tag
    /// is rejected.
    pub fn push_tag(&mut self, tag: NamedTag) -> Result<()> {
        if let Some(name) = tag.name {
            return Err(Error::bespoke(format!(
                "list elements cannot be named, got {:?}",
                name
            )));
        }
        self.push(tag.value)
    }

    /// Inserts at `index`, shifting later values along. `index` may equal the
    /// length.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.check_index(index, self.items.len() + 1)?;
        self.check_kind(&value)?;
        self.kind = Some(value.tag());
        self.items.insert(index, value);
        Ok(())
    }

    /// Replaces the value at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<Value> {
        let value = value.into();
        self.check_index(index, self.items.len())?;
        self.check_kind(&value)?;
        Ok(std::mem::replace(&mut self.items[index], value))
    }

    pub fn get(&self, index: usize) -> Result<&Value> {
        self.check_index(index, self.items.len())?;
        Ok(&self.items[index])
    }

    /// Mutable access to a compound element. Handing out `&mut Value` would
    /// let the element change kind, so only the inner container is exposed.
    pub fn compound_mut(&mut self, index: usize) -> Result<&mut Compound> {
        self.check_index(index, self.items.len())?;
        self.items[index].as_compound_mut()
    }

    pub fn list_mut(&mut self, index: usize) -> Result<&mut List> {
        self.check_index(index, self.items.len())?;
        self.items[index].as_list_mut()
    }

    pub fn remove(&mut self, index: usize) -> Result<Value> {
        self.check_index(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    /// Removes every value. The kind is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.items.iter().position(|v| v == value)
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl TryFrom<Vec<Value>> for List {
    type Error = Error;

    fn try_from(values: Vec<Value>) -> Result<Self> {
        let mut list = List::new();
        for v in values {
            list.push(v)?;
        }
        Ok(list)
    }
}
