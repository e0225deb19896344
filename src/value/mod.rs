mod compound;
pub(crate) mod display;
mod list;
mod ser;

pub use compound::Compound;
pub use list::List;

use crate::error::{Error, Result};
use crate::Tag;

/// Value is a complete NBT value. It owns its data. Compounds and Lists own
/// their children, so a value has exactly one owner and a container can
/// never end up inside itself.
///
/// Accessors widen but never narrow: [`Value::as_int`] accepts a Byte, Short
/// or Int, while [`Value::as_short`] on an Int is an error.
///
/// ```
/// # use nbtio::Value;
/// # fn main() -> nbtio::error::Result<()> {
/// let v = Value::Short(300);
/// assert_eq!(v.as_int()?, 300);
/// assert_eq!(v.as_double()?, 300.0);
/// assert!(v.as_byte().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<u8>),
    IntArray(Vec<i32>),
    List(List),
    Compound(Compound),
}

impl Value {
    /// The kind of this value.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Byte(_) => Tag::Byte,
            Value::Short(_) => Tag::Short,
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Float(_) => Tag::Float,
            Value::Double(_) => Tag::Double,
            Value::String(_) => Tag::String,
            Value::ByteArray(_) => Tag::ByteArray,
            Value::IntArray(_) => Tag::IntArray,
            Value::List(_) => Tag::List,
            Value::Compound(_) => Tag::Compound,
        }
    }

    pub fn as_byte(&self) -> Result<i8> {
        match *self {
            Value::Byte(v) => Ok(v),
            _ => Err(Error::wrong_kind("Byte", self.tag())),
        }
    }

    pub fn as_short(&self) -> Result<i16> {
        match *self {
            Value::Byte(v) => Ok(v.into()),
            Value::Short(v) => Ok(v),
            _ => Err(Error::wrong_kind("Short", self.tag())),
        }
    }

    pub fn as_int(&self) -> Result<i32> {
        match *self {
            Value::Byte(v) => Ok(v.into()),
            Value::Short(v) => Ok(v.into()),
            Value::Int(v) => Ok(v),
            _ => Err(Error::wrong_kind("Int", self.tag())),
        }
    }

    pub fn as_long(&self) -> Result<i64> {
        match *self {
            Value::Byte(v) => Ok(v.into()),
            Value::Short(v) => Ok(v.into()),
            Value::Int(v) => Ok(v.into()),
            Value::Long(v) => Ok(v),
            _ => Err(Error::wrong_kind("Long", self.tag())),
        }
    }

    pub fn as_float(&self) -> Result<f32> {
        match *self {
            Value::Byte(v) => Ok(v.into()),
            Value::Short(v) => Ok(v.into()),
            Value::Int(v) => Ok(v as f32),
            Value::Long(v) => Ok(v as f32),
            Value::Float(v) => Ok(v),
            _ => Err(Error::wrong_kind("Float", self.tag())),
        }
    }

    pub fn as_double(&self) -> Result<f64> {
        match *self {
            Value::Byte(v) => Ok(v.into()),
            Value::Short(v) => Ok(v.into()),
            Value::Int(v) => Ok(v.into()),
            Value::Long(v) => Ok(v as f64),
            Value::Float(v) => Ok(v.into()),
            Value::Double(v) => Ok(v),
            _ => Err(Error::wrong_kind("Double", self.tag())),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(v) => Ok(v),
            _ => Err(Error::wrong_kind("String", self.tag())),
        }
    }

    pub fn as_byte_array(&self) -> Result<&[u8]> {
        match self {
            Value::ByteArray(v) => Ok(v),
            _ => Err(Error::wrong_kind("ByteArray", self.tag())),
        }
    }

    pub fn as_int_array(&self) -> Result<&[i32]> {
        match self {
            Value::IntArray(v) => Ok(v),
            _ => Err(Error::wrong_kind("IntArray", self.tag())),
        }
    }

    pub fn as_list(&self) -> Result<&List> {
        match self {
            Value::List(v) => Ok(v),
            _ => Err(Error::wrong_kind("List", self.tag())),
        }
    }

    pub fn as_list_mut(&mut self) -> Result<&mut List> {
        match self {
            Value::List(v) => Ok(v),
            _ => Err(Error::wrong_kind("List", self.tag())),
        }
    }

    pub fn as_compound(&self) -> Result<&Compound> {
        match self {
            Value::Compound(v) => Ok(v),
            _ => Err(Error::wrong_kind("Compound", self.tag())),
        }
    }

    pub fn as_compound_mut(&mut self) -> Result<&mut Compound> {
        match self {
            Value::Compound(v) => Ok(v),
            _ => Err(Error::wrong_kind("Compound", self.tag())),
        }
    }
}

/// A value together with its optional name. This is the detached form of a
/// tag: what gets built before adding it to a [`Compound`], what
/// [`Compound::remove`] hands back, and what the streaming parser
/// materializes. Compound children always have a name, list elements never
/// do.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTag {
    pub name: Option<String>,
    pub value: Value,
}

impl NamedTag {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }

    pub fn unnamed(value: impl Into<Value>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tag(&self) -> Tag {
        self.value.tag()
    }
}

// ------------- From<T> impls -------------

macro_rules! from {
    ($type:ty, $variant:ident $(, $($part:tt)+)?) => {
        impl From<$type> for Value {
            fn from(val: $type) -> Self {
                Self::$variant(val$($($part)+)?)
            }
        }
    };
}
from!(i8, Byte);
from!(i16, Short);
from!(i32, Int);
from!(i64, Long);
from!(f32, Float);
from!(f64, Double);
from!(String, String);
from!(&str, String, .to_owned());
from!(&String, String, .clone());
from!(Vec<u8>, ByteArray);
from!(&[u8], ByteArray, .to_vec());
from!(Vec<i32>, IntArray);
from!(&[i32], IntArray, .to_vec());
from!(List, List);
from!(Compound, Compound);

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Self::Byte(i8::from(val))
    }
}
