use alloc::{borrow::Cow, string::String};
use core::{
    fmt::{self, Display, Formatter},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::any::TypeInfo;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(0);

/// Atomic, unique token usable as a registry key.
///
/// Two symbols are equal only if one is a copy of the other,
/// the description is for display purposes.
#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    id: u64,
    description: &'static str,
}

impl Symbol {
    #[must_use]
    pub fn new(description: &'static str) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    #[inline]
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

/// Primitive registry key, compared by value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    Str(Cow<'static, str>),
    Int(i64),
    Symbol(Symbol),
}

/// Key of a registry entry: either a primitive key or a type token.
///
/// Type tokens are compared by [`core::any::TypeId`] only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Identifier {
    Key(Key),
    Type(TypeInfo),
}

impl Identifier {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    #[inline]
    #[must_use]
    pub const fn is_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(Key::Str(key)) => write!(f, "{key:?}"),
            Self::Key(Key::Int(key)) => write!(f, "{key}"),
            Self::Key(Key::Symbol(symbol)) => write!(f, "Symbol({})", symbol.description),
            Self::Type(type_info) => f.write_str(type_info.short_name()),
        }
    }
}

impl From<&'static str> for Identifier {
    fn from(key: &'static str) -> Self {
        Self::Key(Key::Str(Cow::Borrowed(key)))
    }
}

impl From<String> for Identifier {
    fn from(key: String) -> Self {
        Self::Key(Key::Str(Cow::Owned(key)))
    }
}

impl From<i64> for Identifier {
    fn from(key: i64) -> Self {
        Self::Key(Key::Int(key))
    }
}

impl From<i32> for Identifier {
    fn from(key: i32) -> Self {
        Self::Key(Key::Int(key.into()))
    }
}

impl From<u32> for Identifier {
    fn from(key: u32) -> Self {
        Self::Key(Key::Int(key.into()))
    }
}

impl From<Symbol> for Identifier {
    fn from(symbol: Symbol) -> Self {
        Self::Key(Key::Symbol(symbol))
    }
}

impl From<TypeInfo> for Identifier {
    fn from(type_info: TypeInfo) -> Self {
        Self::Type(type_info)
    }
}

impl From<&Identifier> for Identifier {
    fn from(identifier: &Identifier) -> Self {
        identifier.clone()
    }
}
