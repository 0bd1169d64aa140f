//! Pointer-sized opaque payload stored alongside each key.

/// A pointer-sized value the table stores without interpreting.
///
/// Callers may treat it as an unsigned integer, a signed integer or a raw
/// pointer; the table never dereferences or frees what it points to.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Value(usize);

impl Value {
    pub const NULL: Value = Value(0);

    #[inline]
    pub const fn from_uint(v: usize) -> Self {
        Value(v)
    }

    #[inline]
    pub const fn from_int(v: isize) -> Self {
        Value(v as usize)
    }

    #[inline]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Value(ptr as usize)
    }

    #[inline]
    pub const fn as_uint(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn as_int(self) -> isize {
        self.0 as isize
    }

    #[inline]
    pub fn as_ptr<T>(self) -> *const T {
        self.0 as *const T
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value(v as usize)
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::from_int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::from_int(v as isize)
    }
}
