//! Globally interned resource-class names.
use std::sync::{Mutex, OnceLock};
use string_interner::{
    backend::BucketBackend, symbol::SymbolU32, StringInterner,
};

type Pool = StringInterner<BucketBackend>;

fn pool() -> &'static Mutex<Pool> {
    static POOL: OnceLock<Mutex<Pool>> = OnceLock::new();
    POOL.get_or_init(|| Mutex::new(Pool::new()))
}

/// The flavor of functional unit an operation executes on, e.g. `"mult32"`,
/// `"div64"`, or `"memport"`. Interned into a process-wide pool so classes
/// are `Copy` and compare as integers.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceClass(SymbolU32);

impl ResourceClass {
    /// Interns `name` and returns its class symbol. Interning the same name
    /// twice yields the same symbol.
    pub fn new(name: impl AsRef<str>) -> Self {
        name.as_ref().into()
    }

    /// The name this class was interned from.
    pub fn as_str(&self) -> &'static str {
        let interner = pool().lock().unwrap();
        let name = interner.resolve(self.0).unwrap();
        // SAFETY: the pool lives for the whole process and the bucket
        // backend never moves or frees an interned string.
        unsafe { std::mem::transmute::<&str, &'static str>(name) }
    }
}

impl From<&str> for ResourceClass {
    fn from(name: &str) -> Self {
        ResourceClass(pool().lock().unwrap().get_or_intern(name))
    }
}

impl From<&String> for ResourceClass {
    fn from(name: &String) -> Self {
        name.as_str().into()
    }
}

impl std::fmt::Debug for ResourceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self.as_str(), f)
    }
}

impl std::fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_str(), f)
    }
}

#[cfg(feature = "serialize")]
impl serde::Serialize for ResourceClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
