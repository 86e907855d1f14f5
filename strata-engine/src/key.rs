use std::fmt::{Debug, Display, Formatter, Write as _};
use std::hash::Hash;

use strata_error::{StrataResult, strata_err};

/// The closed set of row-key kinds a matrix can be constructed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyKind {
    /// 32-bit integer keys. The only kind with positional row semantics.
    Int,
    /// 64-bit integer keys.
    Long,
    /// String keys.
    Text,
    /// Opaque keys a custom implementation brings along.
    Opaque,
}

impl Display for KeyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KeyKind::Int => "int",
            KeyKind::Long => "long",
            KeyKind::Text => "text",
            KeyKind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// A tagged, store-serializable form of a row key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Writable {
    Int(i32),
    Long(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Writable {
    pub fn kind(&self) -> KeyKind {
        match self {
            Writable::Int(_) => KeyKind::Int,
            Writable::Long(_) => KeyKind::Long,
            Writable::Text(_) => KeyKind::Text,
            Writable::Bytes(_) => KeyKind::Opaque,
        }
    }
}

/// A row key of a distributed matrix.
///
/// The kind set is closed for dispatch purposes; behavior that differs by key
/// kind matches on [`KeyKind`] exhaustively. Custom opaque key types may
/// implement this trait and opt into store writability by overriding
/// [`RowKey::WRITABLE`] and [`RowKey::to_writable`].
pub trait RowKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// The declared kind of this key type.
    const KIND: KeyKind;

    /// Whether [`RowKey::to_writable`] has a mapping for this type.
    const WRITABLE: bool = false;

    /// The positional row index carried by this key, for the
    /// [`KeyKind::Int`] kind only.
    fn int_key(&self) -> Option<i64> {
        None
    }

    /// The string form of this key, used for row-label bindings.
    fn label(&self) -> String;

    /// Convert to the tagged serializable form.
    fn to_writable(&self) -> StrataResult<Writable> {
        Err(strata_err!(UnsupportedKeyType: "no writable mapping for row key type {}",
            std::any::type_name::<Self>()))
    }
}

/// Fail fast when the key type has no serialization mapping.
///
/// This is the once-per-write configuration check; per-row conversion may
/// assume it has passed.
pub fn check_writable<K: RowKey>() -> StrataResult<()> {
    if K::WRITABLE {
        Ok(())
    } else {
        Err(strata_err!(UnsupportedKeyType: "no writable mapping for row key type {}",
            std::any::type_name::<K>()))
    }
}

impl RowKey for i32 {
    const KIND: KeyKind = KeyKind::Int;
    const WRITABLE: bool = true;

    fn int_key(&self) -> Option<i64> {
        Some(i64::from(*self))
    }

    fn label(&self) -> String {
        self.to_string()
    }

    fn to_writable(&self) -> StrataResult<Writable> {
        Ok(Writable::Int(*self))
    }
}

impl RowKey for i64 {
    const KIND: KeyKind = KeyKind::Long;
    const WRITABLE: bool = true;

    fn label(&self) -> String {
        self.to_string()
    }

    fn to_writable(&self) -> StrataResult<Writable> {
        Ok(Writable::Long(*self))
    }
}

impl RowKey for String {
    const KIND: KeyKind = KeyKind::Text;
    const WRITABLE: bool = true;

    fn label(&self) -> String {
        self.clone()
    }

    fn to_writable(&self) -> StrataResult<Writable> {
        Ok(Writable::Text(self.clone()))
    }
}

/// An opaque byte-string row key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bytes(pub Vec<u8>);

impl RowKey for Bytes {
    const KIND: KeyKind = KeyKind::Opaque;
    const WRITABLE: bool = true;

    fn label(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 2);
        for byte in &self.0 {
            // Infallible for String.
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    fn to_writable(&self) -> StrataResult<Writable> {
        Ok(Writable::Bytes(self.0.clone()))
    }
}
