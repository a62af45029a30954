//! types.rs
//! Element type witness: compile-time element type -> runtime `TypeTag`.
//!
//! Design notes:
//! - `DeviceElement::TYPE_TAG` is the zero-cost path for generic codecs.
//! - `type_tag_of` covers callers generic over any `'static` type and raises
//!   `NotSupported` for everything outside the eight integer types.

use std::any::TypeId;
use num_enum::TryFromPrimitive;

use crate::error::{DevcompError, Result};

/// Fixed-width integer element types understood by element-typed codecs.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum TypeTag {
    Char      = 0,
    UChar     = 1,
    Short     = 2,
    UShort    = 3,
    Int       = 4,
    UInt      = 5,
    LongLong  = 6,
    ULongLong = 7,
}

impl TypeTag {
    pub const ALL: [TypeTag; 8] = [
        TypeTag::Char,
        TypeTag::UChar,
        TypeTag::Short,
        TypeTag::UShort,
        TypeTag::Int,
        TypeTag::UInt,
        TypeTag::LongLong,
        TypeTag::ULongLong,
    ];

    /// Element width in bytes.
    pub fn width(self) -> usize {
        match self {
            TypeTag::Char | TypeTag::UChar => 1,
            TypeTag::Short | TypeTag::UShort => 2,
            TypeTag::Int | TypeTag::UInt => 4,
            TypeTag::LongLong | TypeTag::ULongLong => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            TypeTag::Char | TypeTag::Short | TypeTag::Int | TypeTag::LongLong
        )
    }

    pub fn verify(raw: u8) -> Result<TypeTag> {
        TypeTag::try_from_primitive(raw)
            .map_err(|_| DevcompError::not_supported(format!("unknown element type tag 0x{:02x}", raw)))
    }
}

/// Element types with a tag. Sealed to the eight supported integers.
pub trait DeviceElement: Copy + Send + Sync + 'static + sealed::Sealed {
    const TYPE_TAG: TypeTag;
}

mod sealed {
    pub trait Sealed {}
}

macro_rules! device_element {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            impl DeviceElement for $ty {
                const TYPE_TAG: TypeTag = TypeTag::$tag;
            }
        )*
    };
}

device_element! {
    i8  => Char,
    u8  => UChar,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => LongLong,
    u64 => ULongLong,
}

/// Runtime witness for any `'static` type.
///
/// # Errors
/// - `StatusCode::NotSupported` when `T` is not one of the eight integer types.
pub fn type_tag_of<T: 'static>() -> Result<TypeTag> {
    let id = TypeId::of::<T>();
    let tag = if id == TypeId::of::<i8>() {
        TypeTag::Char
    } else if id == TypeId::of::<u8>() {
        TypeTag::UChar
    } else if id == TypeId::of::<i16>() {
        TypeTag::Short
    } else if id == TypeId::of::<u16>() {
        TypeTag::UShort
    } else if id == TypeId::of::<i32>() {
        TypeTag::Int
    } else if id == TypeId::of::<u32>() {
        TypeTag::UInt
    } else if id == TypeId::of::<i64>() {
        TypeTag::LongLong
    } else if id == TypeId::of::<u64>() {
        TypeTag::ULongLong
    } else {
        return Err(DevcompError::not_supported(format!(
            "unsupported element type {}",
            std::any::type_name::<T>()
        )));
    };
    Ok(tag)
}
