#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use devcomp_core::error::StatusCode;
    use devcomp_core::types::{type_tag_of, DeviceElement, TypeTag};

    #[test]
    fn witness_covers_all_integer_types() {
        assert_eq!(type_tag_of::<i8>().unwrap(), TypeTag::Char);
        assert_eq!(type_tag_of::<u8>().unwrap(), TypeTag::UChar);
        assert_eq!(type_tag_of::<i16>().unwrap(), TypeTag::Short);
        assert_eq!(type_tag_of::<u16>().unwrap(), TypeTag::UShort);
        assert_eq!(type_tag_of::<i32>().unwrap(), TypeTag::Int);
        assert_eq!(type_tag_of::<u32>().unwrap(), TypeTag::UInt);
        assert_eq!(type_tag_of::<i64>().unwrap(), TypeTag::LongLong);
        assert_eq!(type_tag_of::<u64>().unwrap(), TypeTag::ULongLong);
    }

    #[test]
    fn witness_is_injective() {
        let tags: HashSet<TypeTag> = [
            type_tag_of::<i8>(),
            type_tag_of::<u8>(),
            type_tag_of::<i16>(),
            type_tag_of::<u16>(),
            type_tag_of::<i32>(),
            type_tag_of::<u32>(),
            type_tag_of::<i64>(),
            type_tag_of::<u64>(),
        ]
        .into_iter()
        .map(|t| t.unwrap())
        .collect();
        assert_eq!(tags.len(), TypeTag::ALL.len());
    }

    #[test]
    fn compile_time_and_runtime_witness_agree() {
        fn check<T: DeviceElement>() {
            assert_eq!(type_tag_of::<T>().unwrap(), T::TYPE_TAG);
            assert_eq!(T::TYPE_TAG.width(), std::mem::size_of::<T>());
        }
        check::<i8>();
        check::<u8>();
        check::<i16>();
        check::<u16>();
        check::<i32>();
        check::<u32>();
        check::<i64>();
        check::<u64>();
    }

    #[test]
    fn unsupported_types_raise_not_supported() {
        let err = type_tag_of::<f32>().unwrap_err();
        assert_eq!(err.status(), StatusCode::NotSupported);
        assert!(err.message().contains("f32"));

        assert_eq!(type_tag_of::<f64>().unwrap_err().status(), StatusCode::NotSupported);
        assert_eq!(type_tag_of::<String>().unwrap_err().status(), StatusCode::NotSupported);
        assert_eq!(type_tag_of::<u128>().unwrap_err().status(), StatusCode::NotSupported);
    }

    #[test]
    fn tag_verify() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::verify(tag as u8).unwrap(), tag);
        }
        assert_eq!(TypeTag::verify(8).unwrap_err().status(), StatusCode::NotSupported);
    }

    #[test]
    fn signedness() {
        assert!(TypeTag::Char.is_signed());
        assert!(!TypeTag::UChar.is_signed());
        assert!(TypeTag::LongLong.is_signed());
        assert!(!TypeTag::ULongLong.is_signed());
    }
}
