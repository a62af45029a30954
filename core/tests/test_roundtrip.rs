// Compress then decompress through device buffers for every codec.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use devcomp_core::compression::{
        create_compressor, create_decompressor, ChunkedCompressor, ChunkedDecompressor, Codec, CodecLevel,
        CodecOptions, Compressor, Decompressor, OutputSize,
    };
    use devcomp_core::constants::MIN_CHUNK_SIZE;
    use devcomp_core::device::{DeviceBuffer, Stream};
    use devcomp_core::error::Result;
    use devcomp_core::types::DeviceElement;

    fn compress_with(compressor: &mut dyn Compressor, data: &[u8], stream: &Stream) -> Result<Vec<u8>> {
        let config = compressor.configure(data.len())?;
        let input = DeviceBuffer::from_host(data);
        let temp = DeviceBuffer::zeroed(config.temp_bytes);
        let output = DeviceBuffer::zeroed(config.max_output_bytes);
        let mut size = config.max_output_bytes;
        compressor.compress_async(
            &input.as_ptr(),
            data.len(),
            &temp.as_ptr(),
            config.temp_bytes,
            &output.as_ptr(),
            OutputSize::Pageable(&mut size),
            stream,
        )?;
        let mut bytes = output.to_host(stream)?;
        bytes.truncate(size);
        Ok(bytes)
    }

    fn decompress_with(decompressor: &mut dyn Decompressor, bytes: &[u8], stream: &Stream) -> Result<Vec<u8>> {
        let input = DeviceBuffer::from_host(bytes);
        let config = decompressor.configure(&input.as_ptr(), bytes.len(), stream)?;
        let temp = DeviceBuffer::zeroed(config.temp_bytes);
        let output = DeviceBuffer::zeroed(config.output_bytes);
        decompressor.decompress_async(
            &input.as_ptr(),
            bytes.len(),
            &temp.as_ptr(),
            config.temp_bytes,
            &output.as_ptr(),
            config.output_bytes,
            stream,
        )?;
        stream.synchronize()?;
        output.to_host(stream)
    }

    fn roundtrip(options: CodecOptions, data: &[u8]) -> Vec<u8> {
        let stream = Stream::new().unwrap();
        let mut compressor = ChunkedCompressor::new(options).unwrap();
        let bytes = compress_with(&mut compressor, data, &stream).unwrap();
        decompress_with(&mut ChunkedDecompressor::new(), &bytes, &stream).unwrap()
    }

    fn elements<T: DeviceElement>(values: impl Iterator<Item = T>, to_le: fn(T) -> Vec<u8>) -> Vec<u8> {
        values.flat_map(to_le).collect()
    }

    fn text_like(len: usize) -> Vec<u8> {
        let words: &[&[u8]] = &[b"stream ", b"device ", b"chunk ", b"codec ", b"buffer\n"];
        words.iter().cycle().flat_map(|w| w.iter().copied()).take(len).collect()
    }

    #[test]
    fn every_codec_roundtrips() {
        let data = text_like(300_001);
        for codec in [Codec::Raw, Codec::Zstd, Codec::Lz4, Codec::Deflate] {
            assert_eq!(roundtrip(CodecOptions::new(codec), &data), data, "codec {}", codec.name());
        }
    }

    #[test]
    fn levels_roundtrip() {
        let data = text_like(100_000);
        for level in [CodecLevel::Fast, CodecLevel::Balanced, CodecLevel::Best, CodecLevel::Custom(3)] {
            assert_eq!(roundtrip(CodecOptions::new(Codec::Zstd).with_level(level), &data), data);
            assert_eq!(roundtrip(CodecOptions::new(Codec::Deflate).with_level(level), &data), data);
        }
    }

    #[test]
    fn delta_roundtrips_every_element_type() {
        let n = 20_000usize;
        let cases: Vec<(CodecOptions, Vec<u8>)> = vec![
            (CodecOptions::delta::<i8>(), elements((0..n).map(|i| (i as i8).wrapping_mul(3)), |v| v.to_le_bytes().to_vec())),
            (CodecOptions::delta::<u8>(), elements((0..n).map(|i| i as u8), |v| v.to_le_bytes().to_vec())),
            (CodecOptions::delta::<i16>(), elements((0..n).map(|i| -(i as i16)), |v| v.to_le_bytes().to_vec())),
            (CodecOptions::delta::<u16>(), elements((0..n).map(|i| (i * 5) as u16), |v| v.to_le_bytes().to_vec())),
            (CodecOptions::delta::<i32>(), elements((0..n).map(|i| i as i32 - 10_000), |v| v.to_le_bytes().to_vec())),
            (CodecOptions::delta::<u32>(), elements((0..n).map(|i| u32::MAX - i as u32), |v| v.to_le_bytes().to_vec())),
            (CodecOptions::delta::<i64>(), elements((0..n).map(|i| i64::MIN + i as i64), |v| v.to_le_bytes().to_vec())),
            (CodecOptions::delta::<u64>(), elements((0..n).map(|i| (i as u64) << 33), |v| v.to_le_bytes().to_vec())),
        ];
        for (options, data) in cases {
            assert_eq!(roundtrip(options, &data), data);
        }
    }

    #[test]
    fn delta_keeps_trailing_partial_element() {
        let mut data = elements((0..5_000u32).map(|i| i * 2), |v| v.to_le_bytes().to_vec());
        data.extend_from_slice(&[0xAB, 0xCD, 0xEF]);
        assert_eq!(roundtrip(CodecOptions::delta::<u32>(), &data), data);
    }

    #[test]
    fn delta_packs_smooth_columns() {
        let stream = Stream::new().unwrap();
        let data = elements((0..100_000u64).map(|i| 1_000_000 + i * 3), |v| v.to_le_bytes().to_vec());
        let mut compressor = ChunkedCompressor::typed::<u64>().unwrap();
        let bytes = compress_with(&mut compressor, &data, &stream).unwrap();
        assert!(bytes.len() * 20 < data.len());
    }

    #[test]
    fn empty_input_roundtrips() {
        let stream = Stream::new().unwrap();
        let mut compressor = ChunkedCompressor::new(CodecOptions::default()).unwrap();
        let bytes = compress_with(&mut compressor, &[], &stream).unwrap();

        let input = DeviceBuffer::from_host(&bytes);
        let mut decompressor = ChunkedDecompressor::new();
        let config = decompressor.configure(&input.as_ptr(), bytes.len(), &stream).unwrap();
        assert_eq!(config.temp_bytes, 0);
        assert_eq!(config.output_bytes, 0);
        assert!(decompress_with(&mut ChunkedDecompressor::new(), &bytes, &stream).unwrap().is_empty());
    }

    #[test]
    fn single_byte_and_exact_chunk_boundaries() {
        let options = CodecOptions::new(Codec::Lz4).with_chunk_size(MIN_CHUNK_SIZE);
        for len in [1, MIN_CHUNK_SIZE - 1, MIN_CHUNK_SIZE, MIN_CHUNK_SIZE + 1, 4 * MIN_CHUNK_SIZE] {
            let data = text_like(len);
            assert_eq!(roundtrip(options.clone(), &data), data, "len {len}");
        }
    }

    #[test]
    fn configure_reports_original_size() {
        let stream = Stream::new().unwrap();
        let data = text_like(123_457);
        let bytes = compress_with(&mut ChunkedCompressor::new(CodecOptions::default()).unwrap(), &data, &stream)
            .unwrap();
        let input = DeviceBuffer::from_host(&bytes);
        let mut decompressor = ChunkedDecompressor::new();
        let config = decompressor.configure(&input.as_ptr(), bytes.len(), &stream).unwrap();
        assert_eq!(config.output_bytes, data.len());
        assert_eq!(config.temp_bytes, 2 * 8);
        assert_eq!(decompressor.header().unwrap().codec().unwrap(), Codec::Lz4);
    }

    #[test]
    fn registry_instances_interoperate() {
        let stream = Stream::new().unwrap();
        let data = text_like(90_000);
        let mut compressor = create_compressor(CodecOptions::new(Codec::Deflate)).unwrap();
        let bytes = compress_with(compressor.as_mut(), &data, &stream).unwrap();
        let mut decompressor = create_decompressor();
        assert_eq!(decompress_with(decompressor.as_mut(), &bytes, &stream).unwrap(), data);
    }

    #[test]
    fn instances_share_a_stream() {
        let stream = Stream::new().unwrap();
        let a = text_like(40_000);
        let b: Vec<u8> = (0..60_000u32).map(|i| (i % 13) as u8).collect();

        let mut ca = ChunkedCompressor::new(CodecOptions::new(Codec::Zstd)).unwrap();
        let mut cb = ChunkedCompressor::new(CodecOptions::new(Codec::Lz4)).unwrap();
        let za = compress_with(&mut ca, &a, &stream).unwrap();
        let zb = compress_with(&mut cb, &b, &stream).unwrap();

        let mut decompressor = ChunkedDecompressor::new();
        assert_eq!(decompress_with(&mut decompressor, &zb, &stream).unwrap(), b);
        assert_eq!(decompress_with(&mut decompressor, &za, &stream).unwrap(), a);
    }

    #[test]
    fn unchecksummed_streams_roundtrip() {
        let data = text_like(77_777);
        assert_eq!(roundtrip(CodecOptions::new(Codec::Zstd).with_checksum(false), &data), data);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_any_bytes_roundtrip(
            data in proptest::collection::vec(any::<u8>(), 0..40_000),
            codec in prop_oneof![Just(Codec::Raw), Just(Codec::Zstd), Just(Codec::Lz4), Just(Codec::Deflate)],
        ) {
            let options = CodecOptions::new(codec).with_chunk_size(MIN_CHUNK_SIZE);
            prop_assert_eq!(roundtrip(options, &data), data);
        }

        #[test]
        fn prop_delta_any_bytes_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..20_000)) {
            let options = CodecOptions::delta::<i32>().with_chunk_size(MIN_CHUNK_SIZE);
            prop_assert_eq!(roundtrip(options, &data), data);
        }

        #[test]
        fn prop_compressed_size_within_bound(data in proptest::collection::vec(any::<u8>(), 1..30_000)) {
            let stream = Stream::new().unwrap();
            let mut compressor = ChunkedCompressor::new(CodecOptions::new(Codec::Lz4)).unwrap();
            let config = compressor.configure(data.len()).unwrap();
            let bytes = compress_with(&mut compressor, &data, &stream).unwrap();
            prop_assert!(bytes.len() <= config.max_output_bytes);
        }
    }
}
