// Device runtime: stream ordering, sticky faults, device memory access.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use devcomp_core::device::{DeviceBuffer, DevicePtr, Stream};
    use devcomp_core::error::{DevcompError, StatusCode};
    use test_log::test;

    #[test]
    fn work_runs_in_submission_order() {
        let stream = Stream::new().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..100 {
            let seen = seen.clone();
            stream
                .enqueue("push", move || {
                    seen.lock().unwrap().push(i);
                    Ok(())
                })
                .unwrap();
        }
        stream.synchronize().unwrap();
        assert_eq!(*seen.lock().unwrap(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn failure_is_sticky() {
        let stream = Stream::new().unwrap();
        let ran_after = Arc::new(AtomicBool::new(false));

        stream.enqueue("boom", || Err(DevcompError::internal("boom"))).unwrap();
        let flag = ran_after.clone();
        // May be rejected outright if the fault is already recorded.
        let _ = stream.enqueue("after", move || {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        let err = stream.synchronize().unwrap_err();
        assert_eq!(err.status(), StatusCode::Internal);
        assert_eq!(err.message(), "boom");
        assert!(!ran_after.load(Ordering::SeqCst));
        assert!(stream.fault().is_some());

        let rejected = stream.enqueue("later", || Ok(())).unwrap_err();
        assert_eq!(rejected.status(), StatusCode::DeviceError);

        // First fault wins.
        assert_eq!(stream.synchronize().unwrap_err().message(), "boom");
    }

    #[test]
    fn streams_are_independent() {
        let bad = Stream::new().unwrap();
        let good = Stream::new().unwrap();
        assert_ne!(bad.id(), good.id());

        bad.enqueue("boom", || Err(DevcompError::device("kernel fault"))).unwrap();
        assert!(bad.synchronize().is_err());

        good.enqueue("fine", || Ok(())).unwrap();
        good.synchronize().unwrap();
        assert!(good.fault().is_none());
    }

    #[test]
    fn upload_then_download_is_ordered() {
        let stream = Stream::new().unwrap();
        let buffer = DeviceBuffer::zeroed(8);
        buffer.copy_from_host_async(&stream, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(buffer.to_host(&stream).unwrap(), vec![1, 2, 3, 4, 0, 0, 0, 0]);
    }

    #[test]
    fn oversized_upload_rejected() {
        let stream = Stream::new().unwrap();
        let buffer = DeviceBuffer::zeroed(2);
        let err = buffer.copy_from_host_async(&stream, vec![0; 3]).unwrap_err();
        assert_eq!(err.status(), StatusCode::InvalidValue);
    }

    #[test]
    fn download_on_faulted_stream_fails() {
        let stream = Stream::new().unwrap();
        let buffer = DeviceBuffer::from_host(&[9; 4]);
        stream.enqueue("boom", || Err(DevcompError::internal("boom"))).unwrap();
        assert!(buffer.to_host(&stream).is_err());
    }

    #[test]
    fn device_ptr_spans() {
        let buffer = DeviceBuffer::from_host(&[0, 1, 2, 3, 4, 5]);
        let ptr = buffer.as_ptr().add(2);
        assert_eq!(ptr.capacity(), 4);
        assert_eq!(ptr.read(3).unwrap(), vec![2, 3, 4]);

        ptr.write(&[7, 7]).unwrap();
        assert_eq!(buffer.as_ptr().read(6).unwrap(), vec![0, 1, 7, 7, 4, 5]);

        let err = ptr.read(5).unwrap_err();
        assert_eq!(err.status(), StatusCode::InvalidValue);
        assert!(ptr.check_span(4, "input").is_ok());
    }

    #[test]
    fn null_ptr() {
        let null = DevicePtr::null();
        assert!(null.is_null());
        assert!(null.add(16).is_null());
        assert_eq!(null.capacity(), 0);
        null.check_span(0, "input").unwrap();
        assert_eq!(null.check_span(1, "input").unwrap_err().status(), StatusCode::InvalidValue);
    }

    #[test]
    fn dropping_stream_drains_queue() {
        let done = Arc::new(AtomicBool::new(false));
        {
            let stream = Stream::new().unwrap();
            let flag = done.clone();
            stream
                .enqueue("last", move || {
                    flag.store(true, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap();
        }
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn past_end_pointer_rejected_even_for_empty_span() {
        let buffer = DeviceBuffer::zeroed(16);
        buffer.as_ptr().add(16).check_span(0, "input").unwrap();

        let past = buffer.as_ptr().add(32);
        assert_eq!(past.check_span(0, "input").unwrap_err().status(), StatusCode::InvalidValue);
        assert_eq!(past.read(0).unwrap_err().status(), StatusCode::InvalidValue);
        assert_eq!(past.write(&[]).unwrap_err().status(), StatusCode::InvalidValue);
    }

    #[test]
    fn panicking_job_faults_stream_and_worker_survives() {
        let stream = Stream::new().unwrap();
        let buffer = DeviceBuffer::from_host(&[1, 2, 3, 4]);

        stream.enqueue("explode", || panic!("kernel exploded")).unwrap();
        let err = stream.synchronize().unwrap_err();
        assert_eq!(err.status(), StatusCode::DeviceError);
        assert!(err.message().contains("kernel exploded"));

        // Still answering: the same fault, not a dead worker.
        let again = stream.synchronize().unwrap_err();
        assert_eq!(again, err);
        let rejected = stream.enqueue("later", || Ok(())).unwrap_err();
        assert!(rejected.message().contains("prior fault"));

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.to_host(&Stream::new().unwrap()).unwrap(), vec![1, 2, 3, 4]);
    }
}
