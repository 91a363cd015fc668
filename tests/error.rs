//! Error type and lifecycle-misuse tests.
//!
//! Per the error module's own doc comment, most failure conditions in this crate are fatal by
//! design; this file covers the handful that are recoverable enough to surface as [`chromagc::Error`].

mod common;

use chromagc::containers::HashMap;
use chromagc::{destroy, init, Configuration, Error, Root};

#[test_log::test]
fn double_init_returns_lifecycle_error() {
    common::with_heap(common::stop_the_world(), || {
        let result = init(Configuration::default());
        assert!(matches!(result, Err(Error::LifecycleError(_))));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("already initialized"));
    });
}

#[test_log::test]
fn destroy_without_init_returns_lifecycle_error() {
    common::with_no_heap(|| {
        let result = destroy();
        assert!(matches!(result, Err(Error::LifecycleError(_))));
    });
}

#[test_log::test]
fn hashmap_at_reports_key_not_found() {
    common::with_heap(common::stop_the_world(), || {
        let map = Root::<HashMap<u32, u32>>::make_hashmap();
        let one = Root::make(1u32);
        let two = Root::make(2u32);
        let hundred = Root::make(100u32);
        map.insert(one.as_ref(), hundred.as_ref());

        assert!(map.at(&1).is_ok());
        let result = map.at(&2);
        assert!(matches!(result, Err(Error::KeyNotFound)));
        assert_eq!(result.unwrap_err().to_string(), "key not found");
        drop((one, two, hundred));
    });
}

#[test_log::test]
fn vector_try_index_reports_index_out_of_bounds() {
    common::with_heap(common::stop_the_world(), || {
        let vector = Root::<chromagc::containers::Vector<u32>>::make_vector();
        let item = Root::make(7u32);
        vector.push_back(item.as_ref());

        assert!(vector.try_index(0).is_ok());
        let result = vector.try_index(5);
        match &result {
            Err(Error::IndexOutOfBounds { index, len }) => {
                assert_eq!(*index, 5);
                assert_eq!(*len, 1);
            }
            _ => panic!("expected IndexOutOfBounds"),
        }
        assert_eq!(result.unwrap_err().to_string(), "index 5 out of bounds for length 1");
        drop(item);
    });
}

#[test_log::test]
fn error_debug_and_display_are_distinct() {
    let error = Error::ThreadError("collector thread panicked".to_owned());
    let debug = format!("{error:?}");
    let display = format!("{error}");
    assert!(debug.contains("ThreadError"));
    assert!(display.contains("collector thread error"));
}
