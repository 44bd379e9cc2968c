//! Common test utilities and mock implementations


pub use mock_interface::MockError;
pub use test_utils::{
    create_awake_driver, create_awake_driver_for, create_mock_driver, create_mock_driver_for,
    fifo_packet_bytes,
};
