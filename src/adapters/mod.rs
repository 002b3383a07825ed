//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements          | Connects to                  |
//! |-------------|---------------------|------------------------------|
//! | `bsp`       | ImageSource         | Board camera driver (C)      |
//! |             | GraphEngine         | TFLM kernel shim (C)         |
//! | `log_sink`  | EventSink           | Serial log output            |
//! | `responder` | DetectionResponder  | Serial log output            |
//! | `sim`       | ImageSource         | Synthetic frames (host)      |
//! |             | GraphEngine         | Brightness classifier (host) |
//! |             | StoragePort         | In-memory files (host)       |
//! | `storage`   | StoragePort         | SPIFFS / host filesystem     |
//! | `time`      | Clock               | ESP32 system timer           |

#[cfg(target_os = "espidf")]
pub mod bsp;
pub mod log_sink;
pub mod responder;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod storage;
pub mod time;
