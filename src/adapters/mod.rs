//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements          | Connects to                     |
//! |---------------|---------------------|---------------------------------|
//! | `config_file` | ConfigPort          | JSON config file                |
//! | `console`     | (input source)      | stdin lines → InputEvent        |
//! | `display`     | DisplayPort         | console LCD stand-in            |
//! | `log_sink`    | EventSink           | `log` output + ReadingStore     |
//! | `sensor`      | TemperatureSensor   | AHT20 driver, shared bus lock   |
//! | `sim`         | I2c / SetDutyCycle  | simulated AHT20 + PWM channels  |
//! | `store`       | ReadingStore        | JSON-lines files, writer thread |
//! | `time`        | Clock               | system local time               |
//! | `transport`   | StatusTransport     | serial device / stdout          |

pub mod config_file;
pub mod console;
pub mod display;
pub mod log_sink;
pub mod sensor;
pub mod sim;
pub mod store;
pub mod time;
pub mod transport;
