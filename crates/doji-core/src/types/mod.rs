//! 기본 타입 정의.

pub mod granularity;
pub mod instrument;

pub use granularity::Granularity;
pub use instrument::{Instrument, InstrumentId};
