pub mod ohlcv;
pub mod params;
pub mod quote;
pub mod signals;
pub mod timeframe;

pub use ohlcv::*;
pub use params::*;
pub use quote::*;
pub use signals::*;
pub use timeframe::*;
