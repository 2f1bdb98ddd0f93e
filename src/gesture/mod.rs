pub mod hand;
pub mod pinch;
pub mod screen;

pub use hand::{HandSample, HandTracking};
pub use pinch::PinchLatch;
pub use screen::{Screen, ScreenPoint};
