pub mod gesture;

pub use gesture::{GestureInput, GestureSession, PointerId};
