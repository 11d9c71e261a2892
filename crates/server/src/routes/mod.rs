mod health;
mod stream;
mod tasks;

pub use health::*;
pub use stream::*;
pub use tasks::*;
