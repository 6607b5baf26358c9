pub mod builder;
pub mod types;

pub use builder::{build, BuilderOptions};
pub use types::{Fact, NotificationDocument, Section, ThemeColor};
