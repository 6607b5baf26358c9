pub mod card;
pub mod delivery;
pub mod hooks;
pub mod utils;

// Re-export common items
pub use card::{NotificationDocument, ThemeColor};
pub use delivery::{Deliver, DeliveryError, WebhookClient, WebhookTarget};
pub use hooks::{replay_events, Dispatcher, HookEvent, RunState};
pub use utils::NotifierConfig;
