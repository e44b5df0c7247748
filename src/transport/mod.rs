//! Telegram delivery: converts `teloxide` types into the transport-neutral
//! model and feeds updates to the [`Moderator`](crate::handler::Moderator).

mod telegram;

pub use telegram::{run, TelegramActions};
