mod health;
mod reports;
mod worker;

pub use health::health_check;
pub use reports::{create_report, method_not_allowed};
pub use worker::{binding_event, binding_probe, subscriptions, topic_event};
