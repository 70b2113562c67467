mod api;
mod event;

pub use api::{HealthResponse, ReportRequest};
pub use event::{BindingEvent, Subscription, TopicEvent, TopicEventResponse, TopicEventStatus};
