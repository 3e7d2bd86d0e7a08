//! Multi-call operations composed from the entity repositories.
//!
//! Nothing here spans a backend transaction. Each operation documents what
//! state a failure part-way through can leave behind.

pub(crate) mod cascade;
mod schedule;
mod text;

pub use schedule::{ScheduleAggregator, schedule_date_range};
pub use text::TextAggregator;
