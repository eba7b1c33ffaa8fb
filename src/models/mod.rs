mod meetup;
mod state;
mod subscription;
mod user;

pub use meetup::{Meetup, MeetupChanges};
pub use state::AppState;
pub use subscription::{SubscribedSlot, Subscription, SubscriptionWithMeetup};
pub use user::UserRef;
