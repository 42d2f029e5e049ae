pub mod feed;
pub mod wizard;

pub use feed::CommunityFeed;
pub use wizard::{SubmitOutcome, WizardFormController};
