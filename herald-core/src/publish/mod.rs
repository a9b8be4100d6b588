//! LinkedIn publishing and OAuth

pub mod linkedin;
pub mod oauth;

pub use linkedin::{LinkedInPublisher, PublishOutcome, ugc_payload};
pub use oauth::{AccessToken, LinkedInOAuth};
