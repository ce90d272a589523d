//! External collaborators behind narrow interfaces
//!
//! The media host and the email gateway are reached through trait objects so
//! handlers stay independent of transport details and tests can substitute
//! recording fakes.

pub mod mail;
pub mod media;

pub use mail::{Mailer, SmtpMailer};
pub use media::{HttpMediaGateway, MediaGateway};

#[cfg(any(test, feature = "test-utils"))]
pub use mail::RecordingMailer;
#[cfg(any(test, feature = "test-utils"))]
pub use media::RecordingMediaGateway;
