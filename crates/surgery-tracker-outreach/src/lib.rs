//! Patient outreach helpers.
//!
//! Builds the WhatsApp Web link staff open from a patient card: the phone is
//! normalized with the clinic's country and area codes, and the message
//! reminds the patient how long the surgical risk request has been waiting.

pub mod link;
pub mod message;
pub mod settings;

pub use link::*;
pub use message::*;
pub use settings::*;
