//! Sample host-capability services.
//!
//! These exercise the full permission/dispatch/encoding pipeline end to
//! end without touching any actual host OS API — persistence is an
//! in-memory `Mutex<Vec<_>>` per service, seeded empty at construction.
//! A real integration would replace the body of `call` with calls into
//! `EventKit`/`Contacts`/whatever the host exposes; the `Service` contract
//! at the dispatcher boundary would not change.

mod calendar;
mod contacts;
mod messages;
mod reminders;

pub use calendar::CalendarService;
pub use contacts::ContactsService;
pub use messages::MessagesService;
pub use reminders::RemindersService;
