//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Two Kinds of Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pool methods (pub)                 Connection functions (pub(crate))   │
//! │  ───────────────────                ─────────────────────────────────   │
//! │  db.catalog().get_room(id)          catalog::lock_room(&mut tx, id)     │
//! │  db.bookings().list(&query)         booking::find_conflict(&mut tx, ..) │
//! │  db.cats().register(..)             booking::insert_booking(&mut tx, ..)│
//! │                                                                         │
//! │  Each call takes its own pooled     Run on the caller's transaction so  │
//! │  connection.                        the engine composes them into one   │
//! │                                     unit of work.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`] - Rooms, services, food items, room availability
//! - [`CatRepository`] - Cat registration
//! - [`BookingRepository`] - Ledger reads
//! - [`PaymentRepository`] - Payment records

pub mod booking;
pub mod cat;
pub mod catalog;
pub mod payment;

pub use booking::BookingRepository;
pub use cat::CatRepository;
pub use catalog::CatalogRepository;
pub use payment::PaymentRepository;
