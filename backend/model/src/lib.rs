//! # Model
//!
//! Mock business logic behind the Sightline demo.
//!
//! Nothing here looks at pixels or stores anything. Both halves are canned,
//! deterministic responses with an artificial delay so the frontend has
//! something realistic to wait on.
//!
//!
//!
//! ## Analysis
//!
//! - Live feed: a `tick` counter picks one of five fixed scenes, `tick mod 5`
//! - Negative ticks wrap into the same five scenes (`-1` is scene 4)
//! - Upload: the filename up to the first `.` becomes the label in the description
//! - Anything else: no objects, a hint to use the upload or live controls
//! - Confidences are always rounded to 2 decimals
//!
//!
//!
//! ## Contact
//!
//! - All three fields required
//! - Email only needs an `@` and a `.` somewhere, nothing stricter
//! - "Saved" only in the reply text, nothing is persisted
//!
//!
//!
//! ## Latency
//!
//! Both [`analysis::Analyzer`] and [`contact::ContactDesk`] carry their delay as
//! a plain [`std::time::Duration`]. The sleep is blocking, so async callers
//! should hop onto a blocking thread first. Tests use [`std::time::Duration::ZERO`].
pub mod analysis;
pub mod contact;
pub mod utils;

pub use analysis::{AnalysisResult, Analyzer, DetectedObject, Source, select};
pub use contact::{ContactDesk, ContactSubmission, Rejection};
