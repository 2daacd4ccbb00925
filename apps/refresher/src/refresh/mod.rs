// Resume refresh: the login → upload → profile update transaction.
// Each step takes the portal transport and event sink as arguments; only the
// sequencer knows about configuration and ordering.

pub mod apply;
pub mod authenticate;
pub mod error;
pub mod sequencer;
pub mod session;
pub mod upload;

pub use error::{SequenceError, Step, StepError};
pub use sequencer::{SequenceState, Sequencer};
pub use session::{ReferenceSource, RemoteFileReference, SessionState};
