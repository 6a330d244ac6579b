pub mod countdown;
pub mod quiz;
pub mod recall;
pub mod result;
pub mod write;

pub use countdown::RevealCountdown;
pub use quiz::QuizSession;
pub use recall::RecallSession;
pub use result::{PracticeMode, SessionResult};
pub use write::WriteSession;
