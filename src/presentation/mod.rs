pub mod bus;
pub mod log;
pub mod noop;
pub mod template;
pub mod traits;

pub use self::log::LogPresenter;
pub use bus::{EventBusPresenter, SessionEvent, SessionEventReceiver};
pub use noop::NoopPresenter;
pub use template::ConfirmationTemplate;
pub use traits::{NotificationKind, Presenter, SubmissionResult};
