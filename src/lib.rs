pub mod cookies;
pub mod errors;
pub mod net;
pub mod session;
pub mod store;

pub use cookies::{Cookie, SessionJar};
pub use errors::{SessionError, StoreError};
pub use net::{JsonResponse, RequestOptions, RequestTarget, Response};
pub use session::{Session, SessionBuilder, SessionExport};
pub use store::{MemoryStore, RedisStore, SessionStore, SessionStoreHandle};
