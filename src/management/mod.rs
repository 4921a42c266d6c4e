mod session;
mod store;
mod token;

pub use session::SessionRegistry;
pub use store::MemoryStore;
pub use store::SessionCache;
pub use store::SessionStore;
pub use token::REFRESH_ATTEMPTS;
pub use token::REFRESH_RETRY_DELAY;
pub use token::TokenManager;
