pub mod router;
pub mod types;
pub mod handlers {
    pub mod fights;
    pub mod health;
    pub mod monsters;
    pub mod players;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
