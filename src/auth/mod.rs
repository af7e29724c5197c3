pub mod middleware;
pub mod utils;

pub use middleware::{AuthenticatedUser, USER_ID_HEADER};
pub use utils::{load_owned_content, load_owned_quiz, require_owner};
