mod character_context;
mod draft;
mod post;
mod post_document;
mod post_id;
mod post_status;
mod session;
mod storage_path;
mod turn_role;
mod user_id;
mod user_profile;

pub use character_context::CharacterContext;
pub use draft::{EditorialDraft, EditorialVerdict, MediaUrls, PostDraft};
pub use post::{Post, PostAuthor, PostOrigin, PrivateContent, PublicContent};
pub use post_document::{POST_SCHEMA_VERSION, PostDocument};
pub use post_id::PostId;
pub use post_status::PostStatus;
pub use session::{DEFAULT_SESSION_SLOT, Session, SessionKey, Turn};
pub use storage_path::StoragePath;
pub use turn_role::TurnRole;
pub use user_id::UserId;
pub use user_profile::UserProfile;
