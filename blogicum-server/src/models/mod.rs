//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod slug;
pub mod user;
pub mod post;
pub mod comment;
pub mod pagination;

pub use validation::ValidationError;
pub use slug::CategorySlug;
pub use user::{ProfileDraft, ProfileForm, RegistrationDraft, RegistrationForm, Username};
pub use post::{PostDraft, PostForm, Visibility};
pub use comment::{CommentForm, CommentText};
pub use pagination::{PageParams, PageRequest, Paginated, Pagination};
