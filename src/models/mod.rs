pub mod project;
pub mod task;
pub mod trash;
pub mod user;

pub use project::{Project, ProjectInput, ProjectStatus, ProjectUpdate};
pub use task::{Task, TaskInput, TaskStatus, TaskUpdate};
pub use trash::{EntityKind, TaggedItem};
pub use user::{Role, User, UserProfile};
