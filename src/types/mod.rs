pub mod instrument;
pub mod note;
pub mod pitch;
