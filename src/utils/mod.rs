pub mod alloc;
pub mod md;
pub mod sys;
