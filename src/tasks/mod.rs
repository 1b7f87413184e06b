pub(crate) mod plagiarism;
pub(crate) mod scheduler;
