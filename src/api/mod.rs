pub(crate) mod assignments;
pub(crate) mod errors;
pub(crate) mod files;
pub(crate) mod handlers;
pub(crate) mod plagiarism;
pub(crate) mod router;
pub(crate) mod submissions;
pub(crate) mod test_submissions;
pub(crate) mod tests;
pub(crate) mod theory_submissions;
