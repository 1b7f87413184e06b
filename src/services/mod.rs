pub(crate) mod judge;
pub(crate) mod plagiarism;
pub(crate) mod scoring;
pub(crate) mod storage;
pub(crate) mod test_cases;
