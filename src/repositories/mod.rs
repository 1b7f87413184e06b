pub(crate) mod assignments;
pub(crate) mod plagiarism;
pub(crate) mod plagiarism_checks;
pub(crate) mod submissions;
pub(crate) mod test_submissions;
pub(crate) mod tests;
pub(crate) mod theory_submissions;

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
