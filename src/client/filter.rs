use crate::models::Student;

/// Case-insensitive substring match on name or code. An empty (or
/// whitespace-only) term keeps every student.
pub fn matches(student: &Student, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || student.full_name.to_lowercase().contains(&term)
        || student.student_code.to_lowercase().contains(&term)
}

pub fn filter_students<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    students.iter().filter(|s| matches(s, term)).collect()
}
