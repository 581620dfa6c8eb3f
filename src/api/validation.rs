use super::ApiError;

const MAX_LIMIT: u64 = 50;
const DEFAULT_LIMIT: u64 = 20;

/// Clamp a requested page size into the allowed window.
#[must_use]
pub fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if trimmed.len() > 254 || !trimmed.contains('@') || trimmed.starts_with('@') {
        return Err(ApiError::validation(format!("Invalid email: {}", trimmed)));
    }
    Ok(trimmed)
}

pub fn validate_student_number(student_number: &str) -> Result<&str, ApiError> {
    let trimmed = student_number.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Student number is required"));
    }
    if trimmed.len() > 30 || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::validation(
            "Student number must be alphanumeric and at most 30 characters",
        ));
    }
    Ok(trimmed)
}

pub fn validate_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Name cannot be empty"));
    }
    if trimmed.len() > 120 {
        return Err(ApiError::validation("Name must be 120 characters or less"));
    }
    Ok(trimmed)
}

pub fn validate_cohort_year(year: i32) -> Result<i32, ApiError> {
    if !(1950..=2100).contains(&year) {
        return Err(ApiError::validation(format!(
            "Invalid cohort year: {}. Year must be between 1950 and 2100",
            year
        )));
    }
    Ok(year)
}

pub fn validate_achievement_year(year: i32) -> Result<i32, ApiError> {
    if !(1950..=2100).contains(&year) {
        return Err(ApiError::validation(format!(
            "Invalid achievement year: {}",
            year
        )));
    }
    Ok(year)
}

pub fn validate_password(password: &str, min_length: usize) -> Result<&str, ApiError> {
    if password.len() < min_length {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            min_length
        )));
    }
    Ok(password)
}

pub fn validate_content(content: &str, max_length: usize) -> Result<&str, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Content cannot be empty"));
    }
    if trimmed.len() > max_length {
        return Err(ApiError::validation(format!(
            "Content must be {} characters or less",
            max_length
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 20);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), 50);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.example").is_ok());
        assert!(validate_email("  padded@b.example  ").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@leading.example").is_err());
    }

    #[test]
    fn test_validate_student_number() {
        assert!(validate_student_number("2110512077").is_ok());
        assert!(validate_student_number("AB12").is_ok());
        assert!(validate_student_number("").is_err());
        assert!(validate_student_number("with space").is_err());
        assert!(validate_student_number(&"9".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_cohort_year() {
        assert!(validate_cohort_year(2020).is_ok());
        assert!(validate_cohort_year(1949).is_err());
        assert!(validate_cohort_year(2101).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough", 8).is_ok());
        assert!(validate_password("short", 8).is_err());
    }
}
