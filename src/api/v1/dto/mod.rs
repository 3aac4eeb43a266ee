/*
 * Responsibility
 * - request/response DTO の集約
 * - validate() は Issue を列挙して返し、handler が 400 にまとめる
 */
use serde::{Deserialize, Deserializer};

use crate::error::{AppError, Issue};

pub mod events;
pub mod me;
pub mod notes;
pub mod pets;

pub trait Validate {
    fn issues(&self) -> Vec<Issue>;

    fn validate(&self) -> Result<(), AppError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(AppError::bad_input(issues))
        }
    }
}

/// Tri-state field: absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
///
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

pub(crate) fn require_text(issues: &mut Vec<Issue>, path: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(Issue::new(path, format!("{path} is required")));
    }
}

pub(crate) fn non_blank(issues: &mut Vec<Issue>, path: &str, value: Option<&str>) {
    if let Some(v) = value
        && v.trim().is_empty()
    {
        issues.push(Issue::new(path, format!("{path} cannot be empty")));
    }
}

pub(crate) fn max_len(issues: &mut Vec<Issue>, path: &str, value: Option<&str>, max: usize) {
    if let Some(v) = value
        && v.chars().count() > max
    {
        issues.push(Issue::new(path, format!("{path} must be <= {max} chars")));
    }
}

pub(crate) fn in_range<T>(issues: &mut Vec<Issue>, path: &str, value: Option<T>, min: T, max: T)
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if let Some(v) = value
        && !(min..=max).contains(&v)
    {
        issues.push(Issue::new(
            path,
            format!("{path} must be between {min} and {max}"),
        ));
    }
}

pub(crate) fn non_negative<T>(issues: &mut Vec<Issue>, path: &str, value: Option<T>)
where
    T: PartialOrd + Default,
{
    if let Some(v) = value
        && v < T::default()
    {
        issues.push(Issue::new(path, format!("{path} must be >= 0")));
    }
}
