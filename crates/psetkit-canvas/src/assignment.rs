//! Assignment URLs.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::CanvasError;

/// A Canvas assignment, located by its browser URL
/// (`https://host/courses/<course>/assignments/<id>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRef {
    /// Scheme, host and port, without a trailing slash.
    pub base_url: String,
    pub course_id: String,
    pub assignment_id: String,
}

impl AssignmentRef {
    /// Parse an assignment URL. Extra path segments, the query and the
    /// fragment are ignored.
    pub fn parse(input: &str) -> Result<Self, CanvasError> {
        let url = Url::parse(input.trim())
            .map_err(|e| CanvasError::InvalidUrl(format!("{input}: {e}")))?;
        if url.host_str().is_none() {
            return Err(CanvasError::InvalidUrl(format!("{input}: missing host")));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let (Some(course_id), Some(assignment_id)) = (
            segment_after(&segments, "courses"),
            segment_after(&segments, "assignments"),
        ) else {
            return Err(CanvasError::InvalidUrl(format!(
                "path must look like /courses/<course_id>/assignments/<assignment_id>, got: {}",
                url.path()
            )));
        };

        Ok(Self {
            base_url: url.origin().ascii_serialization(),
            course_id: course_id.to_string(),
            assignment_id: assignment_id.to_string(),
        })
    }

    /// REST endpoint for this assignment.
    pub fn api_url(&self) -> String {
        format!(
            "{}/api/v1/courses/{}/assignments/{}",
            self.base_url, self.course_id, self.assignment_id
        )
    }
}

fn segment_after<'a>(segments: &[&'a str], name: &str) -> Option<&'a str> {
    let at = segments.iter().position(|s| *s == name)?;
    segments.get(at + 1).copied()
}

impl fmt::Display for AssignmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/courses/{}/assignments/{}",
            self.base_url, self.course_id, self.assignment_id
        )
    }
}

impl FromStr for AssignmentRef {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_browser_url() {
        let target =
            AssignmentRef::parse("https://osu.instructure.com/courses/205092/assignments/5236217/")
                .unwrap();
        assert_eq!(target.base_url, "https://osu.instructure.com");
        assert_eq!(target.course_id, "205092");
        assert_eq!(target.assignment_id, "5236217");
        assert_eq!(
            target.api_url(),
            "https://osu.instructure.com/api/v1/courses/205092/assignments/5236217"
        );
    }

    #[test]
    fn keeps_port_and_ignores_extras() {
        let target: AssignmentRef = "http://localhost:8080/courses/1/assignments/2/edit?x=1#top"
            .parse()
            .unwrap();
        assert_eq!(target.base_url, "http://localhost:8080");
        assert_eq!(target.assignment_id, "2");
        assert_eq!(target.to_string(), "http://localhost:8080/courses/1/assignments/2");
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(AssignmentRef::parse("not a url").is_err());
        assert!(AssignmentRef::parse("https://canvas.example/courses/1").is_err());
        assert!(AssignmentRef::parse("https://canvas.example/courses/1/assignments").is_err());
        let err = AssignmentRef::parse("https://canvas.example/dashboard").unwrap_err();
        assert!(err.to_string().contains("/courses/<course_id>"));
    }
}
