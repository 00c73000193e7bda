/// One admitted detection, timestamped when it entered the history.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    pub plate: String,
    pub observed_at: String,
}

/// What the backend's owner search said about a plate.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found {
        name: String,
        name2: String,
        national_code: String,
    },
    /// The backend answered, but with its `error` field set
    /// (e.g. "No results found for the given plate.").
    Rejected(String),
}

impl SearchOutcome {
    /// One display line per outcome, shared by the watch loop and the
    /// one-shot search command. A rejection shows only the backend's error
    /// text, never partial owner fields.
    pub fn render(&self, plate: &str) -> String {
        match self {
            SearchOutcome::Found {
                name,
                name2,
                national_code,
            } => format!(
                "Plate {} registered to {} {} (national code {})",
                plate, name, name2, national_code
            ),
            SearchOutcome::Rejected(error) => format!("Search for plate {}: {}", plate, error),
        }
    }
}

/// Generic retry-prompting line for a search that never got an answer.
pub fn render_search_failure(plate: &str, error: &failure::Error) -> String {
    format!(
        "Search for plate {} failed: {}; try again shortly",
        plate, error
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_renders_all_owner_fields() {
        let outcome = SearchOutcome::Found {
            name: "John".to_string(),
            name2: "Doe".to_string(),
            national_code: "0012345678".to_string(),
        };
        assert_eq!(
            outcome.render("REDP12"),
            "Plate REDP12 registered to John Doe (national code 0012345678)"
        );
    }

    #[test]
    fn rejection_renders_only_the_error_text() {
        let outcome = SearchOutcome::Rejected("No results found for the given plate.".to_string());
        let line = outcome.render("REDP12");
        assert_eq!(
            line,
            "Search for plate REDP12: No results found for the given plate."
        );
        assert!(!line.contains("registered"));
    }

    #[test]
    fn transport_failure_prompts_a_retry() {
        let error = format_err!("connection refused");
        let line = render_search_failure("REDP12", &error);
        assert!(line.contains("connection refused"));
        assert!(line.contains("try again"));
    }
}
