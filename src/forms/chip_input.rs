use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChipInputError {
    #[error("{0} is required")]
    Required(String),
}

/// Tag list behind the course form's chip field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipInput {
    label: String,
    chips: Vec<String>,
}

impl ChipInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            chips: Vec::new(),
        }
    }

    /// Edit mode starts from the tags already stored on the course.
    pub fn with_chips(label: impl Into<String>, chips: Vec<String>) -> Self {
        Self {
            label: label.into(),
            chips,
        }
    }

    pub fn chips(&self) -> &[String] {
        &self.chips
    }

    /// Enter and `,` commit the typed value. Returns the new contents of the
    /// text box when a chip was added, `None` when the key was ignored.
    pub fn handle_key(&mut self, key: &str, value: &str) -> Option<String> {
        if key != "Enter" && key != "," {
            return None;
        }
        let chip = value.trim();
        if chip.is_empty() || self.chips.iter().any(|c| c == chip) {
            return None;
        }
        self.chips.push(chip.to_string());
        Some(String::new())
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.chips.len() {
            self.chips.remove(index);
        }
    }

    pub fn validate(&self) -> Result<&[String], ChipInputError> {
        if self.chips.is_empty() {
            return Err(ChipInputError::Required(self.label.clone()));
        }
        Ok(&self.chips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_comma_add_trimmed_chips() {
        let mut tags = ChipInput::new("Tags");
        assert_eq!(tags.handle_key("Enter", "  rust "), Some(String::new()));
        assert_eq!(tags.handle_key(",", "async"), Some(String::new()));
        assert_eq!(tags.chips(), ["rust", "async"]);
    }

    #[test]
    fn test_duplicates_blanks_and_other_keys_are_ignored() {
        let mut tags = ChipInput::with_chips("Tags", vec!["rust".to_string()]);
        assert_eq!(tags.handle_key("Enter", "rust"), None);
        assert_eq!(tags.handle_key("Enter", "   "), None);
        assert_eq!(tags.handle_key("a", "tokio"), None);
        assert_eq!(tags.chips(), ["rust"]);
    }

    #[test]
    fn test_remove_and_validate() {
        let mut tags = ChipInput::with_chips("Tags", vec!["a".to_string(), "b".to_string()]);
        tags.remove(5);
        tags.remove(0);
        assert_eq!(tags.validate().unwrap(), ["b"]);

        tags.remove(0);
        assert_eq!(tags.validate(), Err(ChipInputError::Required("Tags".to_string())));
        assert_eq!(tags.validate().unwrap_err().to_string(), "Tags is required");
    }
}
