use feedback_core::Record;

/// Build the analysis prompt for one survey row.
///
/// The template is fixed; the same row always produces the same prompt.
pub fn build_prompt(record: &Record) -> String {
    format!(
        "Conduct a psychological analysis and provide feedback for student {}. \
         The hardest part of school: {}. \
         The most interesting part of school: {}. \
         The most appealing part of school: {}. \
         Where help is needed: {}. \
         Give recommendations on how to support the student.",
        record.name,
        record.hardest_part,
        record.most_interesting,
        record.most_appealing,
        record.help_needed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_interpolates_every_answer() {
        let record = Record {
            name: "Alice".to_string(),
            hardest_part: "algebra".to_string(),
            most_interesting: "chemistry labs".to_string(),
            most_appealing: "seeing friends".to_string(),
            help_needed: "time management".to_string(),
            feedback: None,
        };

        let prompt = build_prompt(&record);
        assert!(prompt.contains("Alice"));
        assert!(prompt.contains("algebra"));
        assert!(prompt.contains("chemistry labs"));
        assert!(prompt.contains("seeing friends"));
        assert!(prompt.contains("time management"));
        assert_eq!(prompt, build_prompt(&record));
    }
}
