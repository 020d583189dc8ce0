use anyhow::Result;

use crate::application::synthesizer::ChangeType;
use crate::domain::Warning;

use super::super::Container;

pub struct AssessController<'a> {
    container: &'a Container,
}

impl<'a> AssessController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn assess(&self, files: Vec<String>, change_type: Option<String>) -> Result<String> {
        let change_type = change_type.as_deref().and_then(ChangeType::parse);

        let use_case = self.container.assess_use_case();
        let warnings = use_case.execute(&files, change_type).await?;

        Ok(self.format_warnings(&warnings))
    }

    fn format_warnings(&self, warnings: &[Warning]) -> String {
        if warnings.is_empty() {
            return "No warnings.".to_string();
        }

        let mut output = format!("{} warning(s):\n\n", warnings.len());
        for warning in warnings {
            output.push_str(&format!(
                "[{}] {}: {}\n",
                warning.severity(),
                warning.category().as_str(),
                warning.message()
            ));
            if warning.has_provenance() {
                output.push_str(&format!("  signals: {}\n", warning.signal_ids().join(", ")));
            }
        }
        output
    }
}
