use anyhow::Result;

use crate::domain::FileProfile;

use super::super::Container;

pub struct FileProfileController<'a> {
    container: &'a Container,
}

impl<'a> FileProfileController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn show(&self, path: String) -> Result<String> {
        let use_case = self.container.file_profile_use_case();
        let profile = use_case.execute(&path).await?;

        Ok(match profile {
            Some(profile) => self.format_profile(&profile),
            None => format!("No profile found for {path}"),
        })
    }

    fn format_profile(&self, profile: &FileProfile) -> String {
        let mut output = format!(
            "{}\n  stability: {:.1}  risk: {:.1}  contributors: {}  changes: {}\n  change frequency: {}\n",
            profile.path(),
            profile.stability_score(),
            profile.risk_score(),
            profile.contributor_count(),
            profile.total_changes(),
            profile.change_frequency().as_str(),
        );

        if let Some(owner) = profile.primary_owner() {
            output.push_str(&format!(
                "  primary owner: {} ({:.0}%, {} commits)\n",
                owner.author, owner.percentage, owner.commits
            ));
        }

        if !profile.active_signal_ids().is_empty() {
            output.push_str(&format!(
                "  active signals: {}\n",
                profile.active_signal_ids().join(", ")
            ));
        }

        output
    }
}
