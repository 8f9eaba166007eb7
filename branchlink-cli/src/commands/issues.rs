//! Issue search command

use branchlink_jira::JiraClient;
use clap::Args;

/// Search issues by custom field value
#[derive(Args, Debug)]
pub struct IssuesArgs {
    /// Custom field id (the number in `customfield_10000`)
    pub field: String,

    /// Value the field must equal
    pub value: String,
}

impl IssuesArgs {
    /// Execute the issues command
    pub async fn execute(&self, client: &JiraClient, json: bool, verbose: bool) -> anyhow::Result<()> {
        if verbose {
            println!(
                "Searching cf[{}]={} on {}...",
                self.field,
                self.value,
                client.base_url()
            );
        }

        let issues = client
            .issues_by_custom_filter(&self.field, &self.value)
            .await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&issues)?);
            return Ok(());
        }

        if issues.is_empty() {
            println!("No issues found.");
            return Ok(());
        }

        for issue in &issues {
            println!("{:<16} {}", issue.key, issue.id);
        }
        if verbose {
            println!();
            println!("{} issue(s)", issues.len());
        }

        Ok(())
    }
}
