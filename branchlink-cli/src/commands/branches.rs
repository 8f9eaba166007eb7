//! Dev-status commands: repository type and branches of an issue

use branchlink_jira::{Error, JiraClient};
use clap::Args;

/// Show which source-control integration an issue is linked to
#[derive(Args, Debug)]
pub struct RepoTypeArgs {
    /// Numeric issue id
    pub issue_id: String,
}

/// List branches referencing an issue
#[derive(Args, Debug)]
pub struct BranchesArgs {
    /// Numeric issue id
    pub issue_id: String,

    /// Repository instance type (looked up from the issue if omitted)
    #[arg(short = 't', long = "type")]
    pub repository_type: Option<String>,
}

impl RepoTypeArgs {
    /// Execute the repo-type command
    pub async fn execute(&self, client: &JiraClient, json: bool) -> anyhow::Result<()> {
        match client.repository_type(&self.issue_id).await {
            Ok(repository_type) if json => {
                println!("{}", serde_json::to_string(&repository_type)?);
            }
            Ok(repository_type) => println!("{}", repository_type),
            Err(Error::NoRepositories) if json => println!("null"),
            Err(Error::NoRepositories) => {
                println!("No repositories associated with issue {}.", self.issue_id);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

impl BranchesArgs {
    /// Execute the branches command
    pub async fn execute(&self, client: &JiraClient, json: bool, verbose: bool) -> anyhow::Result<()> {
        let repository_type = match &self.repository_type {
            Some(t) => t.clone(),
            None => match client.repository_type(&self.issue_id).await {
                Ok(t) => t,
                Err(Error::NoRepositories) => {
                    if json {
                        println!("[]");
                    } else {
                        println!("No repositories associated with issue {}.", self.issue_id);
                    }
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            },
        };

        if verbose {
            println!(
                "Fetching {} branches for issue {}...",
                repository_type, self.issue_id
            );
        }

        let branches = client.branches(&self.issue_id, &repository_type).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&branches)?);
            return Ok(());
        }

        if branches.is_empty() {
            println!("No branches found.");
            return Ok(());
        }

        for branch in &branches {
            println!("{}  {}  ({})", branch.name, branch.url, branch.repository.name);
            if verbose {
                if let Some(ref url) = branch.create_pull_request_url {
                    println!("    create PR: {}", url);
                }
            }
        }

        Ok(())
    }
}
