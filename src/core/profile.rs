//! # Profiles
//!
//! Domain data the wizard collects and the backend returns:
//!
//! ```text
//! CompanyProfile ──► agent context (description step)
//! upload_excel   ──► Vec<InviteeProfile>          (file step)
//! process        ──► Vec<FilteredClient>
//!                      │ join by URL, keep non-empty match_reason
//!                      ▼
//!                 Vec<PotentialClient>            (emails step)
//! ```

use serde::{Deserialize, Serialize};

/// The user's company and the customers they are looking for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyProfile {
    pub name: String,
    pub description: String,
    pub ideal_profile: String,
}

impl CompanyProfile {
    /// All three fields are needed before the agent can work with the profile.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.ideal_profile.trim().is_empty()
    }

    /// Message sent to the chat endpoint to seed the agent's context.
    pub fn to_agent_message(&self) -> String {
        format!(
            "Company Name: {}\nCompany Description: {}\nIdeal Customer Profile: {}",
            self.name.trim(),
            self.description.trim(),
            self.ideal_profile.trim()
        )
    }
}

/// One row of the uploaded spreadsheet, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteeProfile {
    #[serde(rename = "linkedinUrl")]
    pub linkedin_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedProfile {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileAnalysis {
    #[serde(default)]
    pub profile: Option<AnalyzedProfile>,
}

/// A profile the backend evaluated against the ideal customer profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredClient {
    pub url: String,
    #[serde(default)]
    pub match_reason: Option<String>,
    /// Free-form; the backend sends either a string or a list.
    #[serde(default)]
    pub recommendations: Option<serde_json::Value>,
    #[serde(default)]
    pub analysis: Option<ProfileAnalysis>,
}

impl FilteredClient {
    pub fn has_match_reason(&self) -> bool {
        self.match_reason
            .as_deref()
            .is_some_and(|reason| !reason.trim().is_empty())
    }

    pub fn analyzed_name(&self) -> Option<&str> {
        self.analysis
            .as_ref()
            .and_then(|a| a.profile.as_ref())
            .and_then(|p| p.name.as_deref())
    }

    /// Recommendations flattened to display text.
    pub fn recommendations_text(&self) -> Option<String> {
        match self.recommendations.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                (!parts.is_empty()).then(|| parts.join("; "))
            }
            other => Some(other.to_string()),
        }
    }
}

/// An invitee the backend considers a match.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialClient {
    pub invitee: InviteeProfile,
    pub client: FilteredClient,
}

impl PotentialClient {
    /// Best available display name: analysis, then spreadsheet, then URL.
    pub fn display_name(&self) -> &str {
        self.client
            .analyzed_name()
            .or(self.invitee.name.as_deref())
            .unwrap_or(&self.invitee.linkedin_url)
    }

    pub fn match_reason(&self) -> &str {
        self.client.match_reason.as_deref().unwrap_or_default()
    }
}

/// LinkedIn URLs in invitee order.
pub fn linkedin_urls(invitees: &[InviteeProfile]) -> Vec<String> {
    invitees.iter().map(|i| i.linkedin_url.clone()).collect()
}

/// Joins backend results onto the invitee list by exact URL.
///
/// Keeps invitee order. Invitees with no result, or whose result has an
/// empty `match_reason`, are dropped. If the backend repeats a URL the first
/// entry with a match reason wins.
pub fn merge_potential_clients(
    invitees: &[InviteeProfile],
    results: &[FilteredClient],
) -> Vec<PotentialClient> {
    invitees
        .iter()
        .filter_map(|invitee| {
            results
                .iter()
                .find(|c| c.url == invitee.linkedin_url && c.has_match_reason())
                .map(|client| PotentialClient {
                    invitee: invitee.clone(),
                    client: client.clone(),
                })
        })
        .collect()
}

/// Email addresses of potential clients, skipping those without one.
pub fn client_emails(clients: &[PotentialClient]) -> Vec<String> {
    clients
        .iter()
        .filter_map(|c| c.invitee.email.as_deref())
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// Prompt asking the agent to draft outreach emails for every match.
pub fn compose_email_prompt(profile: &CompanyProfile, clients: &[PotentialClient]) -> String {
    let mut prompt = format!(
        "Write a personalized outreach email for each of the following potential clients \
         on behalf of {}.\n\nCompany description: {}\nIdeal customer profile: {}\n\nPotential clients:\n",
        profile.name.trim(),
        profile.description.trim(),
        profile.ideal_profile.trim()
    );

    for client in clients {
        prompt.push_str(&format!(
            "- {} ({})\n  Why they match: {}\n",
            client.display_name(),
            client.invitee.linkedin_url,
            client.match_reason().trim()
        ));
        if let Some(recommendations) = client.client.recommendations_text() {
            prompt.push_str(&format!("  Recommendations: {}\n", recommendations));
        }
    }

    prompt
}
