use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A member of a cooperative group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupMember {
    /// Member's user identifier.
    pub user_id: u64,
    /// Role within the group, e.g. `admin` or `member`.
    #[serde(default)]
    pub role: Option<String>,
    /// When the member joined.
    #[serde(default)]
    pub joined_at: Option<String>,
    /// Member trust score, when one has been computed.
    #[serde(default)]
    pub trust_score: Option<f64>,
}

/// A cooperative group, as returned by `GET /api/coops/{slug}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Group {
    /// Numeric group identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Path slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Group members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<GroupMember>,
    /// Every other field the server sent (rules, account ids, urls).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    /// The name to show for this group, falling back to the slug it was loaded by.
    pub fn display_name<'a>(&'a self, slug: &'a str) -> &'a str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(slug)
    }
}

/// The backend wraps the group as `{"group": {...}}`; older deployments did not.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum GroupResponse {
    Wrapped { group: Group },
    Bare(Group),
}

impl From<GroupResponse> for Group {
    fn from(resp: GroupResponse) -> Self {
        match resp {
            GroupResponse::Wrapped { group } => group,
            GroupResponse::Bare(group) => group,
        }
    }
}
