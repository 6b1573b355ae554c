//! Domain entities: core data structures

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::DomainError;
use crate::domain::money::Money;

/// One member of the recruiting tree as returned by the backend.
///
/// Only `id` and `children` are interpreted. Every other field (name,
/// registration level, contribution status, ...) is kept verbatim in
/// `attributes` so snapshots round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitNode {
    #[serde(alias = "_id", default)]
    pub id: String,
    /// Direct recruits, in backend order. `null` or missing means none.
    #[serde(alias = "hijos", default, deserialize_with = "null_as_empty")]
    pub children: Vec<RecruitNode>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl RecruitNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<RecruitNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Human-readable label: `nombre`, then `name`, falling back to the id.
    pub fn display_name(&self) -> &str {
        ["nombre", "name"]
            .iter()
            .find_map(|key| self.attributes.get(*key).and_then(Value::as_str))
            .unwrap_or(self.id.as_str())
    }

    /// Number of members below this node.
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&RecruitNode> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// Payload of the pyramid endpoints.
///
/// `/usuarios/piramide/{id}` answers with `hijos`, `/usuarios/piramide-completa/{id}`
/// with `usuarios`. Both are accepted everywhere; adapters pick the one they need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PyramidResponse {
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub usuarios: Vec<RecruitNode>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub hijos: Vec<RecruitNode>,
}

/// Commission paid for completing one pyramid level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    #[serde(alias = "nivel")]
    pub level: u32,
    #[serde(alias = "comision")]
    pub amount: Money,
}

/// Payload of the commissions endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommissionsResponse {
    #[serde(alias = "comisiones", default, deserialize_with = "null_as_empty")]
    pub commissions: Vec<Commission>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Explicit session context: who is logged in and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl Session {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            token: None,
            role,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Members see their own pyramid; admins see everyone's.
    pub fn authorize_member(&self, user_id: &str) -> Result<(), DomainError> {
        if self.is_admin() || self.user_id == user_id {
            Ok(())
        } else {
            Err(DomainError::Forbidden {
                requester: self.user_id.clone(),
                requested: user_id.to_string(),
            })
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_backend_node_with_hijos_when_deserializing_then_maps_children() {
        let json = r#"{
            "_id": "a1",
            "nombre": "Ana",
            "aporte": true,
            "hijos": [{"_id": "b1", "hijos": []}, {"_id": "b2"}]
        }"#;

        let node: RecruitNode = serde_json::from_str(json).unwrap();

        assert_eq!(node.id, "a1");
        assert_eq!(node.children.len(), 2);
        assert!(node.children[1].children.is_empty());
        assert_eq!(node.display_name(), "Ana");
        assert_eq!(node.attributes.get("aporte"), Some(&Value::Bool(true)));
    }

    #[test]
    fn given_null_or_missing_children_when_deserializing_then_treats_as_empty() {
        let with_null: RecruitNode = serde_json::from_str(r#"{"id": "x", "hijos": null}"#).unwrap();
        let missing: RecruitNode = serde_json::from_str(r#"{"id": "y"}"#).unwrap();

        assert!(with_null.children.is_empty());
        assert!(missing.children.is_empty());
    }

    #[test]
    fn given_node_without_name_when_display_name_then_falls_back_to_id() {
        let node = RecruitNode::new("u-7");
        assert_eq!(node.display_name(), "u-7");
    }

    #[test]
    fn given_nested_tree_when_counting_descendants_then_counts_all_levels() {
        let tree = RecruitNode::new("root").with_children(vec![
            RecruitNode::new("a").with_children(vec![RecruitNode::new("a1")]),
            RecruitNode::new("b"),
        ]);
        assert_eq!(tree.descendant_count(), 3);
    }

    #[test]
    fn given_pyramid_payload_when_deserializing_then_accepts_either_shape() {
        let completa: PyramidResponse =
            serde_json::from_str(r#"{"usuarios": [{"_id": "r"}]}"#).unwrap();
        let piramide: PyramidResponse =
            serde_json::from_str(r#"{"hijos": [{"_id": "c"}], "ok": true}"#).unwrap();

        assert_eq!(completa.usuarios.len(), 1);
        assert!(completa.hijos.is_empty());
        assert_eq!(piramide.hijos.len(), 1);
    }

    #[test]
    fn given_commission_rows_when_deserializing_then_reads_spanish_fields() {
        let json = r#"{"comisiones": [{"nivel": 1, "comision": {"$numberDecimal": "30.00"}}]}"#;
        let response: CommissionsResponse = serde_json::from_str(json).unwrap();

        assert_eq!(
            response.commissions,
            vec![Commission {
                level: 1,
                amount: Money::from_cents(3000)
            }]
        );
    }

    #[test]
    fn given_user_session_when_authorizing_other_member_then_forbidden() {
        let session = Session::new("me", Role::User);

        assert!(session.authorize_member("me").is_ok());
        assert_eq!(
            session.authorize_member("you"),
            Err(DomainError::Forbidden {
                requester: "me".into(),
                requested: "you".into()
            })
        );
    }

    #[test]
    fn given_admin_session_when_authorizing_other_member_then_allowed() {
        let session = Session::new("boss", Role::Admin);
        assert!(session.authorize_member("anyone").is_ok());
    }
}
