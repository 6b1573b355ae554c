//! Per-screen adapters from backend payloads to the evaluator's input.
//!
//! Each pyramid screen reads a different endpoint and a different field of
//! the answer. Everything here ends in the same place: the list of the
//! member's direct recruits.

use std::fmt;

use tracing::{debug, warn};

use crate::domain::{PyramidResponse, RecruitNode};

/// A pyramid screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Member's own level badge
    Level,
    /// Member's levels with the commission each one pays
    Commissions,
    /// Member's full network
    Network,
    /// Any member's full network, admins only
    Admin,
}

/// Where the recruits sit in a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `hijos` are the member's direct recruits
    Hijos,
    /// `usuarios`, optionally led by the member themselves
    Usuarios { exclude_root: bool },
}

impl View {
    pub const ALL: [View; 4] = [View::Level, View::Commissions, View::Network, View::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Level => "level",
            View::Commissions => "commissions",
            View::Network => "network",
            View::Admin => "admin",
        }
    }

    /// Endpoint path relative to the API base; the member id is appended.
    pub fn endpoint(&self) -> &'static str {
        match self {
            View::Level | View::Commissions => "usuarios/piramide",
            View::Network | View::Admin => "usuarios/piramide-completa",
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            View::Level | View::Commissions => Shape::Hijos,
            View::Network => Shape::Usuarios { exclude_root: true },
            View::Admin => Shape::Usuarios {
                exclude_root: false,
            },
        }
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, View::Admin)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the member's direct recruits from a payload.
///
/// Root exclusion drops the leading node of `usuarios` only when it is the
/// member being evaluated (`user_id`); anything else is kept.
pub fn normalize(view: View, response: PyramidResponse, user_id: Option<&str>) -> Vec<RecruitNode> {
    let PyramidResponse { usuarios, hijos } = response;

    match view.shape() {
        Shape::Hijos => {
            if hijos.is_empty() && !usuarios.is_empty() {
                warn!(%view, "payload has 'usuarios' but no 'hijos'; evaluating an empty pyramid");
            }
            hijos
        }
        Shape::Usuarios { exclude_root } => {
            if usuarios.is_empty() && !hijos.is_empty() {
                warn!(%view, "payload has 'hijos' but no 'usuarios'; evaluating an empty pyramid");
            }
            let mut nodes = usuarios;
            if exclude_root {
                match (user_id, nodes.first()) {
                    (Some(user), Some(first)) if first.id == user => {
                        debug!(%view, root = user, "excluding member from their own pyramid");
                        nodes.remove(0);
                    }
                    (None, Some(_)) => {
                        warn!(%view, "no member id known, cannot exclude the root node");
                    }
                    _ => {}
                }
            }
            nodes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{leaves, node};

    fn completa(first: &str) -> PyramidResponse {
        let mut usuarios = vec![node(first, vec![])];
        usuarios.extend(leaves("u", 3));
        PyramidResponse {
            usuarios,
            hijos: Vec::new(),
        }
    }

    #[test]
    fn given_level_view_when_normalizing_then_uses_hijos() {
        let response = PyramidResponse {
            usuarios: leaves("x", 5),
            hijos: leaves("h", 2),
        };

        let nodes = normalize(View::Level, response, Some("me"));

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "h-0");
    }

    #[test]
    fn given_network_view_when_first_node_is_member_then_drops_it() {
        let nodes = normalize(View::Network, completa("me"), Some("me"));

        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["u-0", "u-1", "u-2"]);
    }

    #[test]
    fn given_network_view_when_first_node_is_someone_else_then_keeps_all() {
        let nodes = normalize(View::Network, completa("other"), Some("me"));
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn given_network_view_without_member_id_when_normalizing_then_keeps_all() {
        let nodes = normalize(View::Network, completa("me"), None);
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn given_admin_view_when_normalizing_then_never_excludes_root() {
        let nodes = normalize(View::Admin, completa("me"), Some("me"));
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn given_wrong_payload_shape_when_normalizing_then_empty() {
        let response = PyramidResponse {
            usuarios: Vec::new(),
            hijos: leaves("h", 3),
        };
        assert!(normalize(View::Network, response, Some("me")).is_empty());
    }

    #[test]
    fn given_views_when_listing_endpoints_then_match_backend_routes() {
        let routes: Vec<_> = View::ALL.iter().map(|v| (v.as_str(), v.endpoint())).collect();
        assert_eq!(
            routes,
            vec![
                ("level", "usuarios/piramide"),
                ("commissions", "usuarios/piramide"),
                ("network", "usuarios/piramide-completa"),
                ("admin", "usuarios/piramide-completa"),
            ]
        );
        assert!(View::Admin.requires_admin());
        assert!(!View::Network.requires_admin());
    }
}
