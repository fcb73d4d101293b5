//! Authorization system for creditdesk
//!
//! Every listing request is made on behalf of a principal. The principal's
//! tenant (creditor company) and optional sub-client are the only source of
//! tenant scoping: filter parameters never take a tenant from client input.

use crate::core::error::RequestError;
use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use uuid::Uuid;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the user's tenant id
pub const TENANT_ID_HEADER: &str = "x-tenant-id";
/// Header carrying the user's sub-client id, if the user is bound to one
pub const SUBCLIENT_ID_HEADER: &str = "x-subclient-id";
/// Header carrying comma-separated roles
pub const ROLES_HEADER: &str = "x-roles";

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// Authenticated creditor user
    User {
        user_id: Uuid,
        tenant_id: Uuid,
        subclient_id: Option<Uuid>,
        roles: Vec<String>,
    },

    /// Platform administrator, not bound to a tenant
    Admin { admin_id: Uuid },

    /// No authentication
    Anonymous,
}

impl AuthContext {
    /// Convenience constructor for a tenant user without sub-client or roles
    pub fn user(user_id: Uuid, tenant_id: Uuid) -> Self {
        AuthContext::User {
            user_id,
            tenant_id,
            subclient_id: None,
            roles: Vec::new(),
        }
    }

    /// Get tenant_id from context if available
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { tenant_id, .. } => Some(*tenant_id),
            AuthContext::Admin { .. } | AuthContext::Anonymous => None,
        }
    }

    /// Get the sub-client the principal is restricted to, if any
    pub fn subclient_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { subclient_id, .. } => *subclient_id,
            _ => None,
        }
    }

    /// Get user_id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Admin { admin_id } => Some(*admin_id),
            AuthContext::Anonymous => None,
        }
    }

    /// Check if context represents an admin
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    /// User and tenant of a principal allowed to list tenant data
    pub fn require_tenant(&self) -> Result<(Uuid, Uuid), RequestError> {
        match self {
            AuthContext::User {
                user_id, tenant_id, ..
            } => Ok((*user_id, *tenant_id)),
            AuthContext::Admin { .. } => Err(RequestError::Unauthorized {
                message: "principal is not bound to a tenant".to_string(),
            }),
            AuthContext::Anonymous => Err(RequestError::Unauthorized {
                message: "authentication required".to_string(),
            }),
        }
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated principal
    Authenticated,

    /// User must have one of these roles
    HasRole(Vec<String>),

    /// Admin only
    AdminOnly,

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !matches!(context, AuthContext::Anonymous),

            AuthPolicy::HasRole(required_roles) => match context {
                AuthContext::User { roles, .. } => required_roles.iter().any(|r| roles.contains(r)),
                _ => false,
            },

            AuthPolicy::AdminOnly => context.is_admin(),

            AuthPolicy::And(policies) => policies.iter().all(|p| p.check(context)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context)),
        }
    }

    /// Check the policy, turning a refusal into a request error
    pub fn enforce(&self, context: &AuthContext, operation: &str) -> Result<(), RequestError> {
        if self.check(context) {
            return Ok(());
        }
        match context {
            AuthContext::Anonymous => Err(RequestError::Unauthorized {
                message: "authentication required".to_string(),
            }),
            _ => Err(RequestError::Forbidden {
                message: format!("not allowed to {}", operation),
            }),
        }
    }

    /// Parse policy from string (for YAML config)
    pub fn parse_policy(s: &str) -> Self {
        match s {
            "public" => AuthPolicy::Public,
            "authenticated" => AuthPolicy::Authenticated,
            "admin_only" => AuthPolicy::AdminOnly,
            s if s.starts_with("role:") => {
                let roles = s["role:".len()..]
                    .split('|')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect();
                AuthPolicy::HasRole(roles)
            }
            _ => AuthPolicy::Authenticated, // Default
        }
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from request headers
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext>;
}

/// Auth provider trusting identity headers set by an upstream gateway
///
/// A request without `x-user-id` is anonymous. A user id without a tenant
/// id is rejected, as is any malformed UUID.
#[derive(Debug, Clone, Default)]
pub struct HeaderAuthProvider;

impl HeaderAuthProvider {
    fn header_uuid(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, RequestError> {
        let Some(value) = headers.get(name) else {
            return Ok(None);
        };
        let raw = value.to_str().unwrap_or_default().trim();
        Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| RequestError::InvalidHeader {
                header: name.to_string(),
                value: raw.to_string(),
            })
    }
}

#[async_trait]
impl AuthProvider for HeaderAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext> {
        let Some(user_id) = Self::header_uuid(headers, USER_ID_HEADER)? else {
            return Ok(AuthContext::Anonymous);
        };
        let tenant_id = Self::header_uuid(headers, TENANT_ID_HEADER)?.ok_or_else(|| {
            RequestError::Unauthorized {
                message: format!("missing {} header", TENANT_ID_HEADER),
            }
        })?;
        let subclient_id = Self::header_uuid(headers, SUBCLIENT_ID_HEADER)?;
        let roles = headers
            .get(ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|raw| {
                raw.split(',')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(AuthContext::User {
            user_id,
            tenant_id,
            subclient_id,
            roles,
        })
    }
}
