use std::collections::HashSet;

/// Grants visibility of the API-actual split columns in arrivals exports.
pub const API_VIEW: &str = "api:view";

/// Grants mutation of the staffing ledger (shifts and movements).
pub const STAFF_EDIT: &str = "staff:edit";

/// The permission strings attached to a request. Validation happens at the
/// gateway; this type only answers membership questions the engine cares
/// about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles(HashSet<String>);

impl Roles {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    /// Parses the comma-separated role list the gateway forwards.
    pub fn from_header(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn has(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn can_view_api_splits(&self) -> bool {
        self.has(API_VIEW)
    }

    pub fn can_edit_staffing(&self) -> bool {
        self.has(STAFF_EDIT)
    }
}

/// Identity and permissions of the caller, as already validated upstream.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub roles: Roles,
    pub user: String,
}

impl Caller {
    pub fn display_user(&self) -> &str {
        if self.user.trim().is_empty() {
            "Unknown"
        } else {
            &self.user
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_parsing_trims_and_drops_empties() {
        let roles = Roles::from_header("border-force-staff, api:view,, staff:edit ");
        assert!(roles.can_view_api_splits());
        assert!(roles.can_edit_staffing());
        assert!(!roles.has(""));
    }

    #[test]
    fn missing_privileges_answer_false() {
        let roles = Roles::new(["border-force-staff"]);
        assert!(!roles.can_view_api_splits());
        assert!(!roles.can_edit_staffing());
    }

    #[test]
    fn anonymous_caller_displays_as_unknown() {
        let caller = Caller::default();
        assert_eq!(caller.display_user(), "Unknown");
    }
}
