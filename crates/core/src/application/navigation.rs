// Role-conditional view routing
//
// Navigation only. Data access is checked again by every use case.

use crate::domain::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Signup,
    MyVenture,
    Apply,
    ApplyStep1,
    ApplyStep2,
    ApplyStep3,
    VpDashboard,
    VpVentures,
    MentorDashboard,
    MentorRequests,
    CsmDashboard,
    CsmApplications,
    CsmApprovals,
    FieldDashboard,
    FieldApprovals,
    SelectionDashboard,
    SelectionApplications,
    CommitteeDashboard,
    CommitteeInterviews,
    AdminDashboard,
    AdminUsers,
    AdminVentures,
    AdminSettings,
    Workbench,
    Review,
    Approvals,
}

const ENTREPRENEUR_NAV: &[Route] = &[Route::MyVenture, Route::Apply];
const VENTURE_PARTNER_NAV: &[Route] = &[Route::VpDashboard, Route::VpVentures];
const MENTOR_NAV: &[Route] = &[Route::MentorDashboard, Route::MentorRequests];
const SUCCESS_MANAGER_NAV: &[Route] = &[Route::CsmDashboard, Route::CsmApplications, Route::CsmApprovals];
const FIELD_HEAD_NAV: &[Route] = &[Route::FieldDashboard, Route::FieldApprovals];
const SELECTION_MANAGER_NAV: &[Route] = &[Route::SelectionDashboard, Route::SelectionApplications];
const COMMITTEE_NAV: &[Route] = &[Route::CommitteeDashboard, Route::CommitteeInterviews];
const ADMIN_NAV: &[Route] = &[
    Route::AdminDashboard,
    Route::AdminUsers,
    Route::AdminVentures,
    Route::AdminSettings,
];

const SHARED: &[Route] = &[Route::Workbench, Route::Review, Route::Approvals];
const WIZARD: &[Route] = &[Route::ApplyStep1, Route::ApplyStep2, Route::ApplyStep3];

impl Route {
    /// Path template; shared routes carry a `:venture_id` segment
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::MyVenture => "/my-venture",
            Route::Apply => "/apply",
            Route::ApplyStep1 => "/apply/step-1",
            Route::ApplyStep2 => "/apply/step-2",
            Route::ApplyStep3 => "/apply/step-3",
            Route::VpDashboard => "/vp/dashboard",
            Route::VpVentures => "/vp/ventures",
            Route::MentorDashboard => "/mentor/dashboard",
            Route::MentorRequests => "/mentor/requests",
            Route::CsmDashboard => "/csm/dashboard",
            Route::CsmApplications => "/csm/applications",
            Route::CsmApprovals => "/csm/approvals",
            Route::FieldDashboard => "/field/dashboard",
            Route::FieldApprovals => "/field/approvals",
            Route::SelectionDashboard => "/selection/dashboard",
            Route::SelectionApplications => "/selection/applications",
            Route::CommitteeDashboard => "/committee/dashboard",
            Route::CommitteeInterviews => "/committee/interviews",
            Route::AdminDashboard => "/admin/dashboard",
            Route::AdminUsers => "/admin/users",
            Route::AdminVentures => "/admin/ventures",
            Route::AdminSettings => "/admin/settings",
            Route::Workbench => "/workbench/:venture_id",
            Route::Review => "/review/:venture_id",
            Route::Approvals => "/approvals/:venture_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Login => "Sign in",
            Route::Signup => "Sign up",
            Route::MyVenture => "My Venture",
            Route::Apply => "Apply",
            Route::ApplyStep1 => "Venture Definition",
            Route::ApplyStep2 => "Commitment",
            Route::ApplyStep3 => "Support Needs",
            Route::VpDashboard
            | Route::MentorDashboard
            | Route::CsmDashboard
            | Route::FieldDashboard
            | Route::SelectionDashboard
            | Route::CommitteeDashboard
            | Route::AdminDashboard => "Dashboard",
            Route::VpVentures | Route::AdminVentures => "Ventures",
            Route::MentorRequests => "Requests",
            Route::CsmApplications | Route::SelectionApplications => "Applications",
            Route::CsmApprovals | Route::FieldApprovals | Route::Approvals => "Approvals",
            Route::CommitteeInterviews => "Interviews",
            Route::AdminUsers => "Users",
            Route::AdminSettings => "Settings",
            Route::Workbench => "Workbench",
            Route::Review => "Review",
        }
    }

    /// Concrete path for a shared route
    pub fn href(&self, venture_id: &str) -> String {
        self.path().replace(":venture_id", venture_id)
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }
}

/// Where a caller lands after sign-in; `None` is unauthenticated
pub fn landing(role: Option<Role>) -> Route {
    match role {
        None => Route::Login,
        Some(role) => nav_routes(role)[0],
    }
}

/// Sidebar entries for a role
pub fn nav_routes(role: Role) -> &'static [Route] {
    match role {
        Role::Entrepreneur => ENTREPRENEUR_NAV,
        Role::VenturePartner => VENTURE_PARTNER_NAV,
        Role::Mentor => MENTOR_NAV,
        Role::SuccessManager => SUCCESS_MANAGER_NAV,
        Role::FieldHead => FIELD_HEAD_NAV,
        Role::SelectionManager => SELECTION_MANAGER_NAV,
        Role::SelectionCommittee => COMMITTEE_NAV,
        Role::SuperAdmin => ADMIN_NAV,
    }
}

pub fn can_access(role: Option<Role>, route: Route) -> bool {
    if route.is_public() {
        return true;
    }
    let Some(role) = role else {
        return false;
    };
    if nav_routes(role).contains(&route) {
        return true;
    }
    match role {
        Role::Entrepreneur => WIZARD.contains(&route),
        _ => SHARED.contains(&route),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub route: Route,
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationView {
    pub landing: String,
    pub entries: Vec<NavEntry>,
}

pub fn navigation_for(role: Option<Role>) -> NavigationView {
    let entries = role
        .map(nav_routes)
        .unwrap_or(&[])
        .iter()
        .map(|route| NavEntry {
            route: *route,
            label: route.label().to_string(),
            path: route.path().to_string(),
        })
        .collect();

    NavigationView {
        landing: landing(role).path().to_string(),
        entries,
    }
}
