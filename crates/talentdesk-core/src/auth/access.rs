//! Access policy: role requirements, capabilities, route guards and the
//! role-filtered navigation.
//!
//! Policy rules:
//! - `admin` satisfies every role requirement (superuser over role-gated routes).
//! - A loading session is undecided. Guards answer `Pending`, never a denial.
//! - A failed session is treated as anonymous.

use crate::models::Role;

use super::session::Session;

/// What a role is allowed to do, independent of routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewDashboard,
    ManageJobs,
    ReviewApplications,
    ApplyToJobs,
    ManageUsers,
    ParseResumes,
}

impl Role {
    /// Role-gate check. Admin satisfies every requirement.
    pub fn satisfies(&self, required: Role) -> bool {
        *self == required || *self == Role::Admin
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewDashboard => true,
            Capability::ManageJobs | Capability::ReviewApplications | Capability::ParseResumes => {
                self.satisfies(Role::Recruiter)
            }
            // Applying is an applicant activity; admins do not get it implicitly.
            Capability::ApplyToJobs => *self == Role::Applicant,
            Capability::ManageUsers => *self == Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Login and register: signed-in users are sent to the dashboard.
    GuestOnly,
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Jobs,
    JobDetails(String),
    Login,
    Register,
    Dashboard,
    Profile,
    Applications,
    MyApplications,
    ApplicationDetails(String),
    Interviews,
    InterviewDetails(String),
    MyJobs,
    CreateJob,
    EditJob(String),
    Analytics,
    Chatbot,
    ResumeParser,
    Users,
}

impl Route {
    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::Jobs | Route::JobDetails(_) => Access::Public,
            Route::Login | Route::Register => Access::GuestOnly,
            Route::Dashboard
            | Route::Profile
            | Route::ApplicationDetails(_)
            | Route::Interviews
            | Route::InterviewDetails(_)
            | Route::Analytics
            | Route::Chatbot => Access::Authenticated,
            Route::Applications
            | Route::MyJobs
            | Route::CreateJob
            | Route::EditJob(_)
            | Route::ResumeParser => Access::Role(Role::Recruiter),
            Route::MyApplications => Access::Role(Role::Applicant),
            Route::Users => Access::Role(Role::Admin),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Jobs => "/jobs".to_string(),
            Route::JobDetails(id) => format!("/jobs/{}", id),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Applications => "/applications".to_string(),
            Route::MyApplications => "/applications/my-applications".to_string(),
            Route::ApplicationDetails(id) => format!("/applications/{}", id),
            Route::Interviews => "/interviews".to_string(),
            Route::InterviewDetails(id) => format!("/interviews/{}", id),
            Route::MyJobs => "/jobs/my-jobs".to_string(),
            Route::CreateJob => "/jobs/create".to_string(),
            Route::EditJob(id) => format!("/jobs/{}/edit", id),
            Route::Analytics => "/analytics".to_string(),
            Route::Chatbot => "/chatbot".to_string(),
            Route::ResumeParser => "/resume-parser".to_string(),
            Route::Users => "/users".to_string(),
        }
    }

    /// Map a path to a route. Fixed segments win over `:id` segments, so
    /// `/jobs/create` is never read as a job id.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["jobs"] => Route::Jobs,
            ["jobs", "my-jobs"] => Route::MyJobs,
            ["jobs", "create"] => Route::CreateJob,
            ["jobs", id] => Route::JobDetails(id.to_string()),
            ["jobs", id, "edit"] => Route::EditJob(id.to_string()),
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["profile"] => Route::Profile,
            ["applications"] => Route::Applications,
            ["applications", "my-applications"] => Route::MyApplications,
            ["applications", id] => Route::ApplicationDetails(id.to_string()),
            ["interviews"] => Route::Interviews,
            ["interviews", id] => Route::InterviewDetails(id.to_string()),
            ["analytics"] => Route::Analytics,
            ["chatbot"] => Route::Chatbot,
            ["resume-parser"] => Route::ResumeParser,
            ["users"] => Route::Users,
            _ => return None,
        };
        Some(route)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still loading; render a placeholder and ask again.
    Pending,
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

impl GuardDecision {
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            GuardDecision::RedirectToLogin => Some("/login"),
            GuardDecision::RedirectToDashboard => Some("/dashboard"),
            _ => None,
        }
    }
}

/// Decide whether `session` may render `route`.
pub fn guard(session: &Session, route: &Route) -> GuardDecision {
    let access = route.access();
    if access == Access::Public {
        return GuardDecision::Allow;
    }
    if session.is_loading() {
        return GuardDecision::Pending;
    }

    let role = session
        .current_user()
        .filter(|_| session.is_authenticated())
        .map(|u| u.role);

    match (access, role) {
        (Access::Public, _) => GuardDecision::Allow,
        (Access::GuestOnly, Some(_)) => GuardDecision::RedirectToDashboard,
        (Access::GuestOnly, None) => GuardDecision::Allow,
        (_, None) => GuardDecision::RedirectToLogin,
        (Access::Authenticated, Some(_)) => GuardDecision::Allow,
        (Access::Role(required), Some(role)) if role.satisfies(required) => GuardDecision::Allow,
        (Access::Role(_), Some(_)) => GuardDecision::RedirectToDashboard,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
}

impl NavItem {
    fn new(label: &'static str, route: Route) -> Self {
        Self { label, route }
    }
}

/// Menu entries visible to `session`, in display order.
pub fn navigation(session: &Session) -> Vec<NavItem> {
    let mut items = vec![NavItem::new("Home", Route::Home), NavItem::new("Jobs", Route::Jobs)];

    let role = match session.current_user() {
        Some(user) if session.is_authenticated() => user.role,
        _ => return items,
    };

    items.push(NavItem::new("Dashboard", Route::Dashboard));
    items.push(NavItem::new("Interviews", Route::Interviews));
    items.push(NavItem::new("Profile", Route::Profile));

    if role.has(Capability::ManageJobs) {
        items.push(NavItem::new("My Jobs", Route::MyJobs));
        items.push(NavItem::new("Create Job", Route::CreateJob));
    }
    if role.has(Capability::ReviewApplications) {
        items.push(NavItem::new("Applications", Route::Applications));
    }
    if role.has(Capability::ApplyToJobs) {
        items.push(NavItem::new("My Applications", Route::MyApplications));
    }
    items
}

/// Which interview listing `/interviews` shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewView {
    /// The applicant's own interviews.
    Mine,
    /// Every interview the role can see.
    All,
}

impl InterviewView {
    pub fn for_role(role: Role) -> Self {
        if role == Role::Applicant {
            InterviewView::Mine
        } else {
            InterviewView::All
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::SessionEvent;
    use crate::models::User;

    fn signed_in(role: Role) -> Session {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "1",
            "email": "a@b.com",
            "role": role.as_str()
        }))
        .expect("user fixture");
        Session::default()
            .reduce(&SessionEvent::Start)
            .reduce(&SessionEvent::Success {
                user,
                token: "tok".to_string(),
            })
    }

    #[test]
    fn test_admin_satisfies_every_role() {
        for required in [Role::Applicant, Role::Recruiter, Role::Admin] {
            assert!(Role::Admin.satisfies(required));
        }
        assert!(Role::Recruiter.satisfies(Role::Recruiter));
        assert!(!Role::Recruiter.satisfies(Role::Applicant));
        assert!(!Role::Applicant.satisfies(Role::Recruiter));
        assert!(!Role::Recruiter.satisfies(Role::Admin));
    }

    #[test]
    fn test_capabilities() {
        assert!(Role::Recruiter.has(Capability::ManageJobs));
        assert!(Role::Admin.has(Capability::ManageJobs));
        assert!(!Role::Applicant.has(Capability::ManageJobs));
        assert!(Role::Applicant.has(Capability::ApplyToJobs));
        assert!(!Role::Admin.has(Capability::ApplyToJobs));
        assert!(Role::Admin.has(Capability::ManageUsers));
        assert!(!Role::Recruiter.has(Capability::ManageUsers));
    }

    #[test]
    fn test_guard_pending_while_loading() {
        let loading = Session::default().reduce(&SessionEvent::Start);
        assert_eq!(guard(&loading, &Route::Dashboard), GuardDecision::Pending);
        assert_eq!(guard(&loading, &Route::Login), GuardDecision::Pending);
        assert_eq!(guard(&loading, &Route::Jobs), GuardDecision::Allow);
    }

    #[test]
    fn test_guard_anonymous() {
        let anon = Session::default();
        assert_eq!(guard(&anon, &Route::Home), GuardDecision::Allow);
        assert_eq!(guard(&anon, &Route::Login), GuardDecision::Allow);
        assert_eq!(guard(&anon, &Route::Profile), GuardDecision::RedirectToLogin);
        assert_eq!(guard(&anon, &Route::Users), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn test_guard_failed_is_anonymous() {
        let failed = Session::default()
            .reduce(&SessionEvent::Start)
            .reduce(&SessionEvent::Failure("Invalid credentials".to_string()));
        assert_eq!(guard(&failed, &Route::Dashboard), GuardDecision::RedirectToLogin);
        assert_eq!(guard(&failed, &Route::Login), GuardDecision::Allow);
    }

    #[test]
    fn test_guard_role_gates() {
        let applicant = signed_in(Role::Applicant);
        assert_eq!(guard(&applicant, &Route::MyApplications), GuardDecision::Allow);
        assert_eq!(guard(&applicant, &Route::CreateJob), GuardDecision::RedirectToDashboard);
        assert_eq!(guard(&applicant, &Route::Login), GuardDecision::RedirectToDashboard);

        let recruiter = signed_in(Role::Recruiter);
        assert_eq!(guard(&recruiter, &Route::EditJob("j1".into())), GuardDecision::Allow);
        assert_eq!(guard(&recruiter, &Route::MyApplications), GuardDecision::RedirectToDashboard);
        assert_eq!(guard(&recruiter, &Route::Users), GuardDecision::RedirectToDashboard);

        let admin = signed_in(Role::Admin);
        for route in [Route::MyApplications, Route::CreateJob, Route::Users, Route::ResumeParser] {
            assert_eq!(guard(&admin, &route), GuardDecision::Allow, "{:?}", route);
        }
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("/jobs/create"), Some(Route::CreateJob));
        assert_eq!(Route::parse("/jobs/my-jobs"), Some(Route::MyJobs));
        assert_eq!(Route::parse("/jobs/abc123"), Some(Route::JobDetails("abc123".into())));
        assert_eq!(Route::parse("/jobs/abc123/edit/"), Some(Route::EditJob("abc123".into())));
        assert_eq!(
            Route::parse("/applications/my-applications?page=2"),
            Some(Route::MyApplications)
        );
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn test_path_round_trips_through_parse() {
        let routes = [
            Route::Home,
            Route::JobDetails("j1".into()),
            Route::EditJob("j1".into()),
            Route::InterviewDetails("i1".into()),
            Route::ResumeParser,
            Route::Users,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route.clone()));
        }
    }

    #[test]
    fn test_navigation_by_role() {
        let labels = |session: &Session| -> Vec<&'static str> {
            navigation(session).into_iter().map(|i| i.label).collect()
        };

        assert_eq!(labels(&Session::default()), vec!["Home", "Jobs"]);
        assert_eq!(
            labels(&signed_in(Role::Applicant)),
            vec!["Home", "Jobs", "Dashboard", "Interviews", "Profile", "My Applications"]
        );
        assert_eq!(
            labels(&signed_in(Role::Admin)),
            vec!["Home", "Jobs", "Dashboard", "Interviews", "Profile", "My Jobs", "Create Job", "Applications"]
        );
    }

    #[test]
    fn test_interview_view_for_role() {
        assert_eq!(InterviewView::for_role(Role::Applicant), InterviewView::Mine);
        assert_eq!(InterviewView::for_role(Role::Recruiter), InterviewView::All);
        assert_eq!(InterviewView::for_role(Role::Admin), InterviewView::All);
    }
}
