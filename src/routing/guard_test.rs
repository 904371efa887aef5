use super::*;
use crate::net::types::User;
use crate::util::nav::{MemoryNavigator, Navigation};

fn user(role: Role) -> User {
    User {
        id: "u-5".into(),
        user_id: "X-5".into(),
        email: "x@school.test".into(),
        first_name: "Sam".into(),
        last_name: "Lee".into(),
        role,
        address: None,
        access_token: "t".into(),
    }
}

fn signed_in(role: Role) -> AuthState {
    AuthState::authenticated(user(role), "t".into())
}

// =============================================================================
// evaluate
// =============================================================================

#[test]
fn unresolved_session_is_loading() {
    assert_eq!(RouteGuard::new().evaluate(&AuthState::default()), GuardDecision::Loading);
}

#[test]
fn anonymous_redirects_to_login() {
    assert_eq!(
        RouteGuard::new().evaluate(&AuthState::anonymous()),
        GuardDecision::Redirect("/login".into())
    );
}

#[test]
fn token_without_user_redirects_to_login() {
    let state = AuthState { user: None, token: Some("t".into()), is_authenticated: true, loading: false };
    assert_eq!(RouteGuard::new().evaluate(&state), GuardDecision::Redirect("/login".into()));
}

#[test]
fn no_allow_list_admits_any_role() {
    for role in Role::ALL {
        assert_eq!(RouteGuard::new().evaluate(&signed_in(role)), GuardDecision::Allow);
    }
}

#[test]
fn listed_role_is_allowed() {
    let guard = RouteGuard::allow([Role::Admin, Role::Teacher]);
    assert_eq!(guard.evaluate(&signed_in(Role::Teacher)), GuardDecision::Allow);
}

#[test]
fn wrong_role_goes_to_own_dashboard() {
    let guard = RouteGuard::allow([Role::Admin]);
    assert_eq!(
        guard.evaluate(&signed_in(Role::Teacher)),
        GuardDecision::Redirect("/portal/teacher/u-5/dashboard".into())
    );
}

#[test]
fn empty_allow_list_admits_nobody() {
    let guard = RouteGuard::allow(Vec::new());
    assert!(guard.allowed_roles().is_some_and(<[Role]>::is_empty));
    assert_eq!(
        guard.evaluate(&signed_in(Role::Admin)),
        GuardDecision::Redirect("/portal/admin/u-5/dashboard".into())
    );
}

// =============================================================================
// render
// =============================================================================

#[test]
fn loading_renders_placeholder_without_navigation() {
    let nav = MemoryNavigator::new("/portal/admin/u-5/dashboard");
    let rendered = RouteGuard::new().render(&AuthState::default(), &nav, || "page");
    assert_eq!(rendered, GuardedView::Loading);
    assert!(nav.history().is_empty());
}

#[test]
fn allowed_renders_view_unchanged() {
    let nav = MemoryNavigator::new("/portal/student/u-5/dashboard");
    let props = vec![1, 2, 3];
    let rendered = RouteGuard::allow([Role::Student]).render(&signed_in(Role::Student), &nav, || props.clone());
    assert_eq!(rendered.into_view(), Some(vec![1, 2, 3]));
    assert!(nav.history().is_empty());
}

#[test]
fn denied_view_is_never_built() {
    let nav = MemoryNavigator::new("/portal/admin/1/dashboard");
    let mut built = false;
    let rendered = RouteGuard::allow([Role::Admin]).render(&signed_in(Role::Parent), &nav, || built = true);
    assert_eq!(rendered, GuardedView::Redirecting);
    assert!(!built);
    assert_eq!(nav.history(), vec![Navigation::Route("/portal/parent/u-5/dashboard".into())]);
}

#[test]
fn anonymous_render_navigates_to_login() {
    let nav = MemoryNavigator::new("/portal/admin/1/dashboard");
    let rendered = RouteGuard::new().render(&AuthState::anonymous(), &nav, || ());
    assert_eq!(rendered, GuardedView::Redirecting);
    assert_eq!(nav.current_path(), "/login");
}

#[test]
fn redirect_to_current_path_is_not_reissued() {
    let nav = MemoryNavigator::new("/login");
    let rendered = RouteGuard::new().render(&AuthState::anonymous(), &nav, || ());
    assert_eq!(rendered, GuardedView::Redirecting);
    assert!(nav.history().is_empty());
}
