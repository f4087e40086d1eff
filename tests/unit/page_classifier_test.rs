//! Tests for URL classification and the scope gate.

use rstest::rstest;

use reviewbadge::services::page_classifier::{classify, should_run};
use reviewbadge::types::errors::PageError;
use reviewbadge::types::settings::Scope;

#[rstest]
#[case("https://github.com/notifications", true, false, false, false)]
#[case("https://github.com/notifications?query=reason%3Areview-requested", true, true, false, false)]
#[case("https://github.com/notifications?query=is%3Aunread+reason%3Areview-requested", true, true, false, false)]
#[case("https://github.com/notifications?query=reason:review-requested", true, true, false, false)]
#[case("https://github.com/notifications?query=reason%3Amention", true, false, false, false)]
#[case("https://github.com/octo-org/octo-repo/pull/42", false, false, true, false)]
#[case("https://github.com/octo-org/octo-repo/pull/42/files#diff-1", false, false, true, false)]
#[case("https://github.com/octo-org/octo-repo/pulls", false, false, false, true)]
#[case("https://github.com/octo-org/octo-repo/pulls?q=is%3Aopen", false, false, false, true)]
#[case("https://github.com/octo-org/octo-repo/issues/3", false, false, false, false)]
#[case("https://github.com/octo-org/octo-repo/pull/abc", false, false, false, false)]
#[case("/notifications?query=reason%3Areview-requested", true, true, false, false)]
fn test_classify(
    #[case] url: &str,
    #[case] notifications: bool,
    #[case] review_requested: bool,
    #[case] pr_page: bool,
    #[case] pr_list: bool,
) {
    let page = classify(url).unwrap();
    assert_eq!(page.is_notifications, notifications, "notifications for {url}");
    assert_eq!(page.is_review_requested, review_requested, "review-requested for {url}");
    assert_eq!(page.is_pr_page, pr_page, "pr page for {url}");
    assert_eq!(page.is_pr_list, pr_list, "pr list for {url}");
}

#[test]
fn test_review_requested_needs_notifications_path() {
    let page = classify("https://github.com/search?query=reason%3Areview-requested").unwrap();
    assert!(!page.is_notifications);
    assert!(!page.is_review_requested);
    assert_eq!(page.query, "reason:review-requested");
}

#[test]
fn test_path_excludes_query_and_fragment() {
    let page = classify("https://github.com/o/r/pull/7?tab=files#top").unwrap();
    assert_eq!(page.path, "/o/r/pull/7");
}

#[test]
fn test_invalid_url_is_rejected() {
    assert!(matches!(classify("not a url"), Err(PageError::InvalidUrl(_))));
}

#[rstest]
#[case(Scope::ReviewRequested, "https://github.com/notifications?query=reason%3Areview-requested", true)]
#[case(Scope::ReviewRequested, "https://github.com/notifications", false)]
#[case(Scope::ReviewRequested, "https://github.com/o/r/pull/1", false)]
#[case(Scope::ReviewRequested, "https://github.com/o/r/pulls", false)]
#[case(Scope::AllNotifications, "https://github.com/notifications", true)]
#[case(Scope::AllNotifications, "https://github.com/notifications?query=reason%3Areview-requested", true)]
#[case(Scope::AllNotifications, "https://github.com/o/r/pull/1", false)]
#[case(Scope::Everywhere, "https://github.com/notifications", true)]
#[case(Scope::Everywhere, "https://github.com/o/r/pull/1", true)]
#[case(Scope::Everywhere, "https://github.com/o/r/pulls", true)]
#[case(Scope::Everywhere, "https://github.com/o/r/issues", false)]
#[case(Scope::Everywhere, "https://github.com/", false)]
fn test_scope_gate(#[case] scope: Scope, #[case] url: &str, #[case] expected: bool) {
    let page = classify(url).unwrap();
    assert_eq!(should_run(&page, scope), expected, "{scope} on {url}");
}
