#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::config::{IdParamPolicy, RouteConfig};

const BASE: &str = "/api/v1/finance";

fn inferrer() -> RouteInferrer {
    RouteInferrer::new(&RouteConfig::default())
}

fn route(method: &str) -> RouteMapping {
    inferrer().infer(method, BASE)
}

#[test]
fn test_create_maps_to_collection_post() {
    let r = route("CreateJournalEntry");
    assert_eq!(r.verb, HttpVerb::Post);
    assert_eq!(r.path, "/api/v1/finance/journal-entries");
    assert_eq!(r.body, BodyPolicy::Wildcard);
}

#[test]
fn test_get_uses_universal_id() {
    let r = route("GetJournalEntry");
    assert_eq!(r.verb, HttpVerb::Get);
    assert_eq!(r.path, "/api/v1/finance/journal-entries/{id}");
    assert_eq!(r.body, BodyPolicy::None);
}

#[test]
fn test_list_uses_alias() {
    let r = route("ListJournalEntries");
    assert_eq!(r.verb, HttpVerb::Get);
    assert_eq!(r.path, "/api/v1/finance/journal-entries");
    assert_eq!(r.body, BodyPolicy::None);
}

#[test]
fn test_id_verb_action() {
    let r = route("ApproveJournalEntry");
    assert_eq!(r.verb, HttpVerb::Post);
    assert_eq!(r.path, "/api/v1/finance/journal-entries/{id}/approve");
    assert_eq!(r.body, BodyPolicy::Wildcard);
}

#[test]
fn test_plain_action_has_no_id() {
    let r = route("ExportSomething");
    assert_eq!(r.verb, HttpVerb::Post);
    assert_eq!(r.path, "/api/v1/finance/something/export");
}

#[test]
fn test_batch_create_wins_over_create() {
    let category = inferrer().classify("BatchCreateJournalEntry");
    assert_eq!(
        category,
        RouteCategory::BatchCreate {
            resource: "JournalEntry".to_string()
        }
    );
    assert_eq!(
        route("BatchCreateJournalEntry").path,
        "/api/v1/finance/journal-entries/batch"
    );
}

#[test]
fn test_get_with_list_or_statistics_is_not_single_get() {
    let classifier = inferrer();
    assert_eq!(classifier.classify("GetAccountList").label(), "fallback");
    assert_eq!(classifier.classify("GetStatistics").label(), "fallback");
    assert_eq!(route("GetStatistics").path, "/api/v1/finance/get-statistics");
}

#[test]
fn test_get_collection_markers_drop_the_id() {
    let r = route("GetAccountBalanceHistory");
    assert_eq!(r.verb, HttpVerb::Get);
    assert_eq!(r.path, "/api/v1/finance/account-balance-history");
    assert_eq!(
        inferrer().classify("GetOpenItemsByAccount").label(),
        "get-collection"
    );
}

#[test]
fn test_list_variants_and_placeholder() {
    assert_eq!(route("SearchOpenItems").path, "/api/v1/finance/open-items");
    assert_eq!(route("StreamAttachments").path, "/api/v1/finance/attachments");
    assert_eq!(route("List").path, "/api/v1/finance/items");
}

#[test]
fn test_update_and_delete() {
    let update = route("UpdateTemplate");
    assert_eq!(update.verb, HttpVerb::Put);
    assert_eq!(update.path, "/api/v1/finance/templates/{id}");
    assert_eq!(update.body, BodyPolicy::Wildcard);

    let delete = route("DeleteAttachment");
    assert_eq!(delete.verb, HttpVerb::Delete);
    assert_eq!(delete.path, "/api/v1/finance/attachments/{id}");
    assert_eq!(delete.body, BodyPolicy::None);
}

#[test]
fn test_action_without_resource() {
    let r = route("Reconcile");
    assert_eq!(r.path, "/api/v1/finance/reconcile");
    assert_eq!(r.body, BodyPolicy::Wildcard);
}

#[test]
fn test_multi_word_verb_is_kebab_cased() {
    assert_eq!(
        route("CarryForwardBalances").path,
        "/api/v1/finance/balances/carry-forward"
    );
}

#[test]
fn test_action_verb_order_is_respected() {
    let config = RouteConfig {
        action_verbs: vec!["Re".to_string(), "Reverse".to_string()],
        ..RouteConfig::default()
    };
    let category = RouteInferrer::new(&config).classify("ReverseJournalEntry");
    assert_eq!(
        category,
        RouteCategory::Action {
            verb: "Re".to_string(),
            resource: "verseJournalEntry".to_string()
        }
    );
}

#[test]
fn test_generic_batch() {
    let r = route("BatchPostDocuments");
    assert_eq!(r.verb, HttpVerb::Post);
    assert_eq!(r.path, "/api/v1/finance/batch/post-documents");
    assert_eq!(r.body, BodyPolicy::Wildcard);
}

#[test]
fn test_fallback_uses_whole_name() {
    let r = route("Login");
    assert_eq!(r.path, "/api/v1/finance/login");
    assert_eq!(r.body, BodyPolicy::Wildcard);
    // A bare CRUD prefix has no resource and falls through
    assert_eq!(inferrer().classify("Create").label(), "fallback");
}

#[test]
fn test_resource_scoped_policy() {
    let config = RouteConfig {
        id_param: IdParamPolicy::ResourceScoped,
        ..RouteConfig::default()
    };
    let inferrer = RouteInferrer::new(&config);
    assert_eq!(
        inferrer.infer("GetJournalEntry", BASE).path,
        "/api/v1/finance/journal-entries/{journal_entry_id}"
    );
    assert_eq!(
        inferrer.infer("RejectApproval", BASE).path,
        "/api/v1/finance/approvals/{approval_id}/reject"
    );
}

#[test]
fn test_inference_is_deterministic() {
    let a = inferrer();
    let b = inferrer();
    for name in ["CreateJournalEntry", "PostJournalEntry", "Foo", "BatchX"] {
        assert_eq!(a.infer(name, BASE), b.infer(name, BASE));
        assert_eq!(a.infer(name, BASE), a.infer(name, BASE));
    }
}

#[test]
fn test_trailing_slash_in_base_is_ignored() {
    assert_eq!(
        inferrer().infer("CreateJournalEntry", "/api/v1/finance/").path,
        "/api/v1/finance/journal-entries"
    );
}

#[test]
fn test_base_path_for_package() {
    assert_eq!(base_path_for_package("finance.gl.v1"), "/api/v1/finance/gl");
    assert_eq!(base_path_for_package("iam.v2beta1"), "/api/v1/iam");
    assert_eq!(base_path_for_package("sales"), "/api/v1/sales");
    assert_eq!(base_path_for_package("v1"), "/api/v1");
}

#[test]
fn test_route_display() {
    assert_eq!(
        route("CreateJournalEntry").to_string(),
        "POST /api/v1/finance/journal-entries (body: *)"
    );
    assert_eq!(
        route("GetJournalEntry").to_string(),
        "GET /api/v1/finance/journal-entries/{id}"
    );
}

#[test]
fn test_is_method_name() {
    assert!(is_method_name("CreateJournalEntry"));
    assert!(is_method_name("_Internal2"));
    assert!(!is_method_name("2Fast"));
    assert!(!is_method_name("Create-Entry"));
    assert!(!is_method_name(""));
}
