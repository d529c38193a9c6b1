#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::config::{
    CategoryDef, ContactInfo, EnrichConfig, PartitionConfig, ServiceMetadata, TagConfig, TagDef,
};
use serde_json::json;
use std::path::Path;

fn unified() -> serde_json::Value {
    json!({
        "openapi": "3.0.1",
        "info": { "title": "Unified", "version": "0.0.1" },
        "servers": [{ "url": "https://erp.example.com" }],
        "paths": {
            "/api/v1/finance/journal-entries": {
                "post": { "tags": ["Journal Entry Core"], "operationId": "CreateJournalEntry" },
                "get": { "tags": ["Journal Entry Core", "Reporting"] }
            },
            "/api/v1/finance/reports": {
                "parameters": [],
                "get": { "tags": ["Reporting"] }
            },
            "/api/v1/users/{id}": {
                "get": { "tags": ["Identity Management"] }
            },
            "/api/v1/roles": {
                "post": { "tags": ["Role & Permission Management"] }
            },
            "/api/v1/unknown/thing": {
                "get": { "tags": ["Orphan"] }
            },
            "/health": { "get": {} }
        },
        "tags": [
            { "name": "Journal Entry Core", "description": "Journal entries" },
            { "name": "Identity Management", "description": "" }
        ],
        "components": { "schemas": { "Empty": { "type": "object" } } }
    })
}

fn partition_config() -> PartitionConfig {
    let mut config = PartitionConfig::default();
    config.extra_tags.insert(
        "auth".to_string(),
        vec![
            TagDef {
                name: "Identity Management".to_string(),
                description: "Identity Management - User Login".to_string(),
            },
            TagDef {
                name: "Security & 2FA".to_string(),
                description: "Two-factor authentication".to_string(),
            },
        ],
    );
    config
}

#[test]
fn test_used_tags_in_first_reference_order() {
    let doc = unified();
    let paths = doc["paths"].as_object().unwrap();
    assert_eq!(
        used_tags(paths),
        vec![
            "Journal Entry Core",
            "Reporting",
            "Identity Management",
            "Role & Permission Management",
            "Orphan"
        ]
    );
}

#[test]
fn test_partition_assigns_paths_by_segment_and_override() {
    let parts = DocumentPartitioner::new(&partition_config())
        .partition(&unified())
        .unwrap();

    // Domains without paths are omitted, unknown segments are dropped
    assert_eq!(parts.keys().collect::<Vec<_>>(), vec!["auth", "finance"]);

    let finance = &parts["finance"];
    assert_eq!(finance["openapi"], "3.0.1");
    assert_eq!(finance["info"]["title"], "CUBA ERP - Finance (FI)");
    assert_eq!(finance["info"]["version"], "1.0.0");
    assert_eq!(finance["servers"], unified()["servers"]);
    assert_eq!(finance["components"], unified()["components"]);
    assert_eq!(finance["paths"].as_object().unwrap().len(), 2);

    let auth = &parts["auth"];
    let auth_paths = auth["paths"].as_object().unwrap();
    assert!(auth_paths.contains_key("/api/v1/users/{id}"));
    assert!(auth_paths.contains_key("/api/v1/roles"));
}

#[test]
fn test_partition_tags_are_complete_and_unique() {
    let parts = DocumentPartitioner::new(&partition_config())
        .partition(&unified())
        .unwrap();

    let finance_tags = parts["finance"]["tags"].as_array().unwrap();
    assert_eq!(
        finance_tags,
        &vec![
            json!({ "name": "Journal Entry Core", "description": "Journal entries" }),
            json!({ "name": "Reporting" }),
        ]
    );

    let auth_tags = parts["auth"]["tags"].as_array().unwrap();
    // Empty source description is filled from the extra table
    assert_eq!(
        auth_tags[0],
        json!({ "name": "Identity Management", "description": "Identity Management - User Login" })
    );
    assert_eq!(auth_tags[1], json!({ "name": "Role & Permission Management" }));
    // Unused extra tags are not injected
    assert_eq!(auth_tags.len(), 2);
}

#[test]
fn test_extra_descriptions_never_overwrite() {
    let mut config = partition_config();
    config.extra_tags.insert(
        "finance".to_string(),
        vec![TagDef {
            name: "Journal Entry Core".to_string(),
            description: "Should not win".to_string(),
        }],
    );
    let parts = DocumentPartitioner::new(&config).partition(&unified()).unwrap();
    assert_eq!(
        parts["finance"]["tags"][0]["description"],
        "Journal entries"
    );
}

#[test]
fn test_partition_rejects_non_object() {
    let err = DocumentPartitioner::new(&PartitionConfig::default())
        .partition(&json!([1, 2]))
        .unwrap_err();
    assert_eq!(err.kind(), "unparsable_structure");
}

fn enricher() -> DocumentEnricher {
    let mut enrich = EnrichConfig::default();
    enrich.services.insert(
        "order_service".to_string(),
        ServiceMetadata {
            title: "Purchase Order Service API".to_string(),
            description: "Purchase orders".to_string(),
            contact: Some(ContactInfo {
                name: "Procurement Team".to_string(),
                email: "procurement@enterprise.com".to_string(),
            }),
        },
    );
    enrich
        .tag_descriptions
        .insert("Reporting".to_string(), "Reports and analytics".to_string());
    let tags = TagConfig {
        categories: vec![CategoryDef {
            name: "Identity Management".to_string(),
            description: "Login and registration".to_string(),
            methods: vec![],
        }],
        ..TagConfig::default()
    };
    DocumentEnricher::new(&enrich, &tags)
}

#[test]
fn test_service_key_for() {
    assert_eq!(
        service_key_for(Path::new("docs/openapi/order_service.openapi3.json")),
        "order_service"
    );
    assert_eq!(service_key_for(Path::new("gl.json")), "gl");
}

#[test]
fn test_enrich_applies_metadata_security_and_tags() {
    let mut doc = unified();
    assert!(enricher().enrich(&mut doc, "order_service").unwrap());

    assert_eq!(doc["info"]["title"], "Purchase Order Service API");
    assert_eq!(doc["info"]["version"], "0.0.1");
    assert_eq!(doc["info"]["contact"]["email"], "procurement@enterprise.com");

    assert_eq!(
        doc["components"]["securitySchemes"]["BearerAuth"],
        json!({
            "type": "http",
            "scheme": "bearer",
            "bearerFormat": "JWT",
            "description": "Enter your JWT token (e.g. from Login API)"
        })
    );
    assert_eq!(doc["security"], json!([{ "BearerAuth": [] }]));
    // Existing schemas are kept
    assert!(doc["components"]["schemas"]["Empty"].is_object());

    let tags = doc["tags"].as_array().unwrap();
    let names: Vec<_> = tags.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "Identity Management",
            "Journal Entry Core",
            "Orphan",
            "Reporting",
            "Role & Permission Management"
        ]
    );
    assert_eq!(tags[0]["description"], "Login and registration");
    assert_eq!(tags[1]["description"], "Journal entries");
    assert_eq!(tags[2]["description"], "Orphan");
    assert_eq!(tags[3]["description"], "Reports and analytics");
}

#[test]
fn test_enrich_is_idempotent() {
    let mut doc = unified();
    let e = enricher();
    assert!(e.enrich(&mut doc, "order_service").unwrap());
    let once = doc.clone();
    assert!(!e.enrich(&mut doc, "order_service").unwrap());
    assert_eq!(doc, once);
    assert_eq!(doc["security"].as_array().unwrap().len(), 1);
}

#[test]
fn test_enrich_without_metadata() {
    let mut doc = json!({ "paths": {} });
    assert!(enricher().enrich(&mut doc, "unknown_service").unwrap());
    assert_eq!(
        doc["info"],
        json!({ "title": "Enterprise API", "version": "0.1.0" })
    );

    // Existing info is left alone when there is no metadata entry
    let mut doc = unified();
    enricher().enrich(&mut doc, "unknown_service").unwrap();
    assert_eq!(doc["info"], json!({ "title": "Unified", "version": "0.0.1" }));
}

#[test]
fn test_enrich_text_reports_no_change_on_second_run() {
    let e = enricher();
    let first = e
        .enrich_text(&unified().to_string(), "order_service")
        .unwrap();
    assert_eq!(first.modified, 1);
    assert!(first.text.ends_with("}\n"));

    let second = e.enrich_text(&first.text, "order_service").unwrap();
    assert_eq!(second.modified, 0);
    assert_eq!(second.text, first.text);
}

#[test]
fn test_enrich_text_rejects_invalid_json() {
    let err = enricher().enrich_text("{ not json", "gl").unwrap_err();
    assert_eq!(err.kind(), "unparsable_structure");
}
