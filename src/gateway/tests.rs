#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::config::GatewayConfig;

const ROUTES: &str = r#"apiVersion: networking.istio.io/v1beta1
kind: Gateway
metadata:
  name: cuba-gateway
spec:
  selector:
    istio: ingressgateway
---
apiVersion: networking.istio.io/v1beta1
kind: VirtualService
metadata:
  name: cuba-routes
spec:
  hosts:
  - "*"
  http:
  - match:
    - uri:
        prefix: /api/v1/finance/gl
    route:
    - destination:
        host: gl-service.cuba-fi.svc.cluster.local
        port:
          number: 50051
  # identity
  - match:
    - uri:
        prefix: "/api/v1/auth"
    route:
    - destination:
        host: iam-service.cuba-system.svc.cluster.local
        port:
          number: 50051
  - match:
    - uri:
        prefix: /api/v1/sales/orders
    - uri:
        prefix: /sales.orders.v1
    route:
    - destination:
        host: orders-service.cuba-sd.svc.cluster.local
        port:
          number: 50051
"#;

fn projector() -> GatewayProjector {
    GatewayProjector::new(&GatewayConfig::default())
}

#[test]
fn test_derive_prefix() {
    let p = projector();
    assert_eq!(
        p.derive_prefix("gl-service.cuba-fi.svc.cluster.local").as_deref(),
        Some("/finance.gl.v1")
    );
    assert_eq!(
        p.derive_prefix("iam-service.cuba-system.svc.cluster.local").as_deref(),
        Some("/iam.v1")
    );
    // Other services in the identity namespace use the domain table
    assert_eq!(
        p.derive_prefix("audit-service.cuba-system.svc.cluster.local").as_deref(),
        Some("/iam.audit.v1")
    );
    assert_eq!(
        p.derive_prefix("qm-service.cuba-qm.svc.cluster.local").as_deref(),
        Some("/cuba.qm.qm.v1")
    );
    assert_eq!(p.derive_prefix("gl-service.finance.svc.cluster.local"), None);
    assert_eq!(p.derive_prefix("localhost"), None);
}

#[test]
fn test_project_rule_is_pure_and_idempotent() {
    let p = projector();
    let rule = RoutingRule {
        prefixes: vec!["/api/v1/finance/gl".to_string()],
        other_matchers: 0,
        hosts: vec!["gl-service.cuba-fi.svc.cluster.local".to_string()],
        port: Some(50051),
    };
    let projected = p.project_rule(&rule);
    assert_eq!(
        projected.prefixes,
        vec!["/api/v1/finance/gl".to_string(), "/finance.gl.v1".to_string()]
    );
    assert_eq!(projected.hosts, rule.hosts);
    assert_eq!(projected.port, rule.port);
    assert_eq!(p.project_rule(&projected), projected);
}

#[test]
fn test_rules_are_read_from_the_virtual_service() {
    let rules = projector().rules(ROUTES).unwrap();
    assert_eq!(rules.len(), 3);
    assert_eq!(rules[1].prefixes, vec!["/api/v1/auth".to_string()]);
    assert_eq!(rules[2].prefixes.len(), 2);
    assert_eq!(rules[0].port, Some(50051));
}

#[test]
fn test_project_inserts_copy_after_existing_matcher() {
    let outcome = projector().project(ROUTES).unwrap();
    assert_eq!(outcome.modified, 2);
    assert!(outcome.text.contains(
        "    - uri:\n        prefix: /api/v1/finance/gl\n    - uri:\n        prefix: /finance.gl.v1\n    route:\n"
    ));
    // Quoting style of the copied matcher is kept
    assert!(outcome.text.contains(
        "        prefix: \"/api/v1/auth\"\n    - uri:\n        prefix: \"/iam.v1\"\n"
    ));
    // Untouched parts stay byte-identical
    assert!(outcome.text.starts_with(&ROUTES[..ROUTES.find("  http:").unwrap()]));
    assert!(outcome.text.ends_with(&ROUTES[ROUTES.find("  - match:\n    - uri:\n        prefix: /api/v1/sales").unwrap()..]));
}

#[test]
fn test_project_is_idempotent() {
    let p = projector();
    let first = p.project(ROUTES).unwrap();
    let second = p.project(&first.text).unwrap();
    assert_eq!(second.modified, 0);
    assert_eq!(second.text, first.text);
}

#[test]
fn test_missing_virtual_service_is_unparsable() {
    let err = projector()
        .project("apiVersion: v1\nkind: Service\nmetadata:\n  name: x\n")
        .unwrap_err();
    assert_eq!(err.kind(), "unparsable_structure");

    let err = projector()
        .project("kind: VirtualService\nspec:\n  hosts:\n  - x\n")
        .unwrap_err();
    assert!(err.to_string().contains("spec.http"));

    let err = projector()
        .project("kind: VirtualService\nspec:\n  http: [unclosed\n")
        .unwrap_err();
    assert_eq!(err.kind(), "unparsable_structure");
}
