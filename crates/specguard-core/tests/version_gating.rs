//! Constructs that only exist in one OpenAPI version


use pretty_assertions::assert_eq;
use serde_json::json;
use specguard_core::{validate, ErrorKind, ValidateError, VersionDetectionError};
use test_support::{errors_of, messages, petstore, pointers};

fn webhook_document(version: &str) -> serde_json::Value {
    let mut document = petstore(version);
    document["webhooks"] = json!({
        "newPet": {
            "post": {
                "requestBody": {
                    "content": {
                        "application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}
                    }
                },
                "responses": {"200": {"description": "Received"}}
            }
        }
    });
    document
}

#[test]
fn test_webhooks_rejected_in_30() {
    let errors = errors_of(&webhook_document("3.0.3"));
    assert_eq!(
        messages(&errors),
        vec!["Additional properties are not allowed ('webhooks' was unexpected)"]
    );
    assert_eq!(pointers(&errors), vec![""]);
}

#[test]
fn test_webhooks_accepted_in_31() {
    assert!(validate(&webhook_document("3.1.0"), None).is_ok());
}

#[test]
fn test_webhook_only_document_in_31() {
    let mut document = webhook_document("3.1.0");
    document.as_object_mut().unwrap().remove("paths");
    assert!(validate(&document, None).is_ok());
}

#[test]
fn test_webhook_operations_are_walked() {
    let mut document = webhook_document("3.1.0");
    document["components"]["schemas"]["Pet"]["properties"]["id"] = json!({"type": "integer", "readOnly": true});
    document["components"]["schemas"]["Pet"]["required"] = json!(["id", "name"]);

    let errors = errors_of(&document);
    assert_eq!(
        pointers(&errors),
        vec!["/webhooks/newPet/post/requestBody/content/application~1json/schema"]
    );
}

#[test]
fn test_const_keyword_only_in_31() {
    let mut document = petstore("3.0.3");
    document["components"]["schemas"]["Pet"]["properties"]["kind"] = json!({"const": "dog"});

    let errors = errors_of(&document);
    assert_eq!(pointers(&errors), vec!["/components/schemas/Pet"]);
    assert_eq!(errors[0].kind, ErrorKind::Keyword);
    assert!(errors[0].message.ends_with("is not valid under any of the given schemas"));
    assert!(!errors[0].context.is_empty());

    document["openapi"] = json!("3.1.0");
    assert!(validate(&document, None).is_ok());
}

#[test]
fn test_type_lists_only_in_31() {
    let mut document = petstore("3.0.3");
    document["components"]["schemas"]["Pet"]["properties"]["name"] = json!({"type": ["string", "null"]});
    assert_eq!(pointers(&errors_of(&document)), vec!["/components/schemas/Pet"]);

    document["openapi"] = json!("3.1.0");
    assert!(validate(&document, None).is_ok());
}

#[test]
fn test_license_identifier_rule_only_in_31() {
    let license = json!({"name": "MIT", "identifier": "MIT", "url": "https://opensource.org/licenses/MIT"});

    let mut document = petstore("3.1.0");
    document["info"]["license"] = license.clone();
    let errors = errors_of(&document);
    assert_eq!(pointers(&errors), vec!["/info/license"]);
    assert_eq!(errors[0].rule_id(), Some("license-identifier"));

    let mut document = petstore("3.0.3");
    document["info"]["license"] = license;
    let errors = errors_of(&document);
    assert_eq!(
        messages(&errors),
        vec!["Additional properties are not allowed ('identifier' was unexpected)"]
    );
    assert_eq!(errors[0].rule_id(), None);
}

#[test]
fn test_nullable_only_in_30() {
    let mut document = petstore("3.0.3");
    document["components"]["schemas"]["Pet"]["properties"]["name"] =
        json!({"type": "string", "nullable": true, "default": null});
    assert!(validate(&document, None).is_ok());
}

#[test]
fn test_unsupported_versions() {
    let swagger = json!({"swagger": "2.0", "info": {"title": "t", "version": "1"}, "paths": {}});
    let error = validate(&swagger, None).unwrap_err();
    assert!(matches!(
        error,
        ValidateError::Version(VersionDetectionError::Unsupported { .. })
    ));

    let future = json!({"openapi": "3.2.0", "info": {"title": "t", "version": "1"}, "paths": {}});
    let error = validate(&future, None).unwrap_err();
    assert!(matches!(
        error,
        ValidateError::Version(VersionDetectionError::Unsupported { ref version, .. }) if version == "3.2.0"
    ));

    let numeric = json!({"openapi": 3.1, "info": {"title": "t", "version": "1"}, "paths": {}});
    let error = validate(&numeric, None).unwrap_err();
    assert!(matches!(
        error,
        ValidateError::Version(VersionDetectionError::NotAString { .. })
    ));
}
