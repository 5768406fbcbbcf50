//! Reference handling across the full pipeline: cycles, broken targets,
//! other documents fetched through a provider and files on disk


use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use specguard_core::{
    ErrorKind, InMemoryProvider, OpenApiVersion, ValidateError, ValidationError, Validator, VersionDetectionError,
};
use std::fs;
use test_support::{errors_of, messages, petstore, pointers};
use url::Url;

const RESPONSE_SCHEMA: &str = "/paths/~1pets~1{petId}/get/responses/200/content/application~1json/schema";

fn root_origin() -> Url {
    Url::parse("https://api.example.com/openapi.json").unwrap()
}

/// Petstore whose response schema lives in another document
fn split_petstore(reference: &str) -> Value {
    let mut document = petstore("3.1.0");
    document.as_object_mut().unwrap().remove("components");
    document["paths"]["/pets/{petId}"]["get"]["responses"]["200"]["content"]["application/json"]["schema"] =
        json!({"$ref": reference});
    document
}

fn remote_errors(root: Value, schemas: Value) -> Vec<ValidationError> {
    let provider = InMemoryProvider::new()
        .with_document(root_origin(), root)
        .with_document(Url::parse("https://api.example.com/schemas.json").unwrap(), schemas);
    match Validator::new().with_provider(provider).validate_url(&root_origin()) {
        Ok(()) => Vec::new(),
        Err(ValidateError::Invalid(invalid)) => invalid.errors,
        Err(other) => panic!("document was not validated: {}", other),
    }
}

#[test]
fn test_recursive_schema_is_valid() {
    for version in ["3.0.3", "3.1.0"] {
        let mut document = petstore(version);
        document["components"]["schemas"]["Pet"]["properties"]["children"] = json!({
            "type": "array",
            "items": {"$ref": "#/components/schemas/Pet"}
        });
        assert!(errors_of(&document).is_empty(), "{} rejected a recursive schema", version);
    }
}

#[test]
fn test_reference_loop_is_reported_at_each_entry() {
    for version in ["3.0.3", "3.1.0"] {
        let mut document = petstore(version);
        document["components"]["schemas"]["A"] = json!({"$ref": "#/components/schemas/B"});
        document["components"]["schemas"]["B"] = json!({"$ref": "#/components/schemas/A"});

        let errors = errors_of(&document);
        assert_eq!(pointers(&errors), vec!["/components/schemas/A", "/components/schemas/B"]);
        assert!(errors.iter().all(|error| error.kind == ErrorKind::CircularReference));
    }
}

#[test]
fn test_broken_local_reference() {
    let mut document = petstore("3.0.3");
    document["paths"]["/pets/{petId}"]["get"]["responses"]["200"]["content"]["application/json"]["schema"] =
        json!({"$ref": "#/components/schemas/Missing"});

    let errors = errors_of(&document);
    assert_eq!(pointers(&errors), vec![RESPONSE_SCHEMA]);
    assert_eq!(errors[0].kind, ErrorKind::UnresolvableReference);
    assert_eq!(errors[0].schema_pointer(), "/$ref");
    assert!(errors[0]
        .message
        .starts_with("Unresolvable reference '#/components/schemas/Missing'"));
}

#[test]
fn test_remote_target_is_walked_under_referencing_path() {
    let schemas = json!({"Pet": {"type": "object", "required": ["name"], "properties": {"id": {"type": "integer"}}}});

    let errors = remote_errors(split_petstore("schemas.json#/Pet"), schemas);
    assert_eq!(pointers(&errors), vec![format!("{}/required", RESPONSE_SCHEMA)]);
    assert_eq!(messages(&errors), vec!["Required list has not defined properties: name"]);
}

#[test]
fn test_remote_target_is_walked_once() {
    let mut root = split_petstore("schemas.json#/Pet");
    root["paths"]["/pets/{petId}"]["get"]["responses"]["404"] = json!({
        "description": "Not found",
        "content": {"application/json": {"schema": {"$ref": "schemas.json#/Pet"}}}
    });
    let schemas = json!({"Pet": {"type": "object", "required": ["name"]}});

    let errors = remote_errors(root, schemas);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].pointer(), format!("{}/required", RESPONSE_SCHEMA));
}

#[test]
fn test_remote_target_is_checked_against_its_kind() {
    let schemas = json!({"Pet": {"type": "objekt"}});

    let errors = remote_errors(split_petstore("schemas.json#/Pet"), schemas);
    assert_eq!(pointers(&errors), vec![format!("{}/type", RESPONSE_SCHEMA)]);
    assert_eq!(errors[0].kind, ErrorKind::Keyword);
}

#[test]
fn test_missing_remote_document() {
    let errors = remote_errors(split_petstore("missing.json#/Pet"), json!({}));
    assert_eq!(pointers(&errors), vec![RESPONSE_SCHEMA]);
    assert_eq!(errors[0].kind, ErrorKind::UnresolvableReference);

    let cause = errors[0].cause.as_deref().unwrap();
    assert!(cause.message.contains("missing.json"), "unexpected cause: {}", cause.message);
    assert!(errors[0].message.ends_with(&cause.message));
}

#[test]
fn test_missing_root_document_fails_fetch() {
    let error = Validator::new()
        .with_provider(InMemoryProvider::new())
        .validate_url(&root_origin())
        .unwrap_err();
    assert!(matches!(error, ValidateError::Fetch(_)));
}

#[test]
fn test_report_url_keeps_version_and_errors() {
    let provider = InMemoryProvider::new()
        .with_document(root_origin(), split_petstore("schemas.json#/Pet"))
        .with_document(
            Url::parse("https://api.example.com/schemas.json").unwrap(),
            json!({"Pet": {"type": "object", "required": ["name"]}}),
        );

    let report = Validator::new().with_provider(provider).report_url(&root_origin()).unwrap();
    assert_eq!(report.version, Some(OpenApiVersion::V31));
    assert_eq!(pointers(&report.errors), vec![format!("{}/required", RESPONSE_SCHEMA)]);
}

const ROOT_YAML: &str = r#"
openapi: 3.0.3
info:
  title: Files
  version: 1.0.0
paths:
  /pets:
    get:
      responses:
        '200':
          description: Pets
          content:
            application/json:
              schema:
                $ref: './pet.yaml#/Pet'
"#;

#[test]
fn test_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("openapi.yaml");
    fs::write(&root, ROOT_YAML).unwrap();

    fs::write(
        dir.path().join("pet.yaml"),
        "Pet:\n  type: object\n  required: [name]\n  properties:\n    name:\n      type: string\n",
    )
    .unwrap();
    assert!(Validator::new().validate_file(&root).is_ok());

    fs::write(dir.path().join("pet.yaml"), "Pet:\n  type: object\n  required: [name]\n").unwrap();
    let error = Validator::new().validate_file(&root).unwrap_err();
    let errors = error.errors().unwrap();
    assert_eq!(
        pointers(errors),
        vec!["/paths/~1pets/get/responses/200/content/application~1json/schema/required"]
    );
}

#[test]
fn test_file_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = Validator::new().validate_file(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(missing, ValidateError::Load(_)));

    let empty = dir.path().join("empty.json");
    fs::write(&empty, "{}").unwrap();
    let error = Validator::new().validate_file(&empty).unwrap_err();
    assert!(matches!(error, ValidateError::Version(VersionDetectionError::Missing)));
}

const NESTED_ROOT_YAML: &str = r#"
openapi: 3.1.0
info:
  title: Separate files
  version: 1.0.0
paths:
  /pets:
    get:
      responses:
        '200':
          description: Pets
          content:
            application/json:
              schema:
                $ref: '../common/pet.yaml#/Pet'
"#;

const NESTED_PET_YAML: &str = r#"
Pet:
  type: object
  required: [name, owner]
  properties:
    name:
      type: string
    owner:
      $ref: './owner.yaml#/Owner'
"#;

#[test]
fn test_chained_files_in_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("spec")).unwrap();
    fs::create_dir(dir.path().join("common")).unwrap();
    let root = dir.path().join("spec").join("openapi.yaml");
    fs::write(&root, NESTED_ROOT_YAML).unwrap();
    fs::write(dir.path().join("common").join("pet.yaml"), NESTED_PET_YAML).unwrap();

    fs::write(
        dir.path().join("common").join("owner.yaml"),
        "Owner:\n  type: object\n  required: [name]\n  properties:\n    name:\n      type: string\n",
    )
    .unwrap();
    assert!(Validator::new().validate_file(&root).is_ok());

    fs::write(
        dir.path().join("common").join("owner.yaml"),
        "Owner:\n  type: object\n  required: [name]\n",
    )
    .unwrap();
    let error = Validator::new().validate_file(&root).unwrap_err();
    let errors = error.errors().unwrap();
    assert_eq!(
        pointers(errors),
        vec!["/paths/~1pets/get/responses/200/content/application~1json/schema/properties/owner/required"]
    );
    assert_eq!(errors[0].rule_id(), Some("required-properties"));
}
