use apishape_core::config::GeneratorSettings;
use apishape_core::error::TransformError;
use apishape_core::{parse, shape_document};
use indexmap::IndexMap;

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

const UNNAMED: &str = r#"
openapi: "3.0.3"
info:
  title: Übersicht der Tiere
  version: "1"
paths:
  /users:
    get:
      responses:
        "200":
          description: ok
  /users/{userId}:
    get:
      responses:
        "200":
          description: ok
    delete:
      responses:
        "204":
          description: ok
"#;

fn names(settings: &GeneratorSettings, input: &str) -> Vec<(String, String)> {
    let spec = parse::from_yaml(input).unwrap();
    shape_document(&spec, settings)
        .unwrap()
        .operations
        .iter()
        .map(|op| (op.operation_id.clone(), op.name.camel_case.clone()))
        .collect()
}

#[test]
fn route_names_without_operation_id() {
    let names = names(&GeneratorSettings::default(), UNNAMED);
    let ids: Vec<_> = names.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["listUsers", "getUser", "deleteUser"]);
}

#[test]
fn path_naming_ignores_operation_id() {
    let settings = GeneratorSettings {
        naming: Some("PATH".to_string()),
        ..GeneratorSettings::default()
    };
    let names = names(&settings, PETSTORE);
    assert_eq!(names[0].0, "listPets");
    assert_eq!(names[1].0, "createPets");
    assert_eq!(names[2].0, "listPetsScore");
}

#[test]
fn aliases_rename_without_changing_identity() {
    let settings = GeneratorSettings {
        aliases: IndexMap::from([("listPets".to_string(), "browseAnimals".to_string())]),
        ..GeneratorSettings::default()
    };
    let names = names(&settings, PETSTORE);
    assert_eq!(names[0], ("listPets".to_string(), "browseAnimals".to_string()));
}

#[test]
fn short_app_name_is_transliterated() {
    let spec = parse::from_yaml(UNNAMED).unwrap();
    let shaped = shape_document(&spec, &GeneratorSettings::default()).unwrap();
    assert_eq!(shaped.short_app_name, "uebersichtDerTiere");
}

#[test]
fn duplicate_operation_ids_are_rejected() {
    let yaml = r#"
openapi: "3.0.3"
info:
  title: Dup
  version: "1"
paths:
  /a:
    get:
      operationId: fetch
      responses: {}
  /b:
    get:
      operationId: fetch
      responses: {}
"#;
    let spec = parse::from_yaml(yaml).unwrap();
    let err = shape_document(&spec, &GeneratorSettings::default()).unwrap_err();
    assert!(matches!(err, TransformError::DuplicateOperationId { ref id, .. } if id == "fetch"));
    assert_eq!(
        err.to_string(),
        "operation identifier 'fetch' of GET /b is already used"
    );
}
