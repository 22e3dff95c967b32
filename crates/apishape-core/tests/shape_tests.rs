use apishape_core::config::{GeneratorSettings, Library, ShapeOptions};
use apishape_core::error::{ResolveError, TransformError};
use apishape_core::ir::{IrOperation, IrType, ModelKind};
use apishape_core::{ShapedApi, parse, shape, shape_document, transform};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const BROKEN_COMPLEX_TYPE: &str = include_str!("fixtures/broken-complex-type.yaml");

fn shape_petstore(settings: &GeneratorSettings) -> ShapedApi {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    shape_document(&spec, settings).unwrap()
}

fn settings(library: &str, grouping: Option<&str>) -> GeneratorSettings {
    GeneratorSettings {
        library: Some(library.to_string()),
        grouping: grouping.map(str::to_string),
        ..GeneratorSettings::default()
    }
}

fn operation<'a>(shaped: &'a ShapedApi, id: &str) -> &'a IrOperation {
    shaped
        .operations
        .iter()
        .find(|op| op.operation_id == id)
        .unwrap_or_else(|| panic!("should have operation {id}"))
}

fn group_ids(shaped: &ShapedApi) -> Vec<(String, Vec<String>)> {
    shaped
        .groups
        .values()
        .map(|g| (g.key.clone(), g.operation_ids.clone()))
        .collect()
}

#[test]
fn shape_is_deterministic() {
    let first = serde_yaml_ng::to_string(&shape_petstore(&GeneratorSettings::default())).unwrap();
    let second = serde_yaml_ng::to_string(&shape_petstore(&GeneratorSettings::default())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn operation_id_grouping_is_one_group_per_operation() {
    let shaped = shape_petstore(&GeneratorSettings::default());
    assert_eq!(shaped.groups.len(), shaped.operations.len());
    for group in shaped.groups.values() {
        assert_eq!(group.operation_ids.len(), 1);
        assert_eq!(group.key, group.operation_ids[0]);
    }
    assert_eq!(shaped.groups["listPets"].api_name, "ListPetsApi");
}

#[test]
fn base_path_grouping() {
    let shaped = shape_petstore(&settings("feign", None));
    assert_eq!(
        group_ids(&shaped),
        vec![
            (
                "pets".to_string(),
                vec![
                    "listPets".to_string(),
                    "createPet".to_string(),
                    "getPetScore".to_string(),
                    "uploadPhoto".to_string(),
                ]
            ),
            ("shops".to_string(), vec!["findShops".to_string()]),
            ("default".to_string(), vec!["ping".to_string()]),
        ]
    );

    // listPets carries two tags but is grouped once
    assert!(!operation(&shaped, "listPets").subresource);
    assert!(operation(&shaped, "getPetScore").subresource);
    assert_eq!(operation(&shaped, "ping").base_name.as_deref(), Some("default"));
}

#[test]
fn client_group_grouping() {
    let shaped = shape_petstore(&settings("feign", Some("client_group")));
    let keys: Vec<_> = shaped.groups.keys().map(String::as_str).collect();
    assert_eq!(keys, ["pets", "scoring", "shopping", "default"]);

    let scoring = operation(&shaped, "getPetScore");
    assert_eq!(scoring.group_key.as_deref(), Some("scoring"));
    assert_eq!(scoring.base_name.as_deref(), Some("pets"));
}

#[test]
fn single_grouping_uses_short_name() {
    let shaped = shape_petstore(&settings("resteasy-client", None));
    assert_eq!(shaped.short_app_name, "petStore");
    assert_eq!(shaped.groups.len(), 1);
    let group = &shaped.groups["default"];
    assert_eq!(group.api_name, "PetStoreClient");
    assert_eq!(shaped.group_operations(group).count(), 6);

    let renamed = shape_petstore(&GeneratorSettings {
        service_name: Some("Animal Shelter".to_string()),
        ..settings("resteasy-client", None)
    });
    assert_eq!(renamed.groups["default"].api_name, "AnimalShelterClient");
}

#[test]
fn consumes_are_prioritized() {
    let shaped = shape_petstore(&GeneratorSettings::default());

    let create = operation(&shaped, "createPet");
    let ordered: Vec<_> = create
        .prioritized_consumes
        .iter()
        .map(|mt| mt.media_type.as_str())
        .collect();
    assert_eq!(
        ordered,
        ["application/vnd.acme.pets.v1+json", "application/json", "text/plain"]
    );
    assert!(!create.prioritized_consumes[2].has_more);
    // The declared order is kept as written.
    assert_eq!(create.consumes[0], "application/json");

    let upload = operation(&shaped, "uploadPhoto");
    assert!(upload.is_multipart);
    assert_eq!(upload.prioritized_consumes[0].media_type, "multipart/form-data");

    assert!(operation(&shaped, "ping").prioritized_consumes.is_empty());
}

#[test]
fn alias_return_type_is_unwrapped() {
    let shaped = shape_petstore(&GeneratorSettings::default());

    assert!(shaped.models["Score"].is_alias);
    assert!(shaped.models["Score"].capabilities.is_empty());

    let score = operation(&shaped, "getPetScore");
    assert_eq!(score.return_type, Some(IrType::Integer));
    assert!(score.return_type_is_primitive);
    insta::assert_snapshot!(
        score.capabilities.to_string(),
        @"needs-http-method(GET), needs-not-null-validation"
    );

    let pet = &shaped.models["Pet"];
    let tags = pet.properties.iter().find(|p| p.original_name == "tags").unwrap();
    assert_eq!(tags.property_type, IrType::Array(Box::new(IrType::String)));
    let pet_score = pet.properties.iter().find(|p| p.original_name == "score").unwrap();
    assert_eq!(pet_score.property_type, IrType::Integer);
}

#[test]
fn container_and_date_models_are_kept() {
    let yaml = r##"
openapi: "3.0.3"
info: {title: Shelter, version: "1"}
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        "200":
          description: ok
          content:
            application/json: {schema: {$ref: "#/components/schemas/Pets"}}
components:
  schemas:
    Pet:
      type: object
      properties:
        name: {type: string}
        born: {$ref: "#/components/schemas/Day"}
    Pets:
      type: array
      items: {$ref: "#/components/schemas/Pet"}
    Labels:
      type: object
      additionalProperties: {type: string}
    Day: {type: string, format: date}
"##;
    let spec = parse::from_yaml(yaml).unwrap();
    let shaped = shape_document(&spec, &GeneratorSettings::default()).unwrap();
    assert!(shaped.models.values().all(|m| !m.is_alias));

    let pets = &shaped.models["Pets"];
    assert_eq!(
        pets.kind,
        ModelKind::Array {
            items: IrType::Ref("Pet".to_string())
        }
    );
    assert!(pets.hash_seeds.is_some());
    insta::assert_snapshot!(
        pets.capabilities.to_string(),
        @"needs-property-binding(jackson), needs-value-object-support"
    );
    assert_eq!(
        shaped.models["Labels"].kind,
        ModelKind::Map {
            values: IrType::String
        }
    );
    assert!(!shaped.models["Day"].capabilities.is_empty());

    let list = operation(&shaped, "listPets");
    assert_eq!(list.return_type, Some(IrType::Ref("Pets".to_string())));
    assert!(!list.return_type_is_primitive);

    let born = shaped.models["Pet"].property("born").unwrap();
    assert_eq!(born.property_type, IrType::Ref("Day".to_string()));
}

#[test]
fn model_capabilities() {
    let shaped = shape_petstore(&GeneratorSettings::default());

    let pet = &shaped.models["Pet"];
    insta::assert_snapshot!(
        pet.capabilities.to_string(),
        @"needs-property-binding(jackson), needs-enum-serialization, needs-value-object-support, needs-pattern-validation, needs-not-null-validation, needs-size-validation, needs-min-validation(decimal), needs-nested-validation, needs-date-format, needs-offset-date-time"
    );
    assert!(!pet.simple);
    assert!(shaped.models["Owner"].simple);

    let id = &pet.properties[0];
    assert_eq!(id.constant_name, "PN_ID");
    assert!(id.capabilities.is_empty());

    let updated = pet.properties.iter().find(|p| p.original_name == "updatedAt").unwrap();
    assert_eq!(updated.property_type, IrType::OffsetDateTime);
    assert_eq!(updated.constant_name, "PN_UPDATED_AT");

    let owner = pet.properties.iter().find(|p| p.original_name == "owner").unwrap();
    assert!(owner.cloneable);

    insta::assert_snapshot!(
        shaped.models["Currency"].capabilities.to_string(),
        @"needs-enum-creator, needs-enum-serialization"
    );
    insta::assert_snapshot!(
        shaped.models["PetStatus"].capabilities.to_string(),
        @"needs-enum-serialization"
    );
}

#[test]
fn parameter_bindings() {
    let shaped = shape_petstore(&GeneratorSettings::default());

    let list = operation(&shaped, "listPets");
    insta::assert_snapshot!(
        list.capabilities.to_string(),
        @"needs-http-method(GET), needs-min-validation(integer), needs-max-validation(integer), needs-enum-serialization, needs-model(PetStatus)"
    );
    let status = &list.parameters[1];
    assert_eq!(status.enum_name.as_deref(), Some("PetStatus"));
    assert_eq!(
        status.display_type,
        Some(IrType::Array(Box::new(IrType::Ref("PetStatus".to_string()))))
    );

    let find = operation(&shaped, "findShops");
    let binding = find.parameters[0].complex_type.as_ref().unwrap();
    assert_eq!(binding.reference, "ShopFilter");
    assert_eq!(binding.base_property_type, IrType::String);
    let keys: Vec<_> = binding.properties.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, ["city", "min"]);
    assert_eq!(binding.properties[1].property_type, IrType::Double);
    insta::assert_snapshot!(
        find.capabilities.to_string(),
        @"needs-http-method(GET), needs-not-null-validation, needs-matrix-parameter, needs-model(ShopFilter)"
    );
    assert!(shaped.matrix_parameters);
}

#[test]
fn body_parameter_capabilities() {
    let shaped = shape_petstore(&GeneratorSettings::default());
    let create = operation(&shaped, "createPet");
    let body = create.parameters.last().unwrap();
    assert!(body.is_body());
    assert_eq!(body.param_type, IrType::Ref("Pet".to_string()));
    insta::assert_snapshot!(
        body.capabilities.to_string(),
        @"needs-nested-validation, needs-not-null-validation"
    );
}

#[test]
fn library_variants() {
    let shaped = shape_petstore(&settings("retrofit2", None));
    insta::assert_snapshot!(
        shaped.models["Shop"].capabilities.to_string(),
        @"needs-property-binding(gson), needs-value-object-support, needs-not-null-validation"
    );
    let score = operation(&shaped, "getPetScore");
    assert_eq!(score.path, "pets/{petId}/score");
    assert!(
        !score
            .capabilities
            .iter()
            .any(|c| c.to_string().starts_with("needs-http-method"))
    );
}

#[test]
fn validation_can_be_disabled() {
    let shaped = shape_petstore(&GeneratorSettings {
        validation: false,
        ..GeneratorSettings::default()
    });
    insta::assert_snapshot!(
        shaped.models["Pet"].capabilities.to_string(),
        @"needs-property-binding(jackson), needs-enum-serialization, needs-value-object-support, needs-date-format, needs-offset-date-time"
    );
    assert!(
        shaped
            .operations
            .iter()
            .flat_map(|op| op.capabilities.iter())
            .all(|c| !c.is_validation())
    );
}

#[test]
fn unknown_settings_fall_back_with_diagnostics() {
    let shaped = shape_petstore(&GeneratorSettings {
        library: Some("axis".to_string()),
        use_rx_java: true,
        use_rx_java2: true,
        ..GeneratorSettings::default()
    });
    assert_eq!(shaped.options.library, Library::JaxRs);
    let messages: Vec<_> = shaped.diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        [
            "library: unknown library 'axis' (using jax-rs)",
            "use_rx_java: use_rx_java and use_rx_java2 are mutually exclusive (using use_rx_java2)",
        ]
    );
}

#[test]
fn missing_complex_type_property_is_fatal() {
    let spec = parse::from_yaml(BROKEN_COMPLEX_TYPE).unwrap();
    let ir = transform::transform(&spec).unwrap();
    let err = shape(ir, &ShapeOptions::default()).unwrap_err();
    match err {
        TransformError::Resolve(ResolveError::UnknownProperty { model, property }) => {
            assert_eq!(model, "ShopFilter");
            assert_eq!(property, "maxRating");
        }
        other => panic!("expected unknown property, got {other}"),
    }
}
